//! Role-claim decoding for compact bearer tokens.
//!
//! The backend issues signed compact tokens (`header.payload.signature`).
//! The client only reads the payload's `role` claim for UI gating; it does
//! NOT verify the signature. That is deliberate and matches the trust
//! model: the decoded role decides which views render, while the server
//! re-authorizes every request carrying the token.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::error::ClientError;
use crate::session::state::{AuthToken, Role};

/// Claims the client cares about. Everything else in the payload is
/// ignored.
#[derive(Debug, Deserialize)]
struct Claims {
    role: Option<String>,
}

/// Decode the `role` claim from a compact token.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] when the token is not three
/// dot-separated segments, the payload is not base64url JSON, the `role`
/// claim is absent, or the claim is not a known role after normalization.
/// Callers clear the session on any of these.
pub fn decode_role_claim(token: &AuthToken) -> Result<Role, ClientError> {
    let segments: Vec<&str> = token.as_str().split('.').collect();
    if segments.len() != 3 {
        return Err(decode_error("expected three dot-separated segments"));
    }

    // Tolerate padded payloads; the standard encoding is unpadded.
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| decode_error(format!("payload is not base64url: {e}")))?;

    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| decode_error(format!("payload is not valid JSON: {e}")))?;

    let claim = claims.role.ok_or_else(|| decode_error("missing role claim"))?;

    Role::parse(&claim).ok_or_else(|| decode_error(format!("unknown role claim: {claim:?}")))
}

fn decode_error(reason: impl Into<String>) -> ClientError {
    ClientError::Decode {
        reason: reason.into(),
    }
}
