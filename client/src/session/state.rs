//! Session state types.
//!
//! All types are `Clone` to support the functional architecture pattern.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Access role carried by the credential token.
///
/// The role gates client-side routing only; the backend re-authorizes
/// every privileged call regardless of what the client decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular user: submits and views own tickets.
    User,
    /// Administrator: triages, responds, and changes ticket status.
    Admin,
}

impl Role {
    /// Get the role name as the backend spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    /// Parse a role claim, normalizing whitespace and case.
    ///
    /// The backend has historically emitted claims like `"user "`; the
    /// claim is trimmed and uppercased before matching. Anything that is
    /// not USER or ADMIN after normalization is `None`.
    #[must_use]
    pub fn parse(claim: &str) -> Option<Self> {
        match claim.trim().to_uppercase().as_str() {
            "USER" => Some(Self::User),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque bearer credential issued at login.
///
/// The client never verifies the signature; it only decodes the payload
/// segment for the role claim. Trust is delegated to transport and server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token string.
    #[must_use]
    pub const fn new(raw: String) -> Self {
        Self(raw)
    }

    /// The raw token, for the Authorization header and persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AuthToken {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// An authenticated session.
///
/// Invariant: a `Session` always holds a token; `role` is `None` only
/// while the role claim is still being resolved. A failed decode clears
/// the whole session instead of leaving a token without a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The bearer token attached to every authenticated request.
    pub token: AuthToken,

    /// Role decoded from the token claims; `None` while the decode is in
    /// flight (the route guard renders a neutral pending state then).
    pub role: Option<Role>,
}

impl Session {
    /// Session with an unresolved role (decode pending).
    #[must_use]
    pub const fn pending(token: AuthToken) -> Self {
        Self { token, role: None }
    }

    /// Session with a resolved role.
    #[must_use]
    pub const fn resolved(token: AuthToken, role: Role) -> Self {
        Self {
            token,
            role: Some(role),
        }
    }
}

/// Root session state, managed by the session reducer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Current session (if logged in or restoring).
    pub session: Option<Session>,

    /// Whether a registration round-trip completed (the login form is the
    /// next stop).
    pub registered: bool,

    /// Last authentication failure, surfaced to the user.
    pub last_error: Option<ClientError>,
}

impl SessionState {
    /// Whether a token is present (resolved or not).
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.session.is_some()
    }

    /// The resolved role, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().and_then(|s| s.role)
    }
}
