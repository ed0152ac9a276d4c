//! Session actions.
//!
//! Commands come from forms and app startup; feedback actions come from
//! completed effects (login round-trips, storage loads, claim decodes).

use crate::error::ClientError;
use crate::session::state::{AuthToken, Role};

/// All inputs to the session reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Login form submitted.
    SubmitLogin {
        /// Login name
        username: String,
        /// Password
        password: String,
    },

    /// Registration form submitted.
    SubmitRegistration {
        /// Desired login name
        username: String,
        /// Password
        password: String,
        /// Must match `password`; checked locally before any request
        confirm_password: String,
    },

    /// A token arrived (from a login response or restored from storage);
    /// the role claim still needs resolving.
    TokenReceived {
        /// The raw bearer token
        token: AuthToken,
    },

    /// The role claim decoded successfully.
    RoleResolved {
        /// Normalized role from the token payload
        role: Role,
    },

    /// The token could not be decoded; the session is cleared.
    DecodeFailed {
        /// Why decoding failed
        reason: String,
    },

    /// Registration round-trip succeeded (no token; the user logs in next).
    RegistrationComplete,

    /// A login or registration request failed.
    AuthFailed {
        /// The surfaced failure
        error: ClientError,
    },

    /// Clear the session unconditionally.
    Logout,

    /// Load a persisted token on startup, if one exists.
    Restore,
}
