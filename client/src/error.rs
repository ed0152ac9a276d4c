//! Error types for client operations.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error taxonomy for the support-ticket client.
///
/// Four categories with distinct handling policies:
///
/// - [`ClientError::Validation`] is local and field-level; it is raised
///   before any network call and reported next to the offending field.
/// - [`ClientError::Decode`] means a malformed credential token; the
///   session is cleared and the user is sent back to login.
/// - [`ClientError::Server`] is a non-2xx response; the operation has no
///   side effect on local state.
/// - [`ClientError::Network`] means the request never completed; surfaced
///   generically, never retried automatically.
///
/// No error is fatal: every failure resolves to a visible message and a
/// stable state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A field failed local validation; nothing was sent to the backend.
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// Human-readable reason
        reason: String,
    },

    /// The credential token could not be decoded.
    #[error("Malformed token: {reason}")]
    Decode {
        /// Why decoding failed
        reason: String,
    },

    /// The backend rejected the request with a non-2xx status.
    #[error("Server rejected request ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Message from the response body, or the status text
        message: String,
    },

    /// The request never completed (transport failure or timeout).
    #[error("Network error: {reason}")]
    Network {
        /// Underlying transport error, stringified
        reason: String,
    },
}

impl ClientError {
    /// Shorthand for a field-level validation error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a required-field violation.
    pub fn required(field: impl Into<String>) -> Self {
        Self::validation(field, "must not be empty")
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        // Status-bearing failures are mapped to Server at the call site,
        // where the response body is still available; everything reaching
        // this conversion is a transport-level failure.
        Self::Network {
            reason: err.without_url().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_names_the_field() {
        let err = ClientError::required("title");
        assert_eq!(err.to_string(), "Invalid title: must not be empty");
    }

    #[test]
    fn test_server_display_carries_status() {
        let err = ClientError::Server {
            status: 403,
            message: "forbidden".into(),
        };
        assert!(err.to_string().contains("403"));
    }
}
