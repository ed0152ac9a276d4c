//! Configuration for the support-ticket client.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the support-ticket backend
    pub base_url: String,
    /// Per-request timeout in seconds; a request exceeding it surfaces as
    /// a network error rather than hanging a view forever
    pub request_timeout_secs: u64,
    /// Where to persist the session token across restarts (None disables
    /// persistence)
    pub token_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `SUPPORTDESK_BASE_URL`,
    /// `SUPPORTDESK_REQUEST_TIMEOUT`, `SUPPORTDESK_TOKEN_PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("SUPPORTDESK_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            request_timeout_secs: env::var("SUPPORTDESK_REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            token_path: env::var("SUPPORTDESK_TOKEN_PATH").ok().map(PathBuf::from),
        }
    }

    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            token_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.token_path.is_none());
    }
}
