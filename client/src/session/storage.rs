//! Token persistence.
//!
//! The session survives process restarts by persisting the raw token and
//! re-running the decode path on startup. Storage failures are never
//! fatal: the original behavior treats persistence as best effort, so
//! workflows log a warning and carry on with an in-memory session.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

use crate::session::state::AuthToken;

/// Token storage failure. Non-fatal by policy; callers log and continue.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure.
    #[error("token storage I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Persists the session token across restarts.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Load the persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on I/O failure. A missing token is
    /// `Ok(None)`, not an error.
    async fn load(&self) -> Result<Option<AuthToken>, StorageError>;

    /// Persist the token.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on I/O failure.
    async fn save(&self, token: &AuthToken) -> Result<(), StorageError>;

    /// Erase any persisted token.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on I/O failure. Clearing an already-empty
    /// store succeeds.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// File-backed token storage.
///
/// Stores the raw token string at a configured path, the closest native
/// analogue to the browser-local storage the session originally lived in.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Create storage rooted at `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&self) -> Result<Option<AuthToken>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let raw = raw.trim().to_string();
                if raw.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(AuthToken::new(raw)))
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &AuthToken) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, token.as_str()).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
