//! Authenticated API client.
//!
//! The [`SupportApi`] trait covers every REST call the client makes; the
//! [`http::HttpSupportApi`] implementation attaches the bearer token from
//! a [`SharedToken`] cell the session reducer keeps current.

pub mod http;

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::state::AuthToken;
use crate::tickets::model::{Category, Status, Ticket, TicketId};

pub use http::HttpSupportApi;

/// Login/registration credentials.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

/// Login response body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// The issued bearer token
    pub token: String,
}

/// New-ticket request body.
#[derive(Debug, Clone, Serialize)]
pub struct NewTicket {
    /// Short summary
    pub title: String,
    /// Full description
    pub description: String,
    /// Chosen category
    pub category: Category,
}

/// Admin-response request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    /// Response text
    pub admin_response: String,
    /// Status sent alongside the response (always ANSWERED in practice)
    pub status: Status,
}

/// The backend's REST surface, as consumed by this client.
///
/// Implementations must be cheap to clone; reducers clone them into
/// effect futures.
#[async_trait]
pub trait SupportApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken>;

    /// `POST /auth/register`
    async fn register(&self, credentials: &Credentials) -> Result<()>;

    /// `POST /tickets`
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket>;

    /// `GET /tickets` — scoped server-side to the calling user.
    async fn list_own_tickets(&self) -> Result<Vec<Ticket>>;

    /// `GET /tickets/admin?status=` — admin-only; absent filter means
    /// unfiltered.
    async fn list_admin_tickets(&self, filter: Option<Status>) -> Result<Vec<Ticket>>;

    /// `POST /tickets/admin/{id}/respond`
    async fn respond_to_ticket(&self, id: TicketId, request: &RespondRequest) -> Result<Ticket>;

    /// `POST /tickets/admin/{id}/status` — body is the bare status value,
    /// JSON-encoded (a historical wire quirk the backend expects).
    async fn set_ticket_status(&self, id: TicketId, status: Status) -> Result<Ticket>;
}

/// Shared bearer cell.
///
/// The session reducer pushes token changes here; the HTTP client takes a
/// snapshot per request. Read-mostly: whatever snapshot is valid at call
/// time is used, with no mid-request refresh.
#[derive(Debug, Clone, Default)]
pub struct SharedToken {
    inner: Arc<RwLock<Option<AuthToken>>>,
}

impl SharedToken {
    /// Create an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new token.
    pub fn set(&self, token: AuthToken) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(token);
        }
    }

    /// Clear the token.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }

    /// Snapshot the current token.
    #[must_use]
    pub fn bearer(&self) -> Option<AuthToken> {
        self.inner.read().map_or(None, |guard| guard.clone())
    }
}
