//! Test doubles for the backend API and token storage.
//!
//! Available behind the `test-utils` feature. [`MockSupportApi`] keeps an
//! in-memory ticket table and a call log so tests can assert both outcomes
//! and the absence of network traffic; [`InMemoryTokenStorage`] replaces
//! the filesystem.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use supportdesk_core::environment::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::api::{Credentials, NewTicket, RespondRequest, SupportApi};
use crate::error::{ClientError, Result};
use crate::session::state::{AuthToken, Role};
use crate::session::storage::{StorageError, TokenStorage};
use crate::tickets::model::{Status, Ticket, TicketId};

/// Build an unsigned token whose payload carries the given role claim.
///
/// Shape matches what the backend issues: three dot-separated base64url
/// segments, with a junk signature the client never checks.
#[must_use]
pub fn unsigned_token(role: Role) -> AuthToken {
    token_with_payload(&serde_json::json!({ "sub": "test-user", "role": role.as_str() }))
}

/// Build an unsigned token around an arbitrary JSON payload.
#[must_use]
pub fn token_with_payload(payload: &serde_json::Value) -> AuthToken {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    AuthToken::new(format!("{header}.{body}.sig"))
}

/// Per-endpoint call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallLog {
    /// `POST /auth/login` calls
    pub login: usize,
    /// `POST /auth/register` calls
    pub register: usize,
    /// `POST /tickets` calls
    pub create: usize,
    /// `GET /tickets` calls
    pub list_own: usize,
    /// `GET /tickets/admin` calls
    pub list_admin: usize,
    /// respond calls
    pub respond: usize,
    /// status-change calls
    pub set_status: usize,
}

impl CallLog {
    /// Total calls across all endpoints.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.login
            + self.register
            + self.create
            + self.list_own
            + self.list_admin
            + self.respond
            + self.set_status
    }
}

#[derive(Debug, Default)]
struct MockInner {
    tickets: Vec<Ticket>,
    calls: CallLog,
    fail_next: Option<ClientError>,
    wrap_responses: bool,
    login_role: Option<Role>,
}

/// In-memory stand-in for the backend.
#[derive(Clone)]
pub struct MockSupportApi {
    inner: Arc<Mutex<MockInner>>,
    clock: Arc<dyn Clock>,
}

impl Default for MockSupportApi {
    fn default() -> Self {
        Self {
            inner: Arc::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl MockSupportApi {
    /// Mock backend that issues USER tokens at login.
    #[must_use]
    pub fn new() -> Self {
        Self::with_role(Role::User)
    }

    /// Stamp created tickets with the given clock instead of system time.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Mock backend that issues tokens carrying the given role at login.
    #[must_use]
    pub fn with_role(role: Role) -> Self {
        let api = Self::default();
        if let Ok(mut inner) = api.inner.try_lock() {
            inner.login_role = Some(role);
        }
        api
    }

    /// Make the next call fail with the given error.
    pub async fn fail_next(&self, error: ClientError) {
        self.inner.lock().await.fail_next = Some(error);
    }

    /// Store admin responses JSON-wrapped (`{"adminResponse": ...}`), the
    /// older of the two encodings seen in production data.
    pub async fn wrap_responses(&self, wrap: bool) {
        self.inner.lock().await.wrap_responses = wrap;
    }

    /// Seed the ticket table.
    pub async fn seed(&self, tickets: Vec<Ticket>) {
        self.inner.lock().await.tickets = tickets;
    }

    /// Snapshot the call log.
    pub async fn calls(&self) -> CallLog {
        self.inner.lock().await.calls
    }

    /// Snapshot the ticket table.
    pub async fn tickets(&self) -> Vec<Ticket> {
        self.inner.lock().await.tickets.clone()
    }

    fn not_found(id: TicketId) -> ClientError {
        ClientError::Server {
            status: 404,
            message: format!("ticket {id} not found"),
        }
    }
}

#[async_trait]
impl SupportApi for MockSupportApi {
    async fn login(&self, _credentials: &Credentials) -> Result<AuthToken> {
        let mut inner = self.inner.lock().await;
        inner.calls.login += 1;
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        let role = inner.login_role.unwrap_or(Role::User);
        Ok(unsigned_token(role))
    }

    async fn register(&self, _credentials: &Credentials) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.calls.register += 1;
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        Ok(())
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        let mut inner = self.inner.lock().await;
        inner.calls.create += 1;
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        let created = Ticket {
            id: TicketId::new(),
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            category: ticket.category,
            status: Status::Open,
            created_by: "test-user".to_string(),
            admin_response: None,
            created_at: self.clock.now(),
        };
        // Server lists newest first
        inner.tickets.insert(0, created.clone());
        Ok(created)
    }

    async fn list_own_tickets(&self) -> Result<Vec<Ticket>> {
        let mut inner = self.inner.lock().await;
        inner.calls.list_own += 1;
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        Ok(inner.tickets.clone())
    }

    async fn list_admin_tickets(&self, filter: Option<Status>) -> Result<Vec<Ticket>> {
        let mut inner = self.inner.lock().await;
        inner.calls.list_admin += 1;
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        Ok(inner
            .tickets
            .iter()
            .filter(|t| filter.is_none_or(|s| t.status == s))
            .cloned()
            .collect())
    }

    async fn respond_to_ticket(&self, id: TicketId, request: &RespondRequest) -> Result<Ticket> {
        let mut inner = self.inner.lock().await;
        inner.calls.respond += 1;
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        let wrap = inner.wrap_responses;
        let Some(ticket) = inner.tickets.iter_mut().find(|t| t.id == id) else {
            return Err(Self::not_found(id));
        };
        ticket.admin_response = Some(if wrap {
            serde_json::json!({ "adminResponse": request.admin_response }).to_string()
        } else {
            request.admin_response.clone()
        });
        ticket.status = request.status;
        Ok(ticket.clone())
    }

    async fn set_ticket_status(&self, id: TicketId, status: Status) -> Result<Ticket> {
        let mut inner = self.inner.lock().await;
        inner.calls.set_status += 1;
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        let Some(ticket) = inner.tickets.iter_mut().find(|t| t.id == id) else {
            return Err(Self::not_found(id));
        };
        ticket.status = status;
        Ok(ticket.clone())
    }
}

/// Token storage that never touches the filesystem.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStorage {
    token: Arc<Mutex<Option<AuthToken>>>,
}

impl InMemoryTokenStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the stored token.
    pub async fn stored(&self) -> Option<AuthToken> {
        self.token.lock().await.clone()
    }
}

#[async_trait]
impl TokenStorage for InMemoryTokenStorage {
    async fn load(&self) -> std::result::Result<Option<AuthToken>, StorageError> {
        Ok(self.token.lock().await.clone())
    }

    async fn save(&self, token: &AuthToken) -> std::result::Result<(), StorageError> {
        *self.token.lock().await = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> std::result::Result<(), StorageError> {
        *self.token.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::token::decode_role_claim;

    #[test]
    fn test_unsigned_token_round_trips_role() {
        let token = unsigned_token(Role::Admin);
        assert_eq!(decode_role_claim(&token).ok(), Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_mock_create_then_list() {
        let api = MockSupportApi::new();
        let created = api
            .create_ticket(&NewTicket {
                title: "Printer broken".into(),
                description: "No toner".into(),
                category: crate::tickets::model::Category::Technical,
            })
            .await;
        assert!(created.is_ok());

        let listed = api.list_own_tickets().await;
        assert_eq!(listed.map(|t| t.len()), Ok(1));
        assert_eq!(api.calls().await.create, 1);
    }

    #[tokio::test]
    async fn test_clock_stamps_created_tickets() {
        use chrono::{TimeZone, Utc};
        use supportdesk_core::environment::FixedClock;

        let time = Utc
            .with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
            .single()
            .unwrap_or_default();
        let api = MockSupportApi::new().with_clock(Arc::new(FixedClock { time }));

        let created = api
            .create_ticket(&NewTicket {
                title: "t".into(),
                description: "d".into(),
                category: crate::tickets::model::Category::General,
            })
            .await;
        assert_eq!(created.map(|t| t.created_at), Ok(time));
    }

    #[tokio::test]
    async fn test_fail_next_affects_one_call() {
        let api = MockSupportApi::new();
        api.fail_next(ClientError::Network {
            reason: "connection refused".into(),
        })
        .await;

        assert!(api.list_own_tickets().await.is_err());
        assert!(api.list_own_tickets().await.is_ok());
    }
}
