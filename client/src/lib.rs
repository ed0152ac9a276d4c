//! Role-based client for a support-ticket backend.
//!
//! Three concerns, each a reducer or pure function over shared state:
//!
//! - **Session** ([`session`]): login, registration, token persistence,
//!   and role resolution from the credential token's payload. Session
//!   state is published through the runtime store's watch channel, so
//!   dependent components observe changes without polling.
//! - **Route guarding** ([`guard`]): a pure four-way decision (allow,
//!   redirect to login, redirect to unauthorized, pending) from the
//!   session and a route's required roles.
//! - **Tickets** ([`tickets`]): the user submission and admin triage
//!   workflows, with local validation before any network call and a
//!   listing refresh after every successful mutation.
//!
//! The [`api`] module carries the REST surface behind the [`api::SupportApi`]
//! trait; reducers depend on the trait, so tests swap in
//! [`mocks::MockSupportApi`] without touching the workflow logic.
//!
//! # Example
//!
//! ```no_run
//! use supportdesk_client::api::{HttpSupportApi, SharedToken};
//! use supportdesk_client::config::ClientConfig;
//! use supportdesk_client::session::{FileTokenStorage, SessionEnvironment, SessionReducer};
//! use supportdesk_client::{SessionState, SessionStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env();
//! let token_cell = SharedToken::new();
//! let api = HttpSupportApi::new(&config, token_cell.clone())?;
//! let storage = FileTokenStorage::new(std::path::PathBuf::from("/tmp/supportdesk-token"));
//!
//! let store: SessionStore<_, _> = SessionStore::new(
//!     SessionState::default(),
//!     SessionReducer::new(),
//!     SessionEnvironment::new(api, storage, token_cell),
//! );
//! let _sessions = store.subscribe_state();
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod session;
pub mod tickets;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use guard::{Decision, Route, decide, guard_route, landing_route};
pub use session::{AuthToken, Role, Session, SessionAction, SessionState};
pub use tickets::{Category, Status, Ticket, TicketAction, TicketId, TicketState};

use supportdesk_runtime::Store;

/// Runtime store driving the session reducer.
pub type SessionStore<A, T> = Store<
    session::SessionState,
    session::SessionAction,
    session::SessionEnvironment<A, T>,
    session::SessionReducer<A, T>,
>;

/// Runtime store driving the ticket reducer.
pub type TicketStore<A> = Store<
    tickets::TicketState,
    tickets::TicketAction,
    tickets::TicketEnvironment<A>,
    tickets::TicketReducer<A>,
>;
