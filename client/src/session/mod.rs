//! Session store: login/logout/restore flows and the session snapshot
//! read by every dependent component.
//!
//! Session changes are observable without polling: the runtime store
//! republishes [`SessionState`] after every reduction, and the reducer
//! pushes the bearer token into the [`crate::api::SharedToken`] cell the
//! HTTP client reads.

pub mod actions;
pub mod reducer;
pub mod state;
pub mod storage;
pub mod token;

pub use actions::SessionAction;
pub use reducer::{SessionEnvironment, SessionReducer};
pub use state::{AuthToken, Role, Session, SessionState};
pub use storage::{FileTokenStorage, StorageError, TokenStorage};
pub use token::decode_role_claim;
