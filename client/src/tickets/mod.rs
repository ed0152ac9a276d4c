//! Ticket model and workflows.

pub mod actions;
pub mod model;
pub mod reducer;
pub mod state;

pub use actions::TicketAction;
pub use model::{
    Category, RESPONSE_PLACEHOLDER, Status, Ticket, TicketId, display_admin_response,
};
pub use reducer::{TicketEnvironment, TicketReducer};
pub use state::{ListScope, TicketState};
