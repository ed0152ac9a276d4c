//! Ticket workflow state.

use crate::error::ClientError;
use crate::tickets::model::{Status, Ticket};

/// Which listing the current view is scoped to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListScope {
    /// The calling user's own tickets.
    #[default]
    Own,
    /// All tickets (admin triage view).
    Admin,
}

/// State for the ticket workflows (both user submission and admin triage).
///
/// On any failure the list stays untouched and the error lands in
/// `last_error`; only successful loads replace `tickets`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketState {
    /// The currently visible ticket list. Ordering is server-determined
    /// (reverse-chronological by creation unless the backend says
    /// otherwise); the client never re-sorts.
    pub tickets: Vec<Ticket>,

    /// Which listing `tickets` came from.
    pub scope: ListScope,

    /// Status filter for the admin listing (`None` = unfiltered).
    pub filter: Option<Status>,

    /// Whether a request is outstanding. Views disable their triggering
    /// controls while this is set; the client does not deduplicate
    /// in-flight requests itself.
    pub loading: bool,

    /// Last workflow failure, surfaced to the user.
    pub last_error: Option<ClientError>,
}

impl TicketState {
    /// Look up a ticket by id in the visible list.
    #[must_use]
    pub fn find(&self, id: crate::tickets::model::TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }
}
