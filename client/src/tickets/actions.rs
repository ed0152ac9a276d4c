//! Ticket workflow actions.

use crate::error::ClientError;
use crate::tickets::model::{Category, Status, Ticket, TicketId};

/// All inputs to the ticket reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketAction {
    /// Submit a new ticket. All fields are validated locally before any
    /// request is made; `category` is `None` when the form selector was
    /// left untouched.
    Create {
        /// Short summary
        title: String,
        /// Full description
        description: String,
        /// Chosen category, if any
        category: Option<Category>,
    },

    /// The backend accepted the new ticket.
    Created {
        /// The created ticket as the server stored it
        ticket: Ticket,
    },

    /// Load the calling user's own tickets.
    LoadOwn,

    /// Load the admin listing, optionally filtered by exact status.
    LoadAdmin {
        /// Exact-match status filter (`None` = unfiltered)
        filter: Option<Status>,
    },

    /// A listing arrived.
    Loaded {
        /// Server-ordered tickets; replaces the visible list
        tickets: Vec<Ticket>,
    },

    /// Send an admin response. Whitespace-only text is rejected locally.
    Respond {
        /// Target ticket
        id: TicketId,
        /// Response text
        response: String,
    },

    /// The backend stored the response and moved the ticket to ANSWERED.
    Responded {
        /// The updated ticket
        ticket: Ticket,
    },

    /// Set a ticket's status directly (admin). No transition check
    /// client-side; the server is authoritative on legality.
    SetStatus {
        /// Target ticket
        id: TicketId,
        /// New status
        status: Status,
    },

    /// The backend applied the status change.
    StatusUpdated {
        /// The updated ticket
        ticket: Ticket,
    },

    /// A request failed; the list stays as it was.
    Failed {
        /// The surfaced failure
        error: ClientError,
    },
}
