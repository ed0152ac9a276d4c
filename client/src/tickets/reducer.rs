//! Ticket workflow reducer.
//!
//! Orchestrates both workflows over the backend ticket API:
//!
//! - **User submission**: create a ticket, list own tickets
//! - **Admin triage**: list all tickets (filterable), respond, set status
//!
//! Two rules hold everywhere:
//!
//! 1. Validation precedes the network. An empty field or whitespace-only
//!    response produces a [`crate::error::ClientError::Validation`] and
//!    zero effects.
//! 2. Mutations refresh. Every successful mutating operation schedules a
//!    reload of the caller's listing (own or admin, under the remembered
//!    filter) so the view reflects server truth; on failure the list is
//!    left untouched and the error is surfaced.

use supportdesk_core::effect::Effect;
use supportdesk_core::reducer::Reducer;
use supportdesk_core::{SmallVec, smallvec};

use crate::api::{NewTicket, RespondRequest, SupportApi};
use crate::error::ClientError;
use crate::tickets::actions::TicketAction;
use crate::tickets::model::Status;
use crate::tickets::state::{ListScope, TicketState};

/// Dependencies for the ticket reducer.
#[derive(Clone)]
pub struct TicketEnvironment<A>
where
    A: SupportApi + Clone,
{
    /// Backend API client.
    pub api: A,
}

impl<A> TicketEnvironment<A>
where
    A: SupportApi + Clone,
{
    /// Create a new ticket environment.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self { api }
    }
}

/// Ticket workflow reducer.
#[derive(Debug, Clone)]
pub struct TicketReducer<A> {
    /// Phantom data to hold the API type parameter.
    _phantom: std::marker::PhantomData<A>,
}

impl<A> TicketReducer<A> {
    /// Create a new ticket reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<A> Default for TicketReducer<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Reducer for TicketReducer<A>
where
    A: SupportApi + Clone + 'static,
{
    type State = TicketState;
    type Action = TicketAction;
    type Environment = TicketEnvironment<A>;

    #[allow(clippy::too_many_lines)] // One arm per operation; each is short
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TicketAction::Create {
                title,
                description,
                category,
            } => {
                if title.trim().is_empty() {
                    state.last_error = Some(ClientError::required("title"));
                    return smallvec![Effect::None];
                }
                if description.trim().is_empty() {
                    state.last_error = Some(ClientError::required("description"));
                    return smallvec![Effect::None];
                }
                let Some(category) = category else {
                    state.last_error = Some(ClientError::required("category"));
                    return smallvec![Effect::None];
                };

                state.last_error = None;
                state.loading = true;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    let ticket = NewTicket {
                        title,
                        description,
                        category,
                    };
                    match api.create_ticket(&ticket).await {
                        Ok(ticket) => Some(TicketAction::Created { ticket }),
                        Err(error) => Some(TicketAction::Failed { error }),
                    }
                })]
            },

            TicketAction::Created { ticket } => {
                state.loading = false;
                // Visible immediately; the follow-up reload replaces the
                // list with server ordering.
                state.tickets.insert(0, ticket);

                smallvec![refresh(state)]
            },

            TicketAction::LoadOwn => {
                state.scope = ListScope::Own;
                state.filter = None;
                state.loading = true;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.list_own_tickets().await {
                        Ok(tickets) => Some(TicketAction::Loaded { tickets }),
                        Err(error) => Some(TicketAction::Failed { error }),
                    }
                })]
            },

            TicketAction::LoadAdmin { filter } => {
                state.scope = ListScope::Admin;
                state.filter = filter;
                state.loading = true;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.list_admin_tickets(filter).await {
                        Ok(tickets) => Some(TicketAction::Loaded { tickets }),
                        Err(error) => Some(TicketAction::Failed { error }),
                    }
                })]
            },

            TicketAction::Loaded { tickets } => {
                state.loading = false;
                state.last_error = None;
                state.tickets = tickets;
                smallvec![Effect::None]
            },

            TicketAction::Respond { id, response } => {
                if response.trim().is_empty() {
                    state.last_error = Some(ClientError::validation(
                        "response",
                        "response cannot be empty",
                    ));
                    return smallvec![Effect::None];
                }

                state.last_error = None;
                state.loading = true;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    // The respond call always carries ANSWERED with the text.
                    let request = RespondRequest {
                        admin_response: response,
                        status: Status::Answered,
                    };
                    match api.respond_to_ticket(id, &request).await {
                        Ok(ticket) => Some(TicketAction::Responded { ticket }),
                        Err(error) => Some(TicketAction::Failed { error }),
                    }
                })]
            },

            TicketAction::Responded { ticket } | TicketAction::StatusUpdated { ticket } => {
                state.loading = false;
                if let Some(existing) = state.tickets.iter_mut().find(|t| t.id == ticket.id) {
                    *existing = ticket;
                }

                smallvec![refresh(state)]
            },

            TicketAction::SetStatus { id, status } => {
                state.last_error = None;
                state.loading = true;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    match api.set_ticket_status(id, status).await {
                        Ok(ticket) => Some(TicketAction::StatusUpdated { ticket }),
                        Err(error) => Some(TicketAction::Failed { error }),
                    }
                })]
            },

            TicketAction::Failed { error } => {
                state.loading = false;
                state.last_error = Some(error);
                smallvec![Effect::None]
            },
        }
    }
}

/// Reload the caller's listing after a successful mutation.
fn refresh(state: &TicketState) -> Effect<TicketAction> {
    let action = match state.scope {
        ListScope::Own => TicketAction::LoadOwn,
        ListScope::Admin => TicketAction::LoadAdmin {
            filter: state.filter,
        },
    };
    Effect::future(async move { Some(action) })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use supportdesk_testing::{ReducerTest, assertions};

    use super::*;
    use crate::mocks::MockSupportApi;
    use crate::tickets::model::{Category, Ticket, TicketId};

    fn env() -> TicketEnvironment<MockSupportApi> {
        TicketEnvironment::new(MockSupportApi::new())
    }

    fn ticket(status: Status) -> Ticket {
        Ticket {
            id: TicketId::new(),
            title: "Printer broken".into(),
            description: "No toner".into(),
            category: Category::Technical,
            status,
            created_by: "alice".into(),
            admin_response: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_blank_title_fails_validation_without_effects() {
        ReducerTest::new(TicketReducer::new())
            .with_env(env())
            .given_state(TicketState::default())
            .when_action(TicketAction::Create {
                title: "  ".into(),
                description: "d".into(),
                category: Some(Category::General),
            })
            .then_state(|state| {
                assert!(matches!(
                    state.last_error,
                    Some(ClientError::Validation { ref field, .. }) if field == "title"
                ));
                assert!(!state.loading);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_missing_category_fails_validation() {
        ReducerTest::new(TicketReducer::new())
            .with_env(env())
            .given_state(TicketState::default())
            .when_action(TicketAction::Create {
                title: "t".into(),
                description: "d".into(),
                category: None,
            })
            .then_state(|state| {
                assert!(matches!(
                    state.last_error,
                    Some(ClientError::Validation { ref field, .. }) if field == "category"
                ));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_valid_create_schedules_the_request() {
        ReducerTest::new(TicketReducer::new())
            .with_env(env())
            .given_state(TicketState::default())
            .when_action(TicketAction::Create {
                title: "t".into(),
                description: "d".into(),
                category: Some(Category::Billing),
            })
            .then_state(|state| {
                assert!(state.loading);
                assert!(state.last_error.is_none());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_loaded_replaces_the_list_and_clears_errors() {
        let state = TicketState {
            tickets: vec![ticket(Status::Open)],
            loading: true,
            last_error: Some(ClientError::Network {
                reason: "connection refused".into(),
            }),
            ..TicketState::default()
        };
        let incoming = vec![ticket(Status::Answered), ticket(Status::Closed)];
        ReducerTest::new(TicketReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(TicketAction::Loaded {
                tickets: incoming.clone(),
            })
            .then_state(move |state| {
                assert_eq!(state.tickets, incoming);
                assert!(!state.loading);
                assert!(state.last_error.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_failure_keeps_the_list() {
        let existing = vec![ticket(Status::Open)];
        let state = TicketState {
            tickets: existing.clone(),
            loading: true,
            ..TicketState::default()
        };
        ReducerTest::new(TicketReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(TicketAction::Failed {
                error: ClientError::Server {
                    status: 500,
                    message: "database unavailable".into(),
                },
            })
            .then_state(move |state| {
                assert_eq!(state.tickets, existing);
                assert!(!state.loading);
                assert!(matches!(
                    state.last_error,
                    Some(ClientError::Server { status: 500, .. })
                ));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_whitespace_response_fails_validation() {
        ReducerTest::new(TicketReducer::new())
            .with_env(env())
            .given_state(TicketState::default())
            .when_action(TicketAction::Respond {
                id: TicketId::new(),
                response: "   ".into(),
            })
            .then_state(|state| {
                assert!(matches!(
                    state.last_error,
                    Some(ClientError::Validation { ref field, .. }) if field == "response"
                ));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_responded_updates_in_place_and_refreshes() {
        let original = ticket(Status::Open);
        let mut updated = original.clone();
        updated.status = Status::Answered;
        updated.admin_response = Some("Replaced the toner".into());

        let state = TicketState {
            tickets: vec![original],
            scope: ListScope::Admin,
            loading: true,
            ..TicketState::default()
        };
        let expected = updated.clone();
        ReducerTest::new(TicketReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(TicketAction::Responded { ticket: updated })
            .then_state(move |state| {
                assert_eq!(state.tickets, vec![expected.clone()]);
                assert!(!state.loading);
            })
            .then_effects(|effects| {
                // The follow-up reload of the admin listing
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_load_admin_remembers_the_filter() {
        ReducerTest::new(TicketReducer::new())
            .with_env(env())
            .given_state(TicketState::default())
            .when_action(TicketAction::LoadAdmin {
                filter: Some(Status::Open),
            })
            .then_state(|state| {
                assert_eq!(state.scope, ListScope::Admin);
                assert_eq!(state.filter, Some(Status::Open));
                assert!(state.loading);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }
}
