//! Session reducer.
//!
//! Owns the login, registration, restore, and logout flows.
//!
//! # Flow
//!
//! 1. A form submits credentials; validation runs locally first
//! 2. The login round-trip yields a token (`TokenReceived`)
//! 3. The token is stored with an unresolved role (guards render pending)
//! 4. The role claim decodes (`RoleResolved`) or fails (`DecodeFailed`)
//! 5. On success the token is published to the shared bearer cell and
//!    persisted; on failure the session and storage are cleared
//!
//! Dependent components never poll: the runtime store republishes
//! `SessionState` after every reduction, and the authenticated API client
//! reads the shared bearer cell updated here.

use supportdesk_core::effect::Effect;
use supportdesk_core::reducer::Reducer;
use supportdesk_core::{SmallVec, smallvec};

use crate::api::{Credentials, SharedToken, SupportApi};
use crate::error::ClientError;
use crate::session::actions::SessionAction;
use crate::session::state::{Session, SessionState};
use crate::session::storage::TokenStorage;
use crate::session::token::decode_role_claim;

/// Dependencies for the session reducer.
#[derive(Clone)]
pub struct SessionEnvironment<A, T>
where
    A: SupportApi + Clone,
    T: TokenStorage + Clone,
{
    /// Backend API client.
    pub api: A,

    /// Token persistence.
    pub storage: T,

    /// Bearer cell read by the authenticated API client.
    pub token_cell: SharedToken,
}

impl<A, T> SessionEnvironment<A, T>
where
    A: SupportApi + Clone,
    T: TokenStorage + Clone,
{
    /// Create a new session environment.
    #[must_use]
    pub const fn new(api: A, storage: T, token_cell: SharedToken) -> Self {
        Self {
            api,
            storage,
            token_cell,
        }
    }
}

/// Session reducer.
#[derive(Debug, Clone)]
pub struct SessionReducer<A, T> {
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(A, T)>,
}

impl<A, T> SessionReducer<A, T> {
    /// Create a new session reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<A, T> Default for SessionReducer<A, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate credential fields; the first offending field wins.
fn validate_credentials(username: &str, password: &str) -> Result<(), ClientError> {
    if username.trim().is_empty() {
        return Err(ClientError::required("username"));
    }
    if password.trim().is_empty() {
        return Err(ClientError::required("password"));
    }
    Ok(())
}

impl<A, T> Reducer for SessionReducer<A, T>
where
    A: SupportApi + Clone + 'static,
    T: TokenStorage + Clone + 'static,
{
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment<A, T>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SessionAction::SubmitLogin { username, password } => {
                if let Err(error) = validate_credentials(&username, &password) {
                    state.last_error = Some(error);
                    return smallvec![Effect::None];
                }
                state.last_error = None;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    let credentials = Credentials { username, password };
                    match api.login(&credentials).await {
                        Ok(token) => Some(SessionAction::TokenReceived { token }),
                        Err(error) => Some(SessionAction::AuthFailed { error }),
                    }
                })]
            },

            SessionAction::SubmitRegistration {
                username,
                password,
                confirm_password,
            } => {
                if let Err(error) = validate_credentials(&username, &password) {
                    state.last_error = Some(error);
                    return smallvec![Effect::None];
                }
                if confirm_password != password {
                    state.last_error = Some(ClientError::validation(
                        "confirm_password",
                        "passwords must match",
                    ));
                    return smallvec![Effect::None];
                }
                state.last_error = None;
                state.registered = false;

                let api = env.api.clone();
                smallvec![Effect::future(async move {
                    let credentials = Credentials { username, password };
                    match api.register(&credentials).await {
                        Ok(()) => Some(SessionAction::RegistrationComplete),
                        Err(error) => Some(SessionAction::AuthFailed { error }),
                    }
                })]
            },

            SessionAction::TokenReceived { token } => {
                // Token present, role unresolved: guards render pending
                // until the decode lands.
                state.session = Some(Session::pending(token.clone()));
                state.last_error = None;

                smallvec![Effect::future(async move {
                    match decode_role_claim(&token) {
                        Ok(role) => Some(SessionAction::RoleResolved { role }),
                        Err(error) => Some(SessionAction::DecodeFailed {
                            reason: error.to_string(),
                        }),
                    }
                })]
            },

            SessionAction::RoleResolved { role } => {
                let Some(session) = state.session.as_mut() else {
                    // Logout won the race; nothing to resolve.
                    return smallvec![Effect::None];
                };
                session.role = Some(role);

                let token = session.token.clone();
                let cell = env.token_cell.clone();
                let storage = env.storage.clone();
                smallvec![Effect::future(async move {
                    cell.set(token.clone());
                    if let Err(error) = storage.save(&token).await {
                        tracing::warn!(%error, "failed to persist session token");
                    }
                    None
                })]
            },

            SessionAction::DecodeFailed { reason } => {
                // Invariant: role is present iff the token decoded. A
                // malformed token clears everything and sends the user
                // back to login.
                state.session = None;
                state.last_error = Some(ClientError::Decode { reason });

                smallvec![clear_credentials(env)]
            },

            SessionAction::RegistrationComplete => {
                state.registered = true;
                smallvec![Effect::None]
            },

            SessionAction::AuthFailed { error } => {
                state.last_error = Some(error);
                smallvec![Effect::None]
            },

            SessionAction::Logout => {
                state.session = None;
                state.registered = false;
                state.last_error = None;

                smallvec![clear_credentials(env)]
            },

            SessionAction::Restore => {
                let storage = env.storage.clone();
                smallvec![Effect::future(async move {
                    match storage.load().await {
                        Ok(Some(token)) => Some(SessionAction::TokenReceived { token }),
                        Ok(None) => None,
                        Err(error) => {
                            tracing::warn!(%error, "failed to load persisted token");
                            None
                        },
                    }
                })]
            },
        }
    }
}

/// Effect clearing the shared bearer cell and persisted token.
fn clear_credentials<A, T>(
    env: &SessionEnvironment<A, T>,
) -> Effect<SessionAction>
where
    A: SupportApi + Clone + 'static,
    T: TokenStorage + Clone + 'static,
{
    let cell = env.token_cell.clone();
    let storage = env.storage.clone();
    Effect::future(async move {
        cell.clear();
        if let Err(error) = storage.clear().await {
            tracing::warn!(%error, "failed to clear persisted token");
        }
        None
    })
}
