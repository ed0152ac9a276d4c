//! End-to-end session flows through the runtime store: login, role
//! resolution, routing, persistence, restore, and logout.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use supportdesk_client::SessionStore;
use supportdesk_client::api::SharedToken;
use supportdesk_client::guard::{Decision, Route, guard_route, landing_route};
use supportdesk_client::mocks::{InMemoryTokenStorage, MockSupportApi, unsigned_token};
use supportdesk_client::session::{
    AuthToken, Role, SessionAction, SessionEnvironment, SessionReducer, SessionState,
    TokenStorage,
};

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    store: SessionStore<MockSupportApi, InMemoryTokenStorage>,
    api: MockSupportApi,
    storage: InMemoryTokenStorage,
    token_cell: SharedToken,
}

fn harness(api: MockSupportApi) -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let storage = InMemoryTokenStorage::new();
    let token_cell = SharedToken::new();
    let store = SessionStore::new(
        SessionState::default(),
        SessionReducer::new(),
        SessionEnvironment::new(api.clone(), storage.clone(), token_cell.clone()),
    );
    Harness {
        store,
        api,
        storage,
        token_cell,
    }
}

async fn send_and_settle(harness: &Harness, action: SessionAction) {
    let handle = harness.store.send(action).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();
}

#[tokio::test]
async fn admin_login_resolves_role_and_lands_on_admin_panel() {
    let h = harness(MockSupportApi::with_role(Role::Admin));

    send_and_settle(
        &h,
        SessionAction::SubmitLogin {
            username: "root".into(),
            password: "hunter2".into(),
        },
    )
    .await;

    let state = h.store.state().await;
    let session = state.session.as_ref().unwrap();
    assert_eq!(session.role, Some(Role::Admin));

    assert_eq!(guard_route(Route::Admin, Some(session)), Decision::Allow);
    assert_eq!(guard_route(Route::Panel, Some(session)), Decision::Allow);
    assert_eq!(landing_route(Role::Admin), Route::Admin);

    // The bearer cell and persistence both carry the token now
    assert_eq!(h.token_cell.bearer(), Some(session.token.clone()));
    assert_eq!(h.storage.stored().await, Some(session.token.clone()));
}

#[tokio::test]
async fn user_is_unauthorized_on_admin_route() {
    let h = harness(MockSupportApi::with_role(Role::User));

    send_and_settle(
        &h,
        SessionAction::SubmitLogin {
            username: "alice".into(),
            password: "hunter2".into(),
        },
    )
    .await;

    let state = h.store.state().await;
    let session = state.session.as_ref().unwrap();
    assert_eq!(session.role, Some(Role::User));
    assert_eq!(landing_route(Role::User), Route::Panel);
    assert_eq!(
        guard_route(Route::Admin, Some(session)),
        Decision::RedirectUnauthorized
    );
}

#[tokio::test]
async fn empty_credentials_never_reach_the_network() {
    let h = harness(MockSupportApi::new());

    send_and_settle(
        &h,
        SessionAction::SubmitLogin {
            username: "   ".into(),
            password: "hunter2".into(),
        },
    )
    .await;

    let state = h.store.state().await;
    assert!(matches!(
        state.last_error,
        Some(supportdesk_client::ClientError::Validation { .. })
    ));
    assert!(state.session.is_none());
    assert_eq!(h.api.calls().await.login, 0);
}

#[tokio::test]
async fn password_mismatch_blocks_registration() {
    let h = harness(MockSupportApi::new());

    send_and_settle(
        &h,
        SessionAction::SubmitRegistration {
            username: "alice".into(),
            password: "hunter2".into(),
            confirm_password: "hunter3".into(),
        },
    )
    .await;

    let state = h.store.state().await;
    assert!(!state.registered);
    assert_eq!(h.api.calls().await.register, 0);
}

#[tokio::test]
async fn registration_completes_without_a_session() {
    let h = harness(MockSupportApi::new());

    send_and_settle(
        &h,
        SessionAction::SubmitRegistration {
            username: "alice".into(),
            password: "hunter2".into(),
            confirm_password: "hunter2".into(),
        },
    )
    .await;

    let state = h.store.state().await;
    assert!(state.registered);
    // Registration does not log in; the login form is the next stop
    assert!(state.session.is_none());
    assert_eq!(h.api.calls().await.register, 1);
}

#[tokio::test]
async fn malformed_token_clears_session_and_storage() {
    let h = harness(MockSupportApi::new());
    h.storage
        .save(&AuthToken::from("not-a-credential"))
        .await
        .unwrap();

    send_and_settle(&h, SessionAction::Restore).await;

    let state = h.store.state().await;
    assert!(state.session.is_none());
    assert!(matches!(
        state.last_error,
        Some(supportdesk_client::ClientError::Decode { .. })
    ));
    assert_eq!(h.storage.stored().await, None);
    assert_eq!(h.token_cell.bearer(), None);
}

#[tokio::test]
async fn restore_resolves_a_persisted_token() {
    let h = harness(MockSupportApi::new());
    let token = unsigned_token(Role::User);
    h.storage.save(&token).await.unwrap();

    send_and_settle(&h, SessionAction::Restore).await;

    let state = h.store.state().await;
    let session = state.session.as_ref().unwrap();
    assert_eq!(session.token, token);
    assert_eq!(session.role, Some(Role::User));
    assert_eq!(h.token_cell.bearer(), Some(token));
}

#[tokio::test]
async fn restore_with_empty_storage_stays_logged_out() {
    let h = harness(MockSupportApi::new());

    send_and_settle(&h, SessionAction::Restore).await;

    let state = h.store.state().await;
    assert!(state.session.is_none());
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn logout_erases_token_everywhere() {
    let h = harness(MockSupportApi::with_role(Role::Admin));

    send_and_settle(
        &h,
        SessionAction::SubmitLogin {
            username: "root".into(),
            password: "hunter2".into(),
        },
    )
    .await;
    assert!(h.token_cell.bearer().is_some());

    send_and_settle(&h, SessionAction::Logout).await;

    let state = h.store.state().await;
    assert!(state.session.is_none());
    assert_eq!(h.token_cell.bearer(), None);
    assert_eq!(h.storage.stored().await, None);

    // A later restore finds nothing
    send_and_settle(&h, SessionAction::Restore).await;
    assert!(h.store.state().await.session.is_none());
}

#[tokio::test]
async fn failed_login_surfaces_the_server_error() {
    let h = harness(MockSupportApi::new());
    h.api
        .fail_next(supportdesk_client::ClientError::Server {
            status: 401,
            message: "bad credentials".into(),
        })
        .await;

    send_and_settle(
        &h,
        SessionAction::SubmitLogin {
            username: "alice".into(),
            password: "wrong".into(),
        },
    )
    .await;

    let state = h.store.state().await;
    assert!(state.session.is_none());
    assert!(matches!(
        state.last_error,
        Some(supportdesk_client::ClientError::Server { status: 401, .. })
    ));
}

#[tokio::test]
async fn state_watch_publishes_session_changes() {
    let h = harness(MockSupportApi::with_role(Role::User));
    let mut sessions = h.store.subscribe_state();

    send_and_settle(
        &h,
        SessionAction::SubmitLogin {
            username: "alice".into(),
            password: "hunter2".into(),
        },
    )
    .await;

    // The receiver observes the latest state without polling the store
    sessions.changed().await.unwrap();
    let observed = sessions.borrow_and_update().clone();
    assert_eq!(observed.role(), Some(Role::User));
}
