//! Integration tests for the store runtime: state publication, action
//! observation, request-response waits, and graceful shutdown.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use supportdesk_core::effect::Effect;
use supportdesk_core::reducer::Reducer;
use supportdesk_core::{SmallVec, smallvec};
use supportdesk_runtime::{Store, StoreError};

#[derive(Debug, Clone, PartialEq)]
enum FetchAction {
    /// Kick off a fetch with an artificial latency
    Fetch { latency: Duration },
    /// Fetch finished
    Fetched { value: u32 },
    /// Plain synchronous bump
    Bump,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct FetchState {
    value: u32,
    in_flight: bool,
}

#[derive(Clone)]
struct FetchEnv;

#[derive(Clone)]
struct FetchReducer;

impl Reducer for FetchReducer {
    type State = FetchState;
    type Action = FetchAction;
    type Environment = FetchEnv;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FetchAction::Fetch { latency } => {
                state.in_flight = true;
                smallvec![Effect::future(async move {
                    tokio::time::sleep(latency).await;
                    Some(FetchAction::Fetched { value: 42 })
                })]
            },
            FetchAction::Fetched { value } => {
                state.in_flight = false;
                state.value = value;
                smallvec![Effect::None]
            },
            FetchAction::Bump => {
                state.value += 1;
                smallvec![Effect::None]
            },
        }
    }
}

fn store() -> Store<FetchState, FetchAction, FetchEnv, FetchReducer> {
    Store::new(FetchState::default(), FetchReducer, FetchEnv)
}

#[tokio::test]
async fn watch_subscribers_observe_every_reduction() {
    let store = store();
    let mut states = store.subscribe_state();

    store.send(FetchAction::Bump).await.unwrap();
    states.changed().await.unwrap();
    assert_eq!(states.borrow_and_update().value, 1);

    store.send(FetchAction::Bump).await.unwrap();
    states.changed().await.unwrap();
    assert_eq!(states.borrow_and_update().value, 2);
}

#[tokio::test]
async fn late_subscriber_sees_current_state_immediately() {
    let store = store();
    store.send(FetchAction::Bump).await.unwrap();

    // No polling needed: the receiver is seeded with the latest state
    let states = store.subscribe_state();
    assert_eq!(states.borrow().value, 1);
}

#[tokio::test]
async fn effect_handle_waits_for_feedback() {
    let store = store();

    let handle = store
        .send(FetchAction::Fetch {
            latency: Duration::from_millis(20),
        })
        .await
        .unwrap();
    assert!(store.state().await.in_flight);

    handle
        .wait_with_timeout(Duration::from_secs(5))
        .await
        .unwrap();

    let state = store.state().await;
    assert!(!state.in_flight);
    assert_eq!(state.value, 42);
}

#[tokio::test]
async fn send_and_wait_for_returns_the_matching_action() {
    let store = store();

    let result = store
        .send_and_wait_for(
            FetchAction::Fetch {
                latency: Duration::from_millis(10),
            },
            |action| matches!(action, FetchAction::Fetched { .. }),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert_eq!(result, FetchAction::Fetched { value: 42 });
}

#[tokio::test]
async fn send_and_wait_for_times_out_without_a_match() {
    let store = store();

    let result = store
        .send_and_wait_for(
            FetchAction::Bump,
            |action| matches!(action, FetchAction::Fetched { .. }),
            Duration::from_millis(50),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}

#[tokio::test]
async fn only_feedback_actions_are_broadcast() {
    let store = store();
    let mut actions = store.subscribe_actions();

    let handle = store
        .send(FetchAction::Fetch {
            latency: Duration::from_millis(10),
        })
        .await
        .unwrap();
    handle
        .wait_with_timeout(Duration::from_secs(5))
        .await
        .unwrap();

    // The initial Fetch is not broadcast; only the Fetched feedback is
    let observed = actions.recv().await.unwrap();
    assert_eq!(observed, FetchAction::Fetched { value: 42 });
    assert!(actions.try_recv().is_err());
}

#[tokio::test]
async fn shutdown_drains_pending_effects_and_rejects_new_sends() {
    let store = store();

    store
        .send(FetchAction::Fetch {
            latency: Duration::from_millis(30),
        })
        .await
        .unwrap();

    store.shutdown(Duration::from_secs(5)).await.unwrap();
    assert_eq!(store.state().await.value, 42);

    let rejected = store.send(FetchAction::Bump).await;
    assert!(matches!(rejected, Err(StoreError::ShutdownInProgress)));
}
