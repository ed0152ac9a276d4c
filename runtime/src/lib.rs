//! # Supportdesk Runtime
//!
//! The Store runtime: owns feature state, runs reducers, and executes the
//! effects they return.
//!
//! The Store is the publish/subscribe seam of the client. Every reduction
//! republishes the new state on a watch channel, so dependent components
//! (the route guard reading the session, views reading ticket lists)
//! observe changes without polling. Actions produced by effects are
//! additionally broadcast for request-response patterns.
//!
//! Deliberately absent: retry policies, request queues, and deduplication.
//! This client treats the backend as the serialization point; a failed
//! request surfaces as an error action and nothing is replayed.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use supportdesk_core::effect::Effect;
use supportdesk_core::reducer::Reducer;
use tokio::sync::{Notify, RwLock, broadcast, watch};

/// Errors surfaced by the Store itself (not by domain reducers).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store is shutting down and rejects new actions.
    #[error("Store is shutting down")]
    ShutdownInProgress,

    /// Shutdown timed out with effects still running.
    #[error("Shutdown timed out with {0} effects still pending")]
    ShutdownTimeout(usize),

    /// A wait for a matching action expired.
    #[error("Timed out waiting for a matching action")]
    Timeout,

    /// The action broadcast channel closed while waiting.
    #[error("Action channel closed")]
    ChannelClosed,
}

/// Handle for waiting on the effects started by a single `send`.
///
/// `send()` returns once effect execution has been *started*; the handle
/// lets callers wait for completion with an explicit timeout, which is how
/// views keep their "request outstanding" state honest.
pub struct EffectHandle {
    pending: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl EffectHandle {
    fn new() -> Self {
        Self {
            pending: Arc::new(AtomicUsize::new(0)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Number of effects still running for this send.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Wait until every effect started by the originating send (including
    /// cascading feedback effects) has finished.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Wait for effect completion with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running when
    /// the timeout expires.
    pub async fn wait_with_timeout(&self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Tracks one running effect against both the per-send handle and the
/// store-wide pending counter used by shutdown.
struct EffectTracker {
    handle_pending: Arc<AtomicUsize>,
    handle_notify: Arc<Notify>,
    store_pending: Arc<AtomicUsize>,
}

impl EffectTracker {
    fn start(&self) {
        self.handle_pending.fetch_add(1, Ordering::AcqRel);
        self.store_pending.fetch_add(1, Ordering::AcqRel);
    }

    fn finish(&self) {
        self.store_pending.fetch_sub(1, Ordering::AcqRel);
        if self.handle_pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.handle_notify.notify_waiters();
        }
    }

    fn clone_for_child(&self) -> Self {
        Self {
            handle_pending: Arc::clone(&self.handle_pending),
            handle_notify: Arc::clone(&self.handle_notify),
            store_pending: Arc::clone(&self.store_pending),
        }
    }
}

/// Everything an effect task needs to feed actions back into the reducer.
struct EffectContext<S, A, E, R> {
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    action_broadcast: broadcast::Sender<A>,
    state_watch: watch::Sender<S>,
}

impl<S, A, E, R> Clone for EffectContext<S, A, E, R>
where
    R: Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            action_broadcast: self.action_broadcast.clone(),
            state_watch: self.state_watch.clone(),
        }
    }
}

/// The Store - runtime for reducers
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
/// 4. Effect execution (with feedback loop)
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Example
///
/// ```ignore
/// let store = Store::new(
///     SessionState::default(),
///     SessionReducer::new(),
///     production_environment(),
/// );
///
/// store.send(SessionAction::Restore).await?;
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    shutdown: Arc<AtomicBool>,
    pending_effects: Arc<AtomicUsize>,
    /// Broadcasts every action produced by an effect, enabling
    /// request-response waits via [`Store::send_and_wait_for`].
    action_broadcast: broadcast::Sender<A>,
    /// Publishes the state after every reduction; subscribers observe
    /// changes without polling.
    state_watch: watch::Sender<S>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + Sync + Clone + 'static,
    S: Send + Sync + Clone + 'static,
    E: Send + Sync + Clone + 'static,
{
    /// Create a new store with initial state, reducer, and environment.
    ///
    /// Default action broadcast capacity is 16; increase with
    /// [`Store::with_broadcast_capacity`] when many slow observers are
    /// attached.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
    }

    /// Create a new store with a custom action broadcast capacity.
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity);
        let (state_watch, _) = watch::channel(initial_state.clone());

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_effects: Arc::new(AtomicUsize::new(0)),
            action_broadcast,
            state_watch,
        }
    }

    /// Snapshot the current state.
    pub async fn state(&self) -> S {
        self.state.read().await.clone()
    }

    /// Subscribe to state changes.
    ///
    /// The receiver holds the latest state after every reduction. This is
    /// the mechanism by which the route guard and the authenticated API
    /// client observe session changes without re-fetching.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<S> {
        self.state_watch.subscribe()
    }

    /// Subscribe to all actions produced by effects.
    ///
    /// Only feedback actions are broadcast, not the initial actions passed
    /// to [`Store::send`]. If the receiver lags it skips old actions.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Send an action to the store.
    ///
    /// 1. Acquires the state write lock
    /// 2. Calls the reducer with (state, action, environment)
    /// 3. Publishes the new state to watch subscribers
    /// 4. Starts execution of the returned effects
    ///
    /// `send()` returns after *starting* effect execution; use the
    /// returned [`EffectHandle`] to wait for completion.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting
    /// down.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.shutdown.load(Ordering::Acquire) {
            tracing::warn!("rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        tracing::debug!("processing action");
        metrics::counter!("store.actions.processed").increment(1);

        let effects = {
            let mut state = self.state.write().await;
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            self.state_watch.send_replace(state.clone());
            effects
        };

        let handle = EffectHandle::new();
        let tracker = EffectTracker {
            handle_pending: Arc::clone(&handle.pending),
            handle_notify: Arc::clone(&handle.notify),
            store_pending: Arc::clone(&self.pending_effects),
        };
        let ctx = EffectContext {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            action_broadcast: self.action_broadcast.clone(),
            state_watch: self.state_watch.clone(),
        };

        for effect in effects {
            spawn_effect(ctx.clone(), effect, tracker.clone_for_child());
        }

        Ok(handle)
    }

    /// Send an action and wait for a matching result action.
    ///
    /// Designed for request-response flows: subscribe to the action
    /// broadcast *before* sending (avoiding the race where the feedback
    /// action lands first), send, then wait for the first action matching
    /// the predicate.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: no matching action within `timeout`
    /// - [`StoreError::ChannelClosed`]: broadcast closed while waiting
    /// - [`StoreError::ShutdownInProgress`]: store is shutting down
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        // Subscribe BEFORE sending to avoid the feedback race
        let mut rx = self.action_broadcast.subscribe();

        self.send(action).await?;

        tokio::time::timeout(timeout, async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "action observer lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Initiate graceful shutdown.
    ///
    /// Sets the shutdown flag (rejecting new actions), then waits for
    /// pending effects to drain.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects are still
    /// running when the timeout expires.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("initiating graceful shutdown");
        metrics::counter!("store.shutdown.initiated").increment(1);

        self.shutdown.store(true, Ordering::Release);

        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(50);

        loop {
            let pending = self.pending_effects.load(Ordering::Acquire);

            if pending == 0 {
                metrics::counter!("store.shutdown.completed").increment(1);
                return Ok(());
            }

            if start.elapsed() >= timeout {
                tracing::error!(pending_effects = pending, "shutdown timeout");
                metrics::counter!("store.shutdown.timeout").increment(1);
                return Err(StoreError::ShutdownTimeout(pending));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }
}

/// Spawn a task executing one effect tree.
fn spawn_effect<S, A, E, R>(
    ctx: EffectContext<S, A, E, R>,
    effect: Effect<A>,
    tracker: EffectTracker,
) where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + Sync + Clone + 'static,
    S: Send + Sync + Clone + 'static,
    E: Send + Sync + Clone + 'static,
{
    tracker.start();
    metrics::counter!("store.effects.spawned").increment(1);
    tokio::spawn(async move {
        run_effect(ctx, effect, &tracker).await;
        tracker.finish();
    });
}

/// Execute an effect, feeding any produced actions back through the
/// reducer. Sequential children run in order within this task; parallel
/// children get their own tasks.
async fn run_effect<S, A, E, R>(
    ctx: EffectContext<S, A, E, R>,
    effect: Effect<A>,
    tracker: &EffectTracker,
) where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + Sync + Clone + 'static,
    S: Send + Sync + Clone + 'static,
    E: Send + Sync + Clone + 'static,
{
    let mut queue: VecDeque<Effect<A>> = VecDeque::new();
    queue.push_back(effect);

    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::None => {},
            Effect::Parallel(children) => {
                for child in children {
                    spawn_effect(ctx.clone(), child, tracker.clone_for_child());
                }
            },
            Effect::Sequential(children) => {
                for child in children.into_iter().rev() {
                    queue.push_front(child);
                }
            },
            Effect::Delay { duration, action } => {
                tokio::time::sleep(duration).await;
                feed_back(&ctx, *action, &mut queue).await;
            },
            Effect::Future(fut) => {
                if let Some(action) = fut.await {
                    feed_back(&ctx, action, &mut queue).await;
                }
            },
        }
    }
}

/// Broadcast a feedback action and run it through the reducer, queueing
/// whatever effects that reduction produces.
async fn feed_back<S, A, E, R>(
    ctx: &EffectContext<S, A, E, R>,
    action: A,
    queue: &mut VecDeque<Effect<A>>,
) where
    R: Reducer<State = S, Action = A, Environment = E>,
    A: Clone,
    S: Clone,
{
    // Observers may or may not exist; a send error just means no receivers.
    let _ = ctx.action_broadcast.send(action.clone());
    metrics::counter!("store.actions.feedback").increment(1);

    let mut state = ctx.state.write().await;
    let effects = ctx.reducer.reduce(&mut state, action, &ctx.environment);
    ctx.state_watch.send_replace(state.clone());
    drop(state);

    queue.extend(effects);
}
