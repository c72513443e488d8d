//! # Carto Runtime
//!
//! Runtime implementation for reducer-driven state in Carto.
//!
//! The [`Store`] owns a piece of state (for the canvas: the shape arena) and
//! is the only way to mutate it. Every action runs through the reducer while
//! the store holds an exclusive write lock, so a multi-step mutation such as a
//! group collapse is perceived atomically by every reader.
//!
//! ## Core Components
//!
//! - **Store**: manages state and executes effects
//! - **Effect execution**: runs effect descriptions and feeds produced actions back
//! - **Action broadcast**: every action produced by an effect is published to
//!   subscribers (the realtime sync layer treats this as an opaque pub/sub channel)
//!
//! ## Example
//!
//! ```ignore
//! use carto_runtime::Store;
//!
//! let store = Store::new(ShapeArena::default(), CanvasReducer::new(), CanvasEnvironment::default());
//!
//! let mut updates = store.subscribe_actions();
//! store.send(CanvasAction::Toggle { shape_id }).await?.wait().await;
//!
//! let collapsed = store.state(|arena| arena.is_collapsed(&shape_id)).await;
//! ```

use carto_core::{effect::Effect, reducer::Reducer};
use futures::future::{BoxFuture, join_all};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

/// Store failures.
pub mod error {
    use thiserror::Error;

    /// Why a send or a wait failed.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// A task join error occurred while waiting for effects
        ///
        /// This typically means a spawned effect panicked.
        #[error("Effect task failed: {0}")]
        TaskJoinError(#[from] tokio::task::JoinError),

        /// [`Store::shutdown`](crate::Store::shutdown) was called.
        #[error("Store no longer accepts actions")]
        ShutdownInProgress,

        /// Timeout waiting for effects to complete
        #[error("Timeout waiting for effects")]
        Timeout,
    }
}

pub use error::StoreError;

/// Default capacity of the action broadcast channel.
const BROADCAST_CAPACITY: usize = 64;

/// Handle to the effects spawned by one `send`.
///
/// Dropping the handle does not cancel anything; effects keep running.
/// Only effects produced directly by the sent action are tracked, not the
/// effects of actions they feed back.
#[derive(Debug, Default)]
pub struct EffectHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl EffectHandle {
    /// A handle with nothing to wait for.
    #[must_use]
    pub const fn completed() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Number of effect tasks spawned for this action.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }

    /// Wait for all tracked effects to finish.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskJoinError`] if an effect task panicked.
    pub async fn wait(self) -> Result<(), StoreError> {
        for task in self.tasks {
            task.await?;
        }
        Ok(())
    }

    /// Wait for all tracked effects, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`] if the effects did not finish in time
    /// - [`StoreError::TaskJoinError`] if an effect task panicked
    pub async fn wait_with_timeout(self, timeout: std::time::Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}

/// Owns state `S` behind a lock and drives reducer `R` over actions `A`.
///
/// Clones share the same state, so a handle can be given to every task
/// that reads or mutates the canvas.
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: Arc<R>,
    environment: Arc<E>,
    shutdown: Arc<AtomicBool>,
    /// Actions produced by effects are published here before being fed back.
    action_broadcast: broadcast::Sender<A>,
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: Arc::clone(&self.reducer),
            environment: Arc::clone(&self.environment),
            shutdown: Arc::clone(&self.shutdown),
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Sync + Clone + std::fmt::Debug + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Wrap `initial_state` and start accepting actions.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        let (action_broadcast, _) = broadcast::channel(BROADCAST_CAPACITY);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer: Arc::new(reducer),
            environment: Arc::new(environment),
            shutdown: Arc::new(AtomicBool::new(false)),
            action_broadcast,
        }
    }

    /// Reduce `action`, then spawn the effects it returned.
    ///
    /// The reducer runs to completion under the write lock; effects are
    /// spawned after the lock is released.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`Store::shutdown`].
    #[tracing::instrument(skip(self), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Action refused after shutdown");
            return Err(StoreError::ShutdownInProgress);
        }

        metrics::counter!("store.actions").increment(1);

        let effects = {
            let mut state = self.state.write().await;
            self.reducer.reduce(&mut state, action, &self.environment)
        };

        let tasks = effects
            .into_iter()
            .filter(|effect| !effect.is_none())
            .map(|effect| tokio::spawn(self.clone().run_effect(effect)))
            .collect();

        Ok(EffectHandle { tasks })
    }

    /// Run `f` against a consistent snapshot of the state.
    ///
    /// ```ignore
    /// let shape_count = store.state(|arena| arena.len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Subscribe to actions produced by effects.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Stop accepting new actions.
    ///
    /// Effects already spawned keep running; actions they produce are still
    /// broadcast but no longer fed back into the reducer.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        tracing::info!("Store shutdown initiated");
    }

    fn run_effect(self, effect: Effect<A>) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => {
                    if let Some(action) = fut.await {
                        self.feed_back(action).await;
                    }
                },
                Effect::Delay { duration, action } => {
                    tokio::time::sleep(duration).await;
                    self.feed_back(*action).await;
                },
                Effect::Parallel(effects) => {
                    join_all(effects.into_iter().map(|e| self.clone().run_effect(e))).await;
                },
                Effect::Sequential(effects) => {
                    for effect in effects {
                        self.clone().run_effect(effect).await;
                    }
                },
            }
        })
    }

    async fn feed_back(&self, action: A) {
        // No receivers is the common case outside realtime sessions.
        let _ = self.action_broadcast.send(action.clone());

        if let Err(error) = self.send(action).await {
            tracing::debug!(%error, "Dropped fed-back action");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum CounterAction {
        Increment,
        IncrementLater,
        Incremented,
        Burst,
    }

    #[derive(Debug, Clone)]
    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = (u32, u32);
        type Action = CounterAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut (u32, u32),
            action: CounterAction,
            _env: &(),
        ) -> Vec<Effect<CounterAction>> {
            match action {
                CounterAction::Increment => {
                    state.0 += 1;
                    vec![Effect::emit(CounterAction::Incremented)]
                },
                CounterAction::IncrementLater => vec![Effect::Delay {
                    duration: Duration::from_millis(5),
                    action: Box::new(CounterAction::Increment),
                }],
                CounterAction::Incremented => {
                    state.1 += 1;
                    vec![Effect::None]
                },
                CounterAction::Burst => vec![Effect::chain(vec![
                    Effect::emit(CounterAction::Increment),
                    Effect::merge(vec![
                        Effect::emit(CounterAction::Increment),
                        Effect::emit(CounterAction::Increment),
                    ]),
                ])],
            }
        }
    }

    fn store() -> Store<(u32, u32), CounterAction, (), CounterReducer> {
        Store::new((0, 0), CounterReducer, ())
    }

    #[tokio::test]
    async fn send_applies_reducer_and_broadcasts_effect_actions() {
        let store = store();
        let mut rx = store.subscribe_actions();

        store.send(CounterAction::Increment).await.unwrap().wait().await.unwrap();

        assert_eq!(store.state(|s| s.0).await, 1);
        assert_eq!(rx.recv().await.unwrap(), CounterAction::Incremented);
        assert_eq!(store.state(|s| s.1).await, 1);
    }

    #[tokio::test]
    async fn delayed_action_is_fed_back() {
        let store = store();
        store
            .send(CounterAction::IncrementLater)
            .await
            .unwrap()
            .wait_with_timeout(Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(store.state(|s| s.0).await, 1);
    }

    #[tokio::test]
    async fn nested_parallel_and_sequential_effects_run() {
        let store = store();
        store.send(CounterAction::Burst).await.unwrap().wait().await.unwrap();
        assert_eq!(store.state(|s| s.0).await, 3);
    }

    #[tokio::test]
    async fn none_effects_are_not_spawned() {
        let store = store();
        let handle = store.send(CounterAction::Incremented).await.unwrap();
        assert_eq!(handle.pending(), 0);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_actions() {
        let store = store();
        store.shutdown();
        let result = store.send(CounterAction::Increment).await;
        assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
        assert_eq!(store.state(|s| s.0).await, 0);
    }
}
