//! # Carto Core
//!
//! Vocabulary shared by the Carto crates.
//!
//! Canvas mutations are written as reducers: a synchronous function that
//! edits owned state for one action and hands back [`effect::Effect`] values
//! describing any follow-up work. The auth crate only needs
//! [`environment::Clock`], so token expiry and cache freshness can be tested
//! against pinned time.
//!
//! ## Pieces
//!
//! - **State**: whatever a `Store` owns (for the canvas, the shape arena)
//! - **Action**: commands and notifications fed to a reducer
//! - **Reducer**: `(&mut State, Action, &Environment) -> Vec<Effect>`
//! - **Effect**: inert descriptions that the runtime executes later
//! - **Environment**: settings and collaborators handed to the reducer
//!
//! ## Example
//!
//! ```ignore
//! use carto_core::{effect::Effect, reducer::Reducer};
//!
//! impl Reducer for CanvasReducer {
//!     type State = ShapeArena;
//!     type Action = CanvasAction;
//!     type Environment = CanvasEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         arena: &mut ShapeArena,
//!         action: CanvasAction,
//!         env: &CanvasEnvironment,
//!     ) -> Vec<Effect<CanvasAction>> {
//!         vec![]
//!     }
//! }
//! ```

/// The [`Reducer`](reducer::Reducer) trait.
///
/// Reducers never perform I/O; anything asynchronous goes back to the
/// runtime as an [`Effect`](super::effect::Effect).
pub mod reducer {
    use super::effect::Effect;

    /// Applies actions to state.
    pub trait Reducer {
        /// State mutated by [`reduce`](Self::reduce).
        type State;

        /// Inputs accepted by [`reduce`](Self::reduce).
        type Action;

        /// Read-only settings and collaborators.
        type Environment;

        /// Apply `action` to `state` and describe the follow-up work.
        ///
        /// Runs to completion without suspending. The runtime holds an
        /// exclusive lock on `state` for the whole call, so observers never
        /// see a partially applied action.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Vec<Effect<Self::Action>>;
    }
}

/// Deferred work returned by reducers.
pub mod effect {
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// A description of work for the runtime. Building one does nothing.
    ///
    /// Any action an effect yields is broadcast to subscribers and then
    /// fed back into the reducer that produced it.
    pub enum Effect<Action> {
        /// Nothing to do.
        None,

        /// Run all children concurrently.
        Parallel(Vec<Effect<Action>>),

        /// Run children one after another.
        Sequential(Vec<Effect<Action>>),

        /// Yield `action` once `duration` has elapsed.
        Delay {
            /// Wait before yielding.
            duration: Duration,
            /// Yielded action.
            action: Box<Action>,
        },

        /// Await a future that may yield an action.
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action: fmt::Debug> fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::None => f.write_str("None"),
                Self::Parallel(children) => f.debug_tuple("Parallel").field(children).finish(),
                Self::Sequential(children) => f.debug_tuple("Sequential").field(children).finish(),
                Self::Delay { duration, action } => f
                    .debug_struct("Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Self::Future(_) => f.write_str("Future(..)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Concurrent composition.
        #[must_use]
        pub const fn merge(children: Vec<Self>) -> Self {
            Self::Parallel(children)
        }

        /// Ordered composition.
        #[must_use]
        pub const fn chain(children: Vec<Self>) -> Self {
            Self::Sequential(children)
        }

        /// An effect that immediately yields `action`.
        ///
        /// Used for notifications such as "group collapsed".
        #[must_use]
        pub fn emit(action: Action) -> Self
        where
            Action: Send + 'static,
        {
            Self::Future(Box::pin(async move { Some(action) }))
        }

        /// Returns `true` for [`Effect::None`].
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Self::None)
        }
    }
}

/// Time source injection.
///
/// All time-dependent logic reads the current instant through [`Clock`]
/// so tests can pin or advance time deterministically.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Source of the current instant.
    ///
    /// # Examples
    ///
    /// ```
    /// use carto_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// assert!(clock.now_millis() > 0);
    /// ```
    pub trait Clock: Send + Sync {
        /// The current instant.
        fn now(&self) -> DateTime<Utc>;

        /// Current time as integer milliseconds since the Unix epoch.
        fn now_millis(&self) -> i64 {
            self.now().timestamp_millis()
        }
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
        fn now(&self) -> DateTime<Utc> {
            (**self).now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};
    use std::sync::Arc;

    #[test]
    fn system_clock_millis_match_datetime() {
        let clock = SystemClock;
        let before = chrono::Utc::now().timestamp_millis();
        let now = clock.now_millis();
        let after = chrono::Utc::now().timestamp_millis();
        assert!(before <= now && now <= after);
    }

    #[test]
    fn arc_clock_delegates() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        assert!(clock.now_millis() > 0);
    }

    #[test]
    fn emit_yields_the_action() {
        let Effect::Future(fut) = Effect::emit(7_u32) else {
            unreachable!("emit always builds a future effect");
        };
        assert_eq!(tokio_test::block_on(fut), Some(7));
    }

    #[test]
    fn merge_and_chain_wrap_effects() {
        let merged: Effect<u32> = Effect::merge(vec![Effect::None, Effect::None]);
        assert!(matches!(merged, Effect::Parallel(ref v) if v.len() == 2));
        let chained: Effect<u32> = Effect::chain(vec![Effect::None]);
        assert!(matches!(chained, Effect::Sequential(ref v) if v.len() == 1));
        assert!(Effect::<u32>::None.is_none());
        assert_eq!(format!("{chained:?}"), "Sequential([None])");
    }
}
