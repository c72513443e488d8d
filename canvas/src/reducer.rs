//! Canvas reducer: collapse/expand commands plus change notifications.
//!
//! Commands mutate the graph through the [`CollapseEngine`]. A command that
//! changed something returns one effect that yields a notification action;
//! the runtime broadcasts it to subscribers (realtime sync) and feeds it
//! back, where it does nothing. Commands that cannot apply are dropped
//! silently, since stale shape ids are routine during shared editing.

use crate::config::CanvasConfig;
use crate::engine::{CollapseEngine, Toggled};
use crate::graph::ShapeGraph;
use crate::shape::ShapeId;
use carto_core::effect::Effect;
use carto_core::reducer::Reducer;
use std::marker::PhantomData;

/// Inputs of the canvas reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasAction {
    // Commands
    /// Collapse an expanded group.
    Collapse {
        /// Target group
        shape_id: ShapeId,
    },
    /// Expand a collapsed group.
    Expand {
        /// Target group
        shape_id: ShapeId,
    },
    /// Flip a group between collapsed and expanded (the group's button).
    Toggle {
        /// Target group
        shape_id: ShapeId,
    },

    // Notifications
    /// A group was collapsed.
    Collapsed {
        /// The group
        shape_id: ShapeId,
    },
    /// A group was expanded.
    Expanded {
        /// The group
        shape_id: ShapeId,
    },
}

impl CanvasAction {
    /// Returns `true` for notification actions.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        matches!(self, Self::Collapsed { .. } | Self::Expanded { .. })
    }
}

/// Dependencies of the canvas reducer.
#[derive(Debug, Clone, Default)]
pub struct CanvasEnvironment {
    engine: CollapseEngine,
}

impl CanvasEnvironment {
    /// Environment with custom sizes.
    #[must_use]
    pub const fn new(config: CanvasConfig) -> Self {
        Self {
            engine: CollapseEngine::new(config),
        }
    }

    /// The collapse engine.
    #[must_use]
    pub const fn engine(&self) -> &CollapseEngine {
        &self.engine
    }
}

/// Reducer over any [`ShapeGraph`] (a [`ShapeArena`](crate::graph::ShapeArena)
/// in production).
pub struct CanvasReducer<G> {
    _graph: PhantomData<fn() -> G>,
}

impl<G> CanvasReducer<G> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self { _graph: PhantomData }
    }
}

impl<G> Default for CanvasReducer<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> Clone for CanvasReducer<G> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<G> std::fmt::Debug for CanvasReducer<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CanvasReducer")
    }
}

impl<G: ShapeGraph> Reducer for CanvasReducer<G> {
    type State = G;
    type Action = CanvasAction;
    type Environment = CanvasEnvironment;

    fn reduce(
        &self,
        state: &mut G,
        action: CanvasAction,
        env: &CanvasEnvironment,
    ) -> Vec<Effect<CanvasAction>> {
        let engine = env.engine();

        let (shape_id, outcome) = match action {
            CanvasAction::Collapse { shape_id } => {
                let outcome = engine.collapse(state, &shape_id).map(|()| Toggled::Collapsed);
                (shape_id, outcome)
            },
            CanvasAction::Expand { shape_id } => {
                let outcome = engine.expand(state, &shape_id).map(|()| Toggled::Expanded);
                (shape_id, outcome)
            },
            CanvasAction::Toggle { shape_id } => {
                let outcome = engine.toggle(state, &shape_id);
                (shape_id, outcome)
            },
            CanvasAction::Collapsed { .. } | CanvasAction::Expanded { .. } => return vec![],
        };

        match outcome {
            Ok(toggled) => {
                metrics::counter!("canvas.group.toggled", "to" => toggled_label(toggled)).increment(1);
                let notification = match toggled {
                    Toggled::Collapsed => CanvasAction::Collapsed { shape_id },
                    Toggled::Expanded => CanvasAction::Expanded { shape_id },
                };
                vec![Effect::emit(notification)]
            },
            Err(error) => {
                metrics::counter!("canvas.group.ignored", "reason" => error.kind()).increment(1);
                tracing::debug!(shape_id = %shape_id, %error, "Canvas command ignored");
                vec![]
            },
        }
    }
}

const fn toggled_label(toggled: Toggled) -> &'static str {
    match toggled {
        Toggled::Collapsed => "collapsed",
        Toggled::Expanded => "expanded",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::graph::ShapeArena;
    use crate::shape::Shape;
    use carto_testing::{ReducerTest, assertions};

    fn id(s: &str) -> ShapeId {
        ShapeId::from(s)
    }

    fn arena() -> ShapeArena {
        let mut arena = ShapeArena::new();
        arena.insert(Shape::group("g", "G", Bounds::new(0.0, 300.0, 210.0, 150.0)));
        arena.insert(Shape::card("c", "u", Bounds::new(0.0, 0.0, 210.0, 195.0)));
        arena.connect("a", &id("g"), &id("c"));
        arena
    }

    #[test]
    fn collapse_emits_notification() {
        ReducerTest::new(CanvasReducer::<ShapeArena>::new())
            .with_env(CanvasEnvironment::default())
            .given_state(arena())
            .when_action(CanvasAction::Collapse { shape_id: id("g") })
            .then_state(|arena| assert!(arena.is_collapsed(&id("g"))))
            .then_last_effects(|effects| {
                assert_eq!(effects.len(), 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn toggle_twice_round_trips() {
        ReducerTest::new(CanvasReducer::<ShapeArena>::new())
            .with_env(CanvasEnvironment::default())
            .given_state(arena())
            .when_action(CanvasAction::Toggle { shape_id: id("g") })
            .when_action(CanvasAction::Toggle { shape_id: id("g") })
            .then_state(|state| assert_eq!(state, &arena()))
            .then_all_effects(|steps| {
                assert_eq!(steps.len(), 2);
                assert!(steps.iter().all(|effects| effects.len() == 1));
            })
            .run();
    }

    #[test]
    fn stale_target_is_ignored() {
        ReducerTest::new(CanvasReducer::<ShapeArena>::new())
            .with_env(CanvasEnvironment::default())
            .given_state(arena())
            .when_action(CanvasAction::Expand { shape_id: id("g") })
            .when_action(CanvasAction::Collapse { shape_id: id("deleted") })
            .when_action(CanvasAction::Toggle { shape_id: id("c") })
            .then_state(|state| assert_eq!(state, &arena()))
            .then_all_effects(|steps| {
                for effects in steps {
                    assertions::assert_no_effects(effects);
                }
            })
            .run();
    }

    #[test]
    fn notifications_change_nothing() {
        ReducerTest::new(CanvasReducer::<ShapeArena>::new())
            .with_env(CanvasEnvironment::default())
            .given_state(arena())
            .when_action(CanvasAction::Collapsed { shape_id: id("g") })
            .then_state(|state| assert_eq!(state, &arena()))
            .then_last_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }
}
