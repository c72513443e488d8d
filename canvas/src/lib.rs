//! # Carto Canvas
//!
//! Collapsible groups for the Carto canvas.
//!
//! Groups, cards and other shapes are linked by arrows; a group's children
//! are the shapes its outgoing arrows point at. Collapsing a group folds its
//! subtree into a compact row above it and remembers every box it moved;
//! expanding puts everything back exactly.
//!
//! ## Modules
//!
//! - [`layout`]: pure single-row layout above a parent box
//! - [`graph`]: the [`ShapeGraph`] interface and the in-memory [`ShapeArena`]
//! - [`engine`]: collapse/expand over any [`ShapeGraph`]
//! - [`reducer`]: [`CanvasReducer`] for the `carto-runtime` store, which
//!   holds the exclusive lock that makes each collapse/expand atomic
//!
//! ## Example
//!
//! ```
//! use carto_canvas::geometry::Bounds;
//! use carto_canvas::{CollapseEngine, Shape, ShapeArena, ShapeId};
//!
//! let mut arena = ShapeArena::new();
//! arena.insert(Shape::group("group", "Ideas", Bounds::new(0.0, 400.0, 210.0, 150.0)));
//! arena.insert(Shape::card("card", "https://example.com", Bounds::new(0.0, 0.0, 210.0, 195.0)));
//! arena.connect("arrow", &ShapeId::from("group"), &ShapeId::from("card"));
//! let before = arena.clone();
//!
//! let engine = CollapseEngine::default();
//! engine.collapse(&mut arena, &ShapeId::from("group")).unwrap();
//! assert!(arena.is_collapsed(&ShapeId::from("group")));
//!
//! engine.expand(&mut arena, &ShapeId::from("group")).unwrap();
//! assert_eq!(arena, before);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod reducer;
pub mod saved_layout;
pub mod shape;

pub use config::CanvasConfig;
pub use engine::{CollapseEngine, Toggled};
pub use error::{CanvasError, Result};
pub use graph::{ShapeArena, ShapeGraph};
pub use layout::{LayoutChild, RowLayoutPlanner};
pub use reducer::{CanvasAction, CanvasEnvironment, CanvasReducer};
pub use saved_layout::{SavedBox, SavedLayout};
pub use shape::{Binding, Shape, ShapeId, ShapeKind, ShapePatch, Terminal};
