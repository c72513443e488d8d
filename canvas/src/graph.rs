//! The shape graph the collapse engine reads and writes.
//!
//! Shapes live in an arena keyed by id. Arrows are shapes too; what they
//! connect is kept in a separate binding table, one row per arrow end.

use crate::geometry::Bounds;
use crate::shape::{Binding, Shape, ShapeId, ShapePatch, Terminal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Query and mutation interface of a canvas.
///
/// This is the only way the engine touches shapes. Implementations must
/// return bindings in a stable order so layouts are deterministic.
pub trait ShapeGraph {
    /// Look a shape up.
    fn shape(&self, id: &ShapeId) -> Option<&Shape>;

    /// Arrow bindings attached *to* the shape (the shape is `to_id`).
    fn bindings_to_shape(&self, id: &ShapeId) -> Vec<&Binding>;

    /// Arrow bindings held *by* the shape (the shape is the arrow, `from_id`).
    fn bindings_from_shape(&self, id: &ShapeId) -> Vec<&Binding>;

    /// Apply a partial update. Unknown ids are ignored.
    fn update_shape(&mut self, id: &ShapeId, patch: ShapePatch);

    /// Page-space box of a shape, if it has one.
    fn shape_page_bounds(&self, id: &ShapeId) -> Option<Bounds>;
}

/// In-memory canvas: shapes by id plus an insertion-ordered binding table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeArena {
    shapes: HashMap<ShapeId, Shape>,
    bindings: Vec<Binding>,
}

impl ShapeArena {
    /// Empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a shape.
    pub fn insert(&mut self, shape: Shape) {
        self.shapes.insert(shape.id.clone(), shape);
    }

    /// Add `arrow` (if missing) and bind its start to `from` and its end to `to`.
    pub fn connect(&mut self, arrow: impl Into<ShapeId>, from: &ShapeId, to: &ShapeId) {
        let arrow = arrow.into();
        self.shapes
            .entry(arrow.clone())
            .or_insert_with(|| Shape::arrow(arrow.clone()));

        self.bindings.push(Binding {
            from_id: arrow.clone(),
            to_id: from.clone(),
            terminal: Terminal::Start,
        });
        self.bindings.push(Binding {
            from_id: arrow,
            to_id: to.clone(),
            terminal: Terminal::End,
        });
    }

    /// Remove a shape and every binding that mentions it.
    pub fn remove(&mut self, id: &ShapeId) -> Option<Shape> {
        self.bindings.retain(|b| &b.from_id != id && &b.to_id != id);
        self.shapes.remove(id)
    }

    /// Look a shape up.
    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    /// Whether `id` is a collapsed group.
    #[must_use]
    pub fn is_collapsed(&self, id: &ShapeId) -> bool {
        self.get(id)
            .and_then(Shape::group_props)
            .is_some_and(|props| props.collapsed)
    }

    /// Number of shapes, arrows included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if the canvas has no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// All shapes, in no particular order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }
}

impl ShapeGraph for ShapeArena {
    fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    fn bindings_to_shape(&self, id: &ShapeId) -> Vec<&Binding> {
        self.bindings.iter().filter(|b| &b.to_id == id).collect()
    }

    fn bindings_from_shape(&self, id: &ShapeId) -> Vec<&Binding> {
        self.bindings.iter().filter(|b| &b.from_id == id).collect()
    }

    fn update_shape(&mut self, id: &ShapeId, patch: ShapePatch) {
        match self.shapes.get_mut(id) {
            Some(shape) => shape.apply(patch),
            None => tracing::trace!(shape_id = %id, "Update for unknown shape ignored"),
        }
    }

    fn shape_page_bounds(&self, id: &ShapeId) -> Option<Bounds> {
        self.shapes.get(id).and_then(Shape::bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ShapeId {
        ShapeId::from(s)
    }

    #[test]
    fn connect_creates_arrow_and_two_bindings() {
        let mut arena = ShapeArena::new();
        arena.insert(Shape::group("g", "G", Bounds::new(0.0, 0.0, 210.0, 150.0)));
        arena.insert(Shape::card("c", "u", Bounds::new(0.0, 0.0, 210.0, 195.0)));
        arena.connect("a", &id("g"), &id("c"));

        assert!(arena.get(&id("a")).is_some_and(Shape::is_arrow));
        let to_group = arena.bindings_to_shape(&id("g"));
        assert_eq!(to_group.len(), 1);
        assert_eq!(to_group[0].terminal, Terminal::Start);

        let from_arrow = arena.bindings_from_shape(&id("a"));
        assert_eq!(from_arrow.len(), 2);
        assert_eq!(from_arrow[1].to_id, id("c"));
    }

    #[test]
    fn remove_drops_bindings() {
        let mut arena = ShapeArena::new();
        arena.insert(Shape::card("c", "u", Bounds::default()));
        arena.connect("a", &id("x"), &id("c"));

        assert!(arena.remove(&id("c")).is_some());
        assert!(arena.bindings_from_shape(&id("a")).iter().all(|b| b.to_id != id("c")));
    }

    #[test]
    fn arrows_have_no_bounds() {
        let mut arena = ShapeArena::new();
        arena.connect("a", &id("x"), &id("y"));
        assert_eq!(arena.shape_page_bounds(&id("a")), None);
        assert_eq!(arena.shape_page_bounds(&id("missing")), None);
    }

    #[test]
    fn update_unknown_shape_is_ignored() {
        let mut arena = ShapeArena::new();
        arena.update_shape(&id("ghost"), ShapePatch::opacity(0.0));
        assert!(arena.is_empty());
    }
}
