//! Pre-collapse boxes of a group's descendants.
//!
//! Stored on the group as a JSON object keyed by shape id, so it travels
//! with the shape through the realtime channel like any other prop.

use crate::error::{CanvasError, Result};
use crate::shape::{Shape, ShapeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One descendant's box at collapse time. Shapes without a size keep
/// `w`/`h` empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    /// Height, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    /// The box was a compact one, sized for a collapsed parent's row.
    #[serde(default, skip_serializing_if = "is_false")]
    pub compact: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

impl SavedBox {
    /// Capture a shape's current box.
    #[must_use]
    pub fn of(shape: &Shape) -> Self {
        let size = shape.size();
        Self {
            x: shape.x,
            y: shape.y,
            w: size.map(|(w, _)| w),
            h: size.map(|(_, h)| h),
            compact: shape.is_compact(),
        }
    }
}

/// Map from descendant id to its saved box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedLayout(BTreeMap<ShapeId, SavedBox>);

impl SavedLayout {
    /// Empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a shape's current box.
    pub fn capture(&mut self, shape: &Shape) {
        self.0.insert(shape.id.clone(), SavedBox::of(shape));
    }

    /// Saved box for a shape.
    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&SavedBox> {
        self.0.get(id)
    }

    /// Number of saved shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if `id` has a saved box.
    #[must_use]
    pub fn contains(&self, id: &ShapeId) -> bool {
        self.0.contains_key(id)
    }

    /// Read the stored prop. An empty or unreadable value is an empty layout:
    /// expanding then shows children where they are instead of failing.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::new();
        }
        serde_json::from_str(raw).unwrap_or_else(|error| {
            tracing::debug!(%error, "Unreadable saved layout, treating as empty");
            Self::new()
        })
    }

    /// Encode for storage on the group.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CanvasError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::shape::ShapePatch;

    #[test]
    fn stored_form_is_keyed_by_id() {
        let mut layout = SavedLayout::new();
        layout.capture(&Shape::card("shape:c", "u", Bounds::new(1.0, 2.0, 3.0, 4.0)));
        layout.capture(&Shape::arrow("shape:a"));

        let json = layout.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"shape:a":{"x":0.0,"y":0.0},"shape:c":{"x":1.0,"y":2.0,"w":3.0,"h":4.0}}"#
        );
        assert_eq!(SavedLayout::parse(&json), layout);
    }

    #[test]
    fn compact_boxes_are_marked() {
        let mut card = Shape::card("c", "u", Bounds::new(5.0, 6.0, 54.0, 54.0));
        card.apply(ShapePatch::new().with_compact(true));
        let mut layout = SavedLayout::new();
        layout.capture(&card);

        let json = layout.to_json().unwrap();
        assert_eq!(json, r#"{"c":{"x":5.0,"y":6.0,"w":54.0,"h":54.0,"compact":true}}"#);
        assert!(SavedLayout::parse(&json).get(&ShapeId::from("c")).unwrap().compact);
    }

    #[test]
    fn unreadable_layout_is_empty() {
        assert!(SavedLayout::parse("").is_empty());
        assert!(SavedLayout::parse("not json").is_empty());
        assert!(SavedLayout::parse("[1,2]").is_empty());
    }
}
