//! Shapes, arrow bindings and partial updates.

use crate::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Identifier of a shape on the canvas (for example `shape:abc123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    /// Create an id from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ShapeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ShapeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Shapes
// ═══════════════════════════════════════════════════════════════════════

/// Props of a collapsible group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupProps {
    /// Display label.
    pub label: String,
    /// Whether the subtree is folded away.
    pub collapsed: bool,
    /// Serialized [`SavedLayout`](crate::saved_layout::SavedLayout); empty
    /// while expanded.
    pub saved_layout: String,
    /// Label font size.
    pub font_size: u32,
    /// Optional image shown in the group.
    pub image_url: String,
    /// Rendered in compact form inside a collapsed parent's row.
    pub compact: bool,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

/// Props of a link card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardProps {
    /// Link the card previews.
    pub url: String,
    /// Rendered in compact form inside a collapsed parent's row.
    pub compact: bool,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

/// What a shape is. Only groups and cards take part in the compact row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "props", rename_all = "lowercase")]
pub enum ShapeKind {
    /// Collapsible group.
    Group(GroupProps),
    /// Link card.
    Card(CardProps),
    /// Directed edge. Its endpoints live in the binding table.
    Arrow,
    /// Anything else the editor can draw (notes, text, images...).
    Other {
        /// Editor type name.
        type_name: String,
        /// Width, if the shape has one.
        w: Option<f64>,
        /// Height, if the shape has one.
        h: Option<f64>,
    },
}

impl ShapeKind {
    /// Kind name used in error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Group(_) => "group",
            Self::Card(_) => "card",
            Self::Arrow => "arrow",
            Self::Other { type_name, .. } => type_name,
        }
    }
}

/// A shape on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Shape id.
    pub id: ShapeId,
    /// Left edge in page space.
    pub x: f64,
    /// Top edge in page space.
    pub y: f64,
    /// 0 hides the shape, 1 shows it.
    pub opacity: f64,
    /// Kind and kind-specific props.
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl Shape {
    /// New expanded group at `bounds`.
    #[must_use]
    pub fn group(id: impl Into<ShapeId>, label: impl Into<String>, bounds: Bounds) -> Self {
        Self::at(
            id,
            bounds.origin(),
            ShapeKind::Group(GroupProps {
                label: label.into(),
                collapsed: false,
                saved_layout: String::new(),
                font_size: 16,
                image_url: String::new(),
                compact: false,
                w: bounds.w,
                h: bounds.h,
            }),
        )
    }

    /// New card at `bounds`.
    #[must_use]
    pub fn card(id: impl Into<ShapeId>, url: impl Into<String>, bounds: Bounds) -> Self {
        Self::at(
            id,
            bounds.origin(),
            ShapeKind::Card(CardProps {
                url: url.into(),
                compact: false,
                w: bounds.w,
                h: bounds.h,
            }),
        )
    }

    /// New arrow. Connect it with [`ShapeArena::connect`](crate::graph::ShapeArena::connect).
    #[must_use]
    pub fn arrow(id: impl Into<ShapeId>) -> Self {
        Self::at(id, Point::default(), ShapeKind::Arrow)
    }

    /// New shape of some other editor type.
    #[must_use]
    pub fn other(id: impl Into<ShapeId>, type_name: impl Into<String>, bounds: Bounds) -> Self {
        Self::at(
            id,
            bounds.origin(),
            ShapeKind::Other {
                type_name: type_name.into(),
                w: Some(bounds.w),
                h: Some(bounds.h),
            },
        )
    }

    fn at(id: impl Into<ShapeId>, origin: Point, kind: ShapeKind) -> Self {
        Self {
            id: id.into(),
            x: origin.x,
            y: origin.y,
            opacity: 1.0,
            kind,
        }
    }

    /// Returns `true` for groups.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self.kind, ShapeKind::Group(_))
    }

    /// Returns `true` for arrows.
    #[must_use]
    pub const fn is_arrow(&self) -> bool {
        matches!(self.kind, ShapeKind::Arrow)
    }

    /// Group props, if this is a group.
    #[must_use]
    pub const fn group_props(&self) -> Option<&GroupProps> {
        match &self.kind {
            ShapeKind::Group(props) => Some(props),
            _ => None,
        }
    }

    /// Whether the shape is currently drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    /// Whether the shape is drawn in compact form.
    #[must_use]
    pub const fn is_compact(&self) -> bool {
        match &self.kind {
            ShapeKind::Group(props) => props.compact,
            ShapeKind::Card(props) => props.compact,
            _ => false,
        }
    }

    /// Width and height, if the shape has a box.
    #[must_use]
    pub const fn size(&self) -> Option<(f64, f64)> {
        match &self.kind {
            ShapeKind::Group(GroupProps { w, h, .. }) | ShapeKind::Card(CardProps { w, h, .. }) => {
                Some((*w, *h))
            },
            ShapeKind::Other {
                w: Some(w),
                h: Some(h),
                ..
            } => Some((*w, *h)),
            _ => None,
        }
    }

    /// Page-space box, if the shape has one.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.size().map(|(w, h)| Bounds::new(self.x, self.y, w, h))
    }

    /// Apply a partial update. Props that do not exist on this kind are ignored.
    pub fn apply(&mut self, patch: ShapePatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }

        match &mut self.kind {
            ShapeKind::Group(props) => {
                set(&mut props.collapsed, patch.collapsed);
                set(&mut props.saved_layout, patch.saved_layout);
                set(&mut props.compact, patch.compact);
                set(&mut props.w, patch.w);
                set(&mut props.h, patch.h);
            },
            ShapeKind::Card(props) => {
                set(&mut props.compact, patch.compact);
                set(&mut props.w, patch.w);
                set(&mut props.h, patch.h);
            },
            ShapeKind::Other { w, h, .. } => {
                if patch.w.is_some() {
                    *w = patch.w;
                }
                if patch.h.is_some() {
                    *h = patch.h;
                }
            },
            ShapeKind::Arrow => {},
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Bindings
// ═══════════════════════════════════════════════════════════════════════

/// Which end of an arrow a binding attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminal {
    /// Tail: the parent.
    Start,
    /// Head: the child.
    End,
}

/// Attaches one end of an arrow to a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// The arrow.
    pub from_id: ShapeId,
    /// The shape the arrow end is attached to.
    pub to_id: ShapeId,
    /// Which end.
    pub terminal: Terminal,
}

// ═══════════════════════════════════════════════════════════════════════
// Patches
// ═══════════════════════════════════════════════════════════════════════

/// Partial update for [`ShapeGraph::update_shape`](crate::graph::ShapeGraph::update_shape).
/// `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePatch {
    /// New left edge.
    pub x: Option<f64>,
    /// New top edge.
    pub y: Option<f64>,
    /// New opacity.
    pub opacity: Option<f64>,
    /// Group: collapsed flag.
    pub collapsed: Option<bool>,
    /// Group: serialized saved layout.
    pub saved_layout: Option<String>,
    /// Group or card: compact flag.
    pub compact: Option<bool>,
    /// New width.
    pub w: Option<f64>,
    /// New height.
    pub h: Option<f64>,
}

impl ShapePatch {
    /// Empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only change opacity.
    #[must_use]
    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            ..Self::default()
        }
    }

    /// Move the top-left corner.
    #[must_use]
    pub const fn with_position(mut self, position: Point) -> Self {
        self.x = Some(position.x);
        self.y = Some(position.y);
        self
    }

    /// Resize.
    #[must_use]
    pub const fn with_size(mut self, w: f64, h: f64) -> Self {
        self.w = Some(w);
        self.h = Some(h);
        self
    }

    /// Set the compact flag.
    #[must_use]
    pub const fn with_compact(mut self, compact: bool) -> Self {
        self.compact = Some(compact);
        self
    }

    /// Set the collapsed flag and its saved layout together.
    #[must_use]
    pub fn with_collapsed(mut self, collapsed: bool, saved_layout: String) -> Self {
        self.collapsed = Some(collapsed);
        self.saved_layout = Some(saved_layout);
        self
    }
}
