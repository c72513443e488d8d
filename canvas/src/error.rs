//! Error types for canvas operations.

use crate::shape::ShapeId;
use thiserror::Error;

/// Result type alias for canvas operations.
pub type Result<T> = std::result::Result<T, CanvasError>;

/// Why a collapse or expand did nothing.
///
/// The engine reports these so tests can tell the cases apart. The
/// [`CanvasReducer`](crate::reducer::CanvasReducer) absorbs them: stale shape
/// references are routine while several people edit the same canvas.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// No shape with this id.
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),

    /// The shape exists but is the wrong kind for the operation.
    #[error("Shape {id} is not a {expected}")]
    WrongShapeType {
        /// Offending shape
        id: ShapeId,
        /// Kind the operation needs
        expected: &'static str,
    },

    /// Collapse on a group that is already collapsed.
    #[error("Group {0} is already collapsed")]
    AlreadyCollapsed(ShapeId),

    /// Expand on a group that is not collapsed.
    #[error("Group {0} is not collapsed")]
    NotCollapsed(ShapeId),

    /// The graph could not report page bounds for the group.
    #[error("No page bounds for {0}")]
    MissingBounds(ShapeId),

    /// The saved layout could not be encoded.
    #[error("Saved layout encoding failed: {0}")]
    Serialization(String),
}

impl CanvasError {
    /// Short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ShapeNotFound(_) => "shape_not_found",
            Self::WrongShapeType { .. } => "wrong_shape_type",
            Self::AlreadyCollapsed(_) => "already_collapsed",
            Self::NotCollapsed(_) => "not_collapsed",
            Self::MissingBounds(_) => "missing_bounds",
            Self::Serialization(_) => "serialization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_shape() {
        let err = CanvasError::WrongShapeType {
            id: ShapeId::from("shape:card"),
            expected: "group",
        };
        assert_eq!(err.to_string(), "Shape shape:card is not a group");
        assert_eq!(err.kind(), "wrong_shape_type");
    }
}
