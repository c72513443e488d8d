//! Single-row layout of a group's children above the group.
//!
//! ```text
//!        ┌────┐  ┌──┐  ┌──────┐        ─┐
//!        │ c1 │  │c2│  │  c3  │         │ max child height
//!        └────┘  │  │  └──────┘         │
//!                └──┘                  ─┘
//!                                       rank gap
//!   ┌─────────────────────────────────┐
//!   │             parent              │
//!   └─────────────────────────────────┘
//! ```
//!
//! Children share one top edge, keep their input order left to right, are
//! separated by the node gap, and the row is centered on the parent.

use crate::config::CanvasConfig;
use crate::geometry::{Bounds, Point};
use crate::shape::ShapeId;
use std::collections::HashMap;

/// Default horizontal gap between siblings.
pub const NODE_GAP: f64 = 20.0;

/// Default vertical gap between the row and its parent.
pub const RANK_GAP: f64 = 40.0;

/// A child to place, with the size it will have once placed.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutChild {
    /// Shape being placed.
    pub id: ShapeId,
    /// Width used for spacing.
    pub width: f64,
    /// Height used for the row's vertical offset.
    pub height: f64,
}

impl LayoutChild {
    /// Create a child entry.
    #[must_use]
    pub fn new(id: impl Into<ShapeId>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }
}

/// Computes centered single-row positions. Pure; holds only the gaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayoutPlanner {
    node_gap: f64,
    rank_gap: f64,
}

impl Default for RowLayoutPlanner {
    fn default() -> Self {
        Self::new(NODE_GAP, RANK_GAP)
    }
}

impl RowLayoutPlanner {
    /// Planner with explicit gaps.
    #[must_use]
    pub const fn new(node_gap: f64, rank_gap: f64) -> Self {
        Self { node_gap, rank_gap }
    }

    /// Planner using the gaps of a canvas configuration.
    #[must_use]
    pub const fn from_config(config: &CanvasConfig) -> Self {
        Self::new(config.node_gap, config.rank_gap)
    }

    /// Top-left corner for every child.
    ///
    /// Returns an empty map for no children.
    ///
    /// # Examples
    ///
    /// ```
    /// use carto_canvas::geometry::{Bounds, Point};
    /// use carto_canvas::layout::{LayoutChild, RowLayoutPlanner};
    ///
    /// let positions = RowLayoutPlanner::default().plan(
    ///     Bounds::new(0.0, 200.0, 100.0, 0.0),
    ///     &[LayoutChild::new("a", 50.0, 50.0), LayoutChild::new("b", 30.0, 80.0)],
    /// );
    ///
    /// assert_eq!(positions["a"], Point::new(0.0, 80.0));
    /// assert_eq!(positions["b"], Point::new(70.0, 80.0));
    /// ```
    #[must_use]
    pub fn plan(&self, parent: Bounds, children: &[LayoutChild]) -> HashMap<ShapeId, Point> {
        let Some(max_height) = children.iter().map(|c| c.height).reduce(f64::max) else {
            return HashMap::new();
        };

        #[allow(clippy::cast_precision_loss)] // child counts are tiny
        let gaps = self.node_gap * (children.len() - 1) as f64;
        let total_width = children.iter().map(|c| c.width).sum::<f64>() + gaps;
        let y = parent.y - self.rank_gap - max_height;

        let mut x = parent.center_x() - total_width / 2.0;
        children
            .iter()
            .map(|child| {
                let position = Point::new(x, y);
                x += child.width + self.node_gap;
                (child.id.clone(), position)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent() -> Bounds {
        Bounds::new(0.0, 200.0, 100.0, 0.0)
    }

    #[test]
    fn empty_row() {
        assert!(RowLayoutPlanner::default().plan(parent(), &[]).is_empty());
    }

    #[test]
    fn single_child_is_centered() {
        let positions = RowLayoutPlanner::default().plan(parent(), &[LayoutChild::new("a", 54.0, 54.0)]);
        assert_eq!(positions["a"], Point::new(23.0, 106.0));
    }

    #[test]
    fn mixed_heights_share_a_top_edge() {
        let positions = RowLayoutPlanner::default().plan(
            parent(),
            &[LayoutChild::new("a", 50.0, 50.0), LayoutChild::new("b", 30.0, 80.0)],
        );
        assert_eq!(positions["a"], Point::new(0.0, 80.0));
        assert_eq!(positions["b"], Point::new(70.0, 80.0));
    }

    #[test]
    fn custom_gaps() {
        let planner = RowLayoutPlanner::new(10.0, 5.0);
        let positions = planner.plan(
            Bounds::new(100.0, 50.0, 40.0, 40.0),
            &[LayoutChild::new("a", 20.0, 10.0), LayoutChild::new("b", 20.0, 10.0)],
        );
        assert_eq!(positions["a"], Point::new(95.0, 35.0));
        assert_eq!(positions["b"], Point::new(125.0, 35.0));
    }

    #[test]
    fn config_gaps_match_defaults() {
        assert_eq!(RowLayoutPlanner::from_config(&CanvasConfig::default()), RowLayoutPlanner::default());
    }
}
