//! Property tests for row layout and collapse/expand round trips.

#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use carto_canvas::geometry::Bounds;
use carto_canvas::{
    CollapseEngine, LayoutChild, RowLayoutPlanner, Shape, ShapeArena, ShapeId,
};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

fn children() -> impl Strategy<Value = Vec<LayoutChild>> {
    prop::collection::vec((1u32..400, 1u32..400), 1..12).prop_map(|sizes| {
        sizes
            .into_iter()
            .enumerate()
            .map(|(i, (w, h))| LayoutChild::new(format!("shape:{i}"), f64::from(w), f64::from(h)))
            .collect()
    })
}

fn parent() -> impl Strategy<Value = Bounds> {
    (-2000i32..2000, -2000i32..2000, 1u32..600, 1u32..600).prop_map(|(x, y, w, h)| {
        Bounds::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h))
    })
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Group,
    Card,
    Other,
}

/// A random tree: node 0 is a group, node `i` hangs off an earlier node.
#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<(Kind, usize, Bounds)>,
    /// Groups collapsed before the root is toggled.
    pre_collapsed: Vec<bool>,
}

fn tree() -> impl Strategy<Value = Tree> {
    let node = (
        0u8..3,
        any::<prop::sample::Index>(),
        parent(),
        any::<bool>(),
    );
    (parent(), prop::collection::vec(node, 0..14)).prop_map(|(root, nodes)| {
        let mut tree = Tree {
            nodes: vec![(Kind::Group, 0, root)],
            pre_collapsed: vec![false],
        };
        for (i, (kind, parent, bounds, collapsed)) in nodes.into_iter().enumerate() {
            let kind = match kind {
                0 => Kind::Group,
                1 => Kind::Card,
                _ => Kind::Other,
            };
            tree.nodes.push((kind, parent.index(i + 1), bounds));
            tree.pre_collapsed.push(collapsed && matches!(kind, Kind::Group));
        }
        tree
    })
}

fn node_id(i: usize) -> ShapeId {
    ShapeId::from(format!("shape:{i}"))
}

fn build(tree: &Tree) -> ShapeArena {
    let mut arena = ShapeArena::new();
    for (i, &(kind, parent, bounds)) in tree.nodes.iter().enumerate() {
        arena.insert(match kind {
            Kind::Group => Shape::group(node_id(i), "group", bounds),
            Kind::Card => Shape::card(node_id(i), "https://example.com", bounds),
            Kind::Other => Shape::other(node_id(i), "note", bounds),
        });
        if i > 0 {
            arena.connect(format!("arrow:{i}"), &node_id(parent), &node_id(i));
        }
    }
    arena
}

proptest! {
    #[test]
    fn row_shares_one_baseline(parent in parent(), row in children()) {
        let positions = RowLayoutPlanner::default().plan(parent, &row);
        let tallest = row.iter().map(|c| c.height).fold(0.0, f64::max);

        prop_assert_eq!(positions.len(), row.len());
        for child in &row {
            prop_assert!((positions[&child.id].y - (parent.y - 40.0 - tallest)).abs() < EPS);
        }
    }

    #[test]
    fn row_keeps_order_and_gap(parent in parent(), row in children()) {
        let positions = RowLayoutPlanner::default().plan(parent, &row);

        for pair in row.windows(2) {
            let left = positions[&pair[0].id].x + pair[0].width;
            let right = positions[&pair[1].id].x;
            prop_assert!((right - left - 20.0).abs() < EPS);
        }
    }

    #[test]
    fn row_is_centered_on_parent(parent in parent(), row in children()) {
        let positions = RowLayoutPlanner::default().plan(parent, &row);
        let first = positions[&row[0].id].x;
        let last = row.last().unwrap();
        let end = positions[&last.id].x + last.width;

        prop_assert!(((first + end) / 2.0 - parent.center_x()).abs() < EPS);
    }

    #[test]
    fn collapse_then_expand_is_identity(tree in tree()) {
        let engine = CollapseEngine::default();
        let mut arena = build(&tree);

        // Inner groups first, so every earlier collapse happens bottom-up.
        for i in (1..tree.nodes.len()).rev() {
            if tree.pre_collapsed[i] {
                engine.collapse(&mut arena, &node_id(i)).unwrap();
            }
        }
        let before = arena.clone();
        let root = node_id(0);

        engine.collapse(&mut arena, &root).unwrap();
        engine.expand(&mut arena, &root).unwrap();

        prop_assert_eq!(arena, before);
    }

    #[test]
    fn collapsed_root_shows_only_its_compact_row(tree in tree()) {
        let mut arena = build(&tree);
        CollapseEngine::default().collapse(&mut arena, &node_id(0)).unwrap();

        for (i, &(kind, parent, _)) in tree.nodes.iter().enumerate().skip(1) {
            let shape = arena.get(&node_id(i)).unwrap();
            let in_row = parent == 0 && !matches!(kind, Kind::Other);
            prop_assert_eq!(shape.is_visible(), in_row, "shape {}", i);
            prop_assert_eq!(shape.is_compact(), in_row, "shape {}", i);
        }
    }
}
