//! Collapse and expand of group shapes.
//!
//! A group's children are the shapes at the `end` of arrows whose `start`
//! is bound to the group. Collapsing a group:
//!
//! 1. saves the box of every transitive descendant on the group,
//! 2. hides "other" direct children, everything two or more levels deep,
//!    and every arrow in the subtree except those pointing at child groups,
//! 3. shrinks direct cards and groups to their compact size and lines them
//!    up in a row above the group.
//!
//! Expanding restores every saved box taken in the form the shape ends up
//! in. Nested groups that were collapsed on their own stay collapsed, with
//! their compact row following them to wherever they are restored, and
//! visibility is recomputed from every collapsed group inside the subtree
//! or above it.
//!
//! Only the group acted on changes state: ancestors are never collapsed or
//! expanded along with it.

use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result};
use crate::geometry::{Bounds, Point};
use crate::graph::ShapeGraph;
use crate::layout::{LayoutChild, RowLayoutPlanner};
use crate::saved_layout::SavedLayout;
use crate::shape::{GroupProps, ShapeId, ShapeKind, ShapePatch, Terminal};
use std::collections::{HashSet, VecDeque};

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    /// The group was expanded and is now collapsed.
    Collapsed,
    /// The group was collapsed and is now expanded.
    Expanded,
}

/// Direct children of a group, split by kind, in discovery order.
#[derive(Debug, Default)]
struct Children {
    cards: Vec<ShapeId>,
    groups: Vec<ShapeId>,
    others: Vec<ShapeId>,
    /// Every outgoing arrow that reaches a child.
    arrows: Vec<ShapeId>,
    /// The subset of `arrows` that ends at a group.
    arrows_to_groups: Vec<ShapeId>,
}

impl Children {
    fn contains(&self, id: &ShapeId) -> bool {
        self.cards.contains(id) || self.groups.contains(id) || self.others.contains(id)
    }
}

/// Shapes and arrows a collapsed group keeps out of sight.
#[derive(Debug, Default)]
struct Hidden {
    shapes: HashSet<ShapeId>,
    arrows: HashSet<ShapeId>,
}

/// Collapses and expands groups on any [`ShapeGraph`].
#[derive(Debug, Clone, Default)]
pub struct CollapseEngine {
    config: CanvasConfig,
    planner: RowLayoutPlanner,
}

impl CollapseEngine {
    /// Engine with the given sizes and gaps.
    #[must_use]
    pub const fn new(config: CanvasConfig) -> Self {
        let planner = RowLayoutPlanner::from_config(&config);
        Self { config, planner }
    }

    /// Sizes and gaps in use.
    #[must_use]
    pub const fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Collapse an expanded group.
    ///
    /// Nothing is modified when an error is returned.
    ///
    /// # Errors
    ///
    /// - [`CanvasError::ShapeNotFound`] / [`CanvasError::WrongShapeType`]
    ///   when `group_id` is not a group
    /// - [`CanvasError::AlreadyCollapsed`] when it is collapsed
    /// - [`CanvasError::MissingBounds`] when the graph has no box for it
    /// - [`CanvasError::Serialization`] if the saved layout cannot be encoded
    pub fn collapse<G: ShapeGraph>(&self, graph: &mut G, group_id: &ShapeId) -> Result<()> {
        if group_props(graph, group_id)?.collapsed {
            return Err(CanvasError::AlreadyCollapsed(group_id.clone()));
        }

        let children = direct_children(graph, group_id);
        let parent = graph
            .shape_page_bounds(group_id)
            .ok_or_else(|| CanvasError::MissingBounds(group_id.clone()))?;
        let descendants = descendants(graph, group_id);

        let mut saved = SavedLayout::new();
        for id in &descendants {
            if let Some(shape) = graph.shape(id) {
                saved.capture(shape);
            }
        }
        let saved = saved.to_json()?;

        graph.update_shape(group_id, ShapePatch::new().with_collapsed(true, saved));

        let hidden = hidden_by(graph, &children, &descendants);
        for id in hidden.shapes.iter().chain(&hidden.arrows) {
            graph.update_shape(id, ShapePatch::opacity(0.0));
        }
        for arrow in &children.arrows_to_groups {
            graph.update_shape(arrow, ShapePatch::opacity(1.0));
        }

        let moved = self.compact_row(graph, parent, &children, None).len();

        tracing::debug!(
            group_id = %group_id,
            descendants = descendants.len(),
            moved,
            "Group collapsed"
        );
        Ok(())
    }

    /// Expand a collapsed group, restoring every saved box.
    ///
    /// # Errors
    ///
    /// - [`CanvasError::ShapeNotFound`] / [`CanvasError::WrongShapeType`]
    ///   when `group_id` is not a group
    /// - [`CanvasError::NotCollapsed`] when it is expanded
    pub fn expand<G: ShapeGraph>(&self, graph: &mut G, group_id: &ShapeId) -> Result<()> {
        let props = group_props(graph, group_id)?;
        if !props.collapsed {
            return Err(CanvasError::NotCollapsed(group_id.clone()));
        }
        let saved = SavedLayout::parse(&props.saved_layout);

        graph.update_shape(group_id, ShapePatch::new().with_collapsed(false, String::new()));

        let children = direct_children(graph, group_id);
        let descendants = descendants(graph, group_id);
        let within: HashSet<ShapeId> = descendants.iter().cloned().collect();

        // Collapsed groups inside the subtree keep their children compacted
        // and their deeper levels hidden; collapsed ancestors keep hiding
        // what lies below their first level.
        let mut overlay = Overlay::default();
        let mut inner_groups = Vec::new();
        for id in &descendants {
            if is_collapsed_group(graph, id) {
                overlay.add(graph, id, &descendants_of(graph, id, group_id));
                inner_groups.push((id.clone(), graph.shape_page_bounds(id)));
            }
        }
        for ancestor in ancestors(graph, group_id) {
            if is_collapsed_group(graph, &ancestor) {
                overlay.add(graph, &ancestor, &self::descendants(graph, &ancestor));
            }
        }

        for id in &descendants {
            let Some(shape) = graph.shape(id) else {
                continue;
            };
            let opacity = if overlay.hidden.shapes.contains(id) { 0.0 } else { 1.0 };
            let mut patch = ShapePatch::opacity(opacity);

            if let Some(saved) = saved.get(id) {
                let compact = overlay.compacted.contains(id);
                // A saved box only fits if it was taken in the same form the
                // shape ends up in; otherwise the current box is the right one.
                let fits = saved.compact == compact;
                patch = match &shape.kind {
                    ShapeKind::Card(_) if fits => patch
                        .with_position(Point::new(saved.x, saved.y))
                        .with_compact(compact)
                        .with_size(
                            saved.w.unwrap_or(self.config.card_width),
                            saved.h.unwrap_or(self.config.card_height),
                        ),
                    ShapeKind::Group(_) if fits => patch
                        .with_position(Point::new(saved.x, saved.y))
                        .with_compact(compact)
                        .with_size(
                            saved.w.unwrap_or(self.config.group_width),
                            saved.h.unwrap_or(self.config.group_height),
                        ),
                    ShapeKind::Card(_) | ShapeKind::Group(_) => patch.with_compact(compact),
                    ShapeKind::Arrow | ShapeKind::Other { .. } => {
                        patch.with_position(Point::new(saved.x, saved.y))
                    },
                };
            }

            graph.update_shape(id, patch);
        }

        // A still-collapsed group that moved takes its compact row along.
        let mut moved: VecDeque<ShapeId> = inner_groups
            .into_iter()
            .filter(|(id, before)| graph.shape_page_bounds(id) != *before)
            .map(|(id, _)| id)
            .collect();
        let mut relaid = HashSet::new();
        while let Some(inner) = moved.pop_front() {
            if !relaid.insert(inner.clone()) {
                continue;
            }
            let Some(bounds) = graph.shape_page_bounds(&inner) else {
                continue;
            };
            let inner_children = direct_children(graph, &inner);
            for child in self.compact_row(graph, bounds, &inner_children, Some(&within)) {
                if is_collapsed_group(graph, &child) {
                    moved.push_back(child);
                }
            }
        }

        let mut arrows = children.arrows;
        for arrow in outgoing_arrows_of_all(graph, &descendants) {
            if !arrows.contains(&arrow) {
                arrows.push(arrow);
            }
        }
        for arrow in &arrows {
            let opacity = if overlay.hidden.arrows.contains(arrow) { 0.0 } else { 1.0 };
            graph.update_shape(arrow, ShapePatch::opacity(opacity));
        }

        tracing::debug!(
            group_id = %group_id,
            restored = saved.len(),
            still_hidden = overlay.hidden.shapes.len(),
            "Group expanded"
        );
        Ok(())
    }

    /// Collapse an expanded group or expand a collapsed one.
    ///
    /// # Errors
    ///
    /// Same as [`collapse`](Self::collapse) and [`expand`](Self::expand).
    pub fn toggle<G: ShapeGraph>(&self, graph: &mut G, group_id: &ShapeId) -> Result<Toggled> {
        if group_props(graph, group_id)?.collapsed {
            self.expand(graph, group_id).map(|()| Toggled::Expanded)
        } else {
            self.collapse(graph, group_id).map(|()| Toggled::Collapsed)
        }
    }

    /// Shrink a collapsed group's cards and groups and line them up above
    /// `parent`, skipping children outside `only` when given. Returns the
    /// children whose box changed.
    fn compact_row<G: ShapeGraph>(
        &self,
        graph: &mut G,
        parent: Bounds,
        children: &Children,
        only: Option<&HashSet<ShapeId>>,
    ) -> Vec<ShapeId> {
        let card = self.config.card_compact_size;
        let group = self.config.group_compact_size;
        let row: Vec<LayoutChild> = children
            .cards
            .iter()
            .map(|id| LayoutChild::new(id.clone(), card, card))
            .chain(children.groups.iter().map(|id| LayoutChild::new(id.clone(), group, group)))
            .filter(|child| only.is_none_or(|ids| ids.contains(&child.id)))
            .collect();
        let positions = self.planner.plan(parent, &row);

        let mut changed = Vec::new();
        for child in &row {
            let Some(&position) = positions.get(&child.id) else {
                continue;
            };
            let before = graph.shape_page_bounds(&child.id);
            graph.update_shape(
                &child.id,
                ShapePatch::new()
                    .with_position(position)
                    .with_compact(true)
                    .with_size(child.width, child.height),
            );
            if graph.shape_page_bounds(&child.id) != before {
                changed.push(child.id.clone());
            }
        }
        changed
    }
}

/// Effect of one collapsed group on the shapes around it.
#[derive(Debug, Default)]
struct Overlay {
    hidden: Hidden,
    compacted: HashSet<ShapeId>,
}

impl Overlay {
    fn add<G: ShapeGraph>(&mut self, graph: &G, group: &ShapeId, descendants: &[ShapeId]) {
        let children = direct_children(graph, group);
        let hidden = hidden_by(graph, &children, descendants);
        self.hidden.shapes.extend(hidden.shapes);
        self.hidden.arrows.extend(hidden.arrows);
        self.compacted
            .extend(children.cards.into_iter().chain(children.groups));
    }
}

fn is_collapsed_group<G: ShapeGraph>(graph: &G, id: &ShapeId) -> bool {
    graph
        .shape(id)
        .and_then(|s| s.group_props())
        .is_some_and(|p| p.collapsed)
}

fn group_props<'g, G: ShapeGraph>(graph: &'g G, id: &ShapeId) -> Result<&'g GroupProps> {
    let shape = graph
        .shape(id)
        .ok_or_else(|| CanvasError::ShapeNotFound(id.clone()))?;
    shape.group_props().ok_or_else(|| CanvasError::WrongShapeType {
        id: id.clone(),
        expected: "group",
    })
}

/// Arrows whose `start` is bound to `id`.
fn outgoing_arrows<G: ShapeGraph>(graph: &G, id: &ShapeId) -> Vec<ShapeId> {
    graph
        .bindings_to_shape(id)
        .into_iter()
        .filter(|b| b.terminal == Terminal::Start)
        .filter(|b| graph.shape(&b.from_id).is_some_and(|s| s.is_arrow()))
        .map(|b| b.from_id.clone())
        .collect()
}

fn outgoing_arrows_of_all<G: ShapeGraph>(graph: &G, ids: &[ShapeId]) -> Vec<ShapeId> {
    let mut arrows = Vec::new();
    for id in ids {
        for arrow in outgoing_arrows(graph, id) {
            if !arrows.contains(&arrow) {
                arrows.push(arrow);
            }
        }
    }
    arrows
}

/// The shape an arrow's `end` is bound to.
fn arrow_end<G: ShapeGraph>(graph: &G, arrow: &ShapeId) -> Option<ShapeId> {
    graph
        .bindings_from_shape(arrow)
        .into_iter()
        .find(|b| b.terminal == Terminal::End)
        .map(|b| b.to_id.clone())
}

/// Every shape with an arrow path down to `id`, `id` excluded.
fn ancestors<G: ShapeGraph>(graph: &G, id: &ShapeId) -> Vec<ShapeId> {
    let mut found = Vec::new();
    let mut visited = HashSet::from([id.clone()]);
    let mut queue = VecDeque::from([id.clone()]);

    while let Some(current) = queue.pop_front() {
        let incoming = graph
            .bindings_to_shape(&current)
            .into_iter()
            .filter(|b| b.terminal == Terminal::End)
            .map(|b| b.from_id.clone())
            .filter(|arrow| graph.shape(arrow).is_some_and(|s| s.is_arrow()))
            .collect::<Vec<_>>();
        for arrow in incoming {
            let parent = graph
                .bindings_from_shape(&arrow)
                .into_iter()
                .find(|b| b.terminal == Terminal::Start)
                .map(|b| b.to_id.clone());
            let Some(parent) = parent else {
                continue;
            };
            if visited.insert(parent.clone()) {
                found.push(parent.clone());
                queue.push_back(parent);
            }
        }
    }

    found
}

fn direct_children<G: ShapeGraph>(graph: &G, parent: &ShapeId) -> Children {
    let mut children = Children::default();
    let mut seen = HashSet::new();

    for arrow in outgoing_arrows(graph, parent) {
        let Some(child) = arrow_end(graph, &arrow) else {
            continue;
        };
        // A self-loop does not make a group its own child.
        if &child == parent {
            continue;
        }
        let Some(shape) = graph.shape(&child) else {
            continue;
        };

        if shape.is_group() {
            children.arrows_to_groups.push(arrow.clone());
        }
        children.arrows.push(arrow);

        if !seen.insert(child.clone()) {
            continue;
        }
        match shape.kind {
            ShapeKind::Group(_) => children.groups.push(child),
            ShapeKind::Card(_) => children.cards.push(child),
            ShapeKind::Arrow | ShapeKind::Other { .. } => children.others.push(child),
        }
    }

    children
}

/// Every shape reachable from `root` along arrows, `root` excluded.
fn descendants<G: ShapeGraph>(graph: &G, root: &ShapeId) -> Vec<ShapeId> {
    descendants_of(graph, root, root)
}

/// Every shape reachable from `root`, leaving out `excluded` so a cycle
/// back to the group being expanded never hides it.
fn descendants_of<G: ShapeGraph>(graph: &G, root: &ShapeId, excluded: &ShapeId) -> Vec<ShapeId> {
    let mut found = Vec::new();
    let mut found_set = HashSet::new();
    let mut visited = HashSet::new();
    let mut stack = vec![root.clone()];

    while let Some(id) = stack.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }
        for arrow in outgoing_arrows(graph, &id) {
            let Some(child) = arrow_end(graph, &arrow) else {
                continue;
            };
            if &child != root && &child != excluded && found_set.insert(child.clone()) {
                found.push(child.clone());
            }
            if !visited.contains(&child) {
                stack.push(child);
            }
        }
    }

    found
}

/// What a collapsed group hides: its "other" children, every descendant
/// below the first level, and every subtree arrow that does not point at
/// one of its child groups.
fn hidden_by<G: ShapeGraph>(graph: &G, children: &Children, descendants: &[ShapeId]) -> Hidden {
    let mut hidden = Hidden::default();

    hidden.shapes.extend(children.others.iter().cloned());
    hidden.shapes.extend(
        descendants
            .iter()
            .filter(|id| !children.contains(id))
            .cloned(),
    );

    let keep = |arrow: &ShapeId| children.arrows_to_groups.contains(arrow);
    hidden
        .arrows
        .extend(children.arrows.iter().filter(|a| !keep(*a)).cloned());
    hidden.arrows.extend(
        outgoing_arrows_of_all(graph, descendants)
            .into_iter()
            .filter(|a| !keep(a)),
    );

    hidden
}
