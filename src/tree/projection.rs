//! Drag-and-drop reordering over a flattened tree.
//!
//! A sortable list shows the tree flattened. While a node is dragged its own
//! subtree is hidden and travels with it. Dropping it over another row moves
//! it to that row's slot; the horizontal drag offset, measured in indentation
//! steps, picks its new depth within what the neighbours allow, and the depth
//! picks the parent.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{build, flatten, max_depth, FlatItem, TreeError, TreeItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub depth: usize,
    pub min_depth: usize,
    pub max_depth: usize,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragInstruction {
    pub active_id: Uuid,
    pub over_id: Uuid,
    /// Horizontal offset of the pointer since the drag started, in pixels.
    #[serde(default)]
    pub offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOptions {
    pub indentation_width: f64,
    pub depth_limit: Option<usize>,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            indentation_width: 50.0,
            depth_limit: None,
        }
    }
}

/// Where `active_id` would land if dropped over `over_id`.
pub fn project<T>(
    items: &[FlatItem<T>],
    active_id: Uuid,
    over_id: Uuid,
    drag_offset: f64,
    options: &DragOptions,
) -> Result<Projection, TreeError> {
    let active = items
        .iter()
        .find(|i| i.id == active_id)
        .ok_or(TreeError::NotFound(active_id))?;

    // The active subtree, relying on parents preceding children in the list.
    let mut subtree: HashSet<Uuid> = HashSet::from([active_id]);
    let mut subtree_levels = 1;
    for item in items {
        if let Some(parent) = item.parent_id {
            if subtree.contains(&parent) {
                subtree.insert(item.id);
                subtree_levels = subtree_levels.max(item.depth.saturating_sub(active.depth) + 1);
            }
        }
    }

    if over_id != active_id && subtree.contains(&over_id) {
        return Err(TreeError::InvalidTarget(format!(
            "{} is inside the dragged subtree",
            over_id
        )));
    }

    let mut visible: Vec<&FlatItem<T>> = items
        .iter()
        .filter(|i| i.id == active_id || !subtree.contains(&i.id))
        .collect();

    let active_index = visible
        .iter()
        .position(|i| i.id == active_id)
        .ok_or(TreeError::NotFound(active_id))?;
    let over_index = visible
        .iter()
        .position(|i| i.id == over_id)
        .ok_or(TreeError::NotFound(over_id))?;

    array_move(&mut visible, active_index, over_index);

    let previous = over_index.checked_sub(1).and_then(|i| visible.get(i)).copied();
    let next = visible.get(over_index + 1).copied();

    let drag_depth = if options.indentation_width > 0.0 {
        (drag_offset / options.indentation_width).round() as i64
    } else {
        0
    };
    let projected = (active.depth as i64).saturating_add(drag_depth);

    let mut max_depth = previous.map_or(0, |p| p.depth + 1);
    let min_depth = next.map_or(0, |n| n.depth);

    if let Some(limit) = options.depth_limit {
        if subtree_levels > limit {
            return Err(TreeError::DepthExceeded { limit });
        }
        max_depth = max_depth.min(limit - subtree_levels);
        if min_depth > max_depth {
            return Err(TreeError::DepthExceeded { limit });
        }
    }

    let depth = if projected >= max_depth as i64 {
        max_depth
    } else if projected < min_depth as i64 {
        min_depth
    } else {
        projected as usize
    };

    let parent_id = match previous {
        None => None,
        Some(_) if depth == 0 => None,
        Some(prev) if depth == prev.depth => prev.parent_id,
        Some(prev) if depth > prev.depth => Some(prev.id),
        Some(_) => visible[..over_index]
            .iter()
            .rev()
            .find(|i| i.depth == depth)
            .and_then(|i| i.parent_id),
    };

    Ok(Projection {
        depth,
        min_depth,
        max_depth,
        parent_id,
    })
}

/// Drop `active_id` over `over_id` with a previously computed projection.
/// The active node's descendants keep their parent and follow it.
pub fn apply_projection<T: Clone>(
    tree: &[TreeItem<T>],
    active_id: Uuid,
    over_id: Uuid,
    projection: &Projection,
) -> Result<Vec<TreeItem<T>>, TreeError> {
    let mut flat = flatten(tree);

    let active_index = flat
        .iter()
        .position(|i| i.id == active_id)
        .ok_or(TreeError::NotFound(active_id))?;
    let over_index = flat
        .iter()
        .position(|i| i.id == over_id)
        .ok_or(TreeError::NotFound(over_id))?;

    if let Some(parent) = projection.parent_id {
        if parent == active_id {
            return Err(TreeError::WouldCreateCycle {
                id: active_id,
                target: parent,
            });
        }
    }

    let active = &mut flat[active_index];
    active.depth = projection.depth;
    active.parent_id = projection.parent_id;

    array_move(&mut flat, active_index, over_index);
    build(flat)
}

/// Project and apply in one step.
pub fn drag<T: Clone>(
    tree: &[TreeItem<T>],
    instruction: &DragInstruction,
    options: &DragOptions,
) -> Result<(Vec<TreeItem<T>>, Projection), TreeError> {
    let flat = flatten(tree);
    let projection = project(
        &flat,
        instruction.active_id,
        instruction.over_id,
        instruction.offset,
        options,
    )?;
    let rebuilt = apply_projection(tree, instruction.active_id, instruction.over_id, &projection)?;

    if let Some(limit) = options.depth_limit {
        if max_depth(&rebuilt) > limit {
            return Err(TreeError::DepthExceeded { limit });
        }
    }

    tracing::debug!(
        "Dragged node {} over {} to depth {} under {:?}",
        instruction.active_id,
        instruction.over_id,
        projection.depth,
        projection.parent_id
    );

    Ok((rebuilt, projection))
}

fn array_move<V>(items: &mut Vec<V>, from: usize, to: usize) {
    if from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::fixtures::*;

    const STEP: f64 = 50.0;

    fn options() -> DragOptions {
        DragOptions {
            indentation_width: STEP,
            depth_limit: None,
        }
    }

    fn projection_for(active: u128, over: u128, offset: f64) -> Projection {
        project(&flatten(&sample()), id(active), id(over), offset, &options()).unwrap()
    }

    fn dragged(active: u128, over: u128, offset: f64) -> Vec<(u128, Option<u128>, usize)> {
        let instruction = DragInstruction {
            active_id: id(active),
            over_id: id(over),
            offset,
        };
        let (tree, _) = drag(&sample(), &instruction, &options()).unwrap();
        shape(&tree)
    }

    #[test]
    fn horizontal_drag_in_place_indents_under_previous_sibling() {
        // 4 sits after 2's subtree; one step right makes it a child of 2.
        let p = projection_for(4, 4, STEP);
        assert_eq!(p.depth, 2);
        assert_eq!(p.parent_id, Some(id(2)));
        assert_eq!(p.max_depth, 3);
        assert_eq!(p.min_depth, 0);
    }

    #[test]
    fn depth_is_clamped_between_neighbours() {
        // Dragging 4 far right is capped at previous.depth + 1.
        let p = projection_for(4, 4, STEP * 10.0);
        assert_eq!(p.depth, 3);
        assert_eq!(p.parent_id, Some(id(3)));

        // Dragging 4 far left is capped at next.depth (5 is at the root).
        let p = projection_for(4, 4, -STEP * 10.0);
        assert_eq!(p.depth, 0);
        assert_eq!(p.parent_id, None);
    }

    #[test]
    fn huge_offsets_saturate_to_the_neighbour_bounds() {
        for offset in [f64::MAX, 1e300, f64::INFINITY] {
            assert_eq!(projection_for(4, 4, offset).depth, 3);
        }
        for offset in [-1e300, f64::MIN, f64::NEG_INFINITY] {
            assert_eq!(projection_for(4, 4, offset).depth, 0);
        }
        // NaN casts to zero steps, so 4 keeps its depth.
        assert_eq!(projection_for(4, 4, f64::NAN).depth, 1);
    }

    #[test]
    fn shallower_than_previous_takes_parent_of_nearest_node_at_that_depth() {
        // 4 stays at depth 1 after 3 (depth 2): the nearest depth-1 node above
        // is 2, so 4 shares 2's parent.
        let p = projection_for(4, 4, 0.0);
        assert_eq!(p.depth, 1);
        assert_eq!(p.parent_id, Some(id(1)));

        // Past half an indentation step to the left rounds to one level up.
        let p = projection_for(4, 4, -STEP * 0.6);
        assert_eq!(p.depth, 0);
        assert_eq!(p.parent_id, None);
    }

    #[test]
    fn dragging_a_parent_carries_its_subtree() {
        // Drop 2 (with 3) over 5 without horizontal movement: 2 keeps depth 1
        // which after 5 means child of 5.
        assert_eq!(
            dragged(2, 5, 0.0),
            vec![(1, None, 0), (4, Some(1), 1), (5, None, 0), (2, Some(5), 1), (3, Some(2), 2)]
        );
    }

    #[test]
    fn dragging_to_top_promotes_to_root() {
        assert_eq!(
            dragged(3, 1, STEP * 3.0),
            vec![(3, None, 0), (1, None, 0), (2, Some(1), 1), (4, Some(1), 1), (5, None, 0)]
        );
    }

    #[test]
    fn over_inside_dragged_subtree_is_rejected() {
        let flat = flatten(&sample());
        let err = project(&flat, id(1), id(3), 0.0, &options()).unwrap_err();
        assert!(matches!(err, TreeError::InvalidTarget(_)));
    }

    #[test]
    fn depth_limit_caps_projection_and_rejects_impossible_drops() {
        let limited = DragOptions {
            indentation_width: STEP,
            depth_limit: Some(2),
        };
        let flat = flatten(&sample());

        // 4 may go at most one level deep under a limit of two levels.
        let p = project(&flat, id(4), id(4), STEP * 5.0, &limited).unwrap();
        assert_eq!(p.max_depth, 1);
        assert_eq!(p.depth, 1);

        // 2 carries 3, so it must stay at the root level, yet its next
        // neighbour 4 sits at depth 1 and needs a parent above it.
        let err = project(&flat, id(2), id(2), 0.0, &limited).unwrap_err();
        assert_eq!(err, TreeError::DepthExceeded { limit: 2 });
    }
}
