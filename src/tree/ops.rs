use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TreeError, TreeItem};

/// Where a moved node lands relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Before,
    After,
    FirstChild,
    LastChild,
}

/// Move `id` (with its subtree) next to or under `target`.
/// Without a target the node is appended at the end of the root level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInstruction {
    pub id: Uuid,
    #[serde(default)]
    pub target: Option<Uuid>,
    #[serde(default = "default_placement")]
    pub placement: Placement,
}

fn default_placement() -> Placement {
    Placement::After
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemoveMode {
    /// Drop the node and everything under it.
    #[default]
    Cascade,
    /// Drop only the node; its children take its place among its siblings.
    PromoteChildren,
}

pub fn find<T>(items: &[TreeItem<T>], id: Uuid) -> Option<&TreeItem<T>> {
    for item in items {
        if item.id == id {
            return Some(item);
        }
        if let Some(found) = find(&item.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_mut<T>(items: &mut [TreeItem<T>], id: Uuid) -> Option<&mut TreeItem<T>> {
    for item in items.iter_mut() {
        if item.id == id {
            return Some(item);
        }
        if let Some(found) = find_mut(&mut item.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn contains<T>(items: &[TreeItem<T>], id: Uuid) -> bool {
    find(items, id).is_some()
}

/// Parent id and sibling index of a node.
pub fn locate<T>(items: &[TreeItem<T>], id: Uuid) -> Option<(Option<Uuid>, usize)> {
    locate_in(items, None, id)
}

fn locate_in<T>(
    items: &[TreeItem<T>],
    parent: Option<Uuid>,
    id: Uuid,
) -> Option<(Option<Uuid>, usize)> {
    for (index, item) in items.iter().enumerate() {
        if item.id == id {
            return Some((parent, index));
        }
        if let Some(found) = locate_in(&item.children, Some(item.id), id) {
            return Some(found);
        }
    }
    None
}

/// Zero-based depth of a node.
pub fn depth_of<T>(items: &[TreeItem<T>], id: Uuid) -> Option<usize> {
    for item in items {
        if item.id == id {
            return Some(0);
        }
        if let Some(depth) = depth_of(&item.children, id) {
            return Some(depth + 1);
        }
    }
    None
}

/// Number of levels in a subtree; a leaf has height 1.
pub fn height<T>(item: &TreeItem<T>) -> usize {
    1 + item.children.iter().map(height).max().unwrap_or(0)
}

/// Number of levels in the whole tree; an empty tree has 0.
pub fn max_depth<T>(items: &[TreeItem<T>]) -> usize {
    items.iter().map(height).max().unwrap_or(0)
}

pub fn count<T>(items: &[TreeItem<T>]) -> usize {
    items.iter().map(|item| 1 + count(&item.children)).sum()
}

pub fn descendant_ids<T>(item: &TreeItem<T>) -> Vec<Uuid> {
    let mut out = Vec::new();
    for child in &item.children {
        child.walk(&mut |node| out.push(node.id));
    }
    out
}

fn siblings_mut<T>(
    items: &mut Vec<TreeItem<T>>,
    parent: Option<Uuid>,
) -> Option<&mut Vec<TreeItem<T>>> {
    match parent {
        None => Some(items),
        Some(parent) => find_mut(items, parent).map(|node| &mut node.children),
    }
}

fn check_depth(levels: usize, depth_limit: Option<usize>) -> Result<(), TreeError> {
    match depth_limit {
        Some(limit) if levels > limit => Err(TreeError::DepthExceeded { limit }),
        _ => Ok(()),
    }
}

/// Insert a subtree under `parent` (root level when `None`) at `index`, or at
/// the end when `index` is `None` or past the end.
pub fn insert<T>(
    items: &mut Vec<TreeItem<T>>,
    item: TreeItem<T>,
    parent: Option<Uuid>,
    index: Option<usize>,
    depth_limit: Option<usize>,
) -> Result<(), TreeError> {
    let existing: HashSet<Uuid> = super::ids(items).into_iter().collect();
    let mut duplicate = None;
    item.walk(&mut |node| {
        if duplicate.is_none() && existing.contains(&node.id) {
            duplicate = Some(node.id);
        }
    });
    if let Some(id) = duplicate {
        return Err(TreeError::DuplicateId(id));
    }

    let depth = match parent {
        None => 0,
        Some(parent) => depth_of(items, parent).ok_or(TreeError::NotFound(parent))? + 1,
    };
    check_depth(depth + height(&item), depth_limit)?;

    let siblings = match parent {
        None => items,
        Some(parent) => siblings_mut(items, Some(parent)).ok_or(TreeError::NotFound(parent))?,
    };
    let at = index.unwrap_or(siblings.len()).min(siblings.len());
    siblings.insert(at, item);
    Ok(())
}

/// Remove a node. With `PromoteChildren` the returned node has no children;
/// they were spliced into its former place.
pub fn remove<T>(
    items: &mut Vec<TreeItem<T>>,
    id: Uuid,
    mode: RemoveMode,
) -> Result<TreeItem<T>, TreeError> {
    let (parent, index) = locate(items, id).ok_or(TreeError::NotFound(id))?;
    let siblings = siblings_mut(items, parent).ok_or(TreeError::NotFound(id))?;
    let mut node = siblings.remove(index);

    if mode == RemoveMode::PromoteChildren {
        let promoted = std::mem::take(&mut node.children);
        siblings.splice(index..index, promoted);
    }

    Ok(node)
}

pub fn move_node<T>(
    items: &mut Vec<TreeItem<T>>,
    instruction: &MoveInstruction,
    depth_limit: Option<usize>,
) -> Result<(), TreeError> {
    let id = instruction.id;
    let node = find(items, id).ok_or(TreeError::NotFound(id))?;

    let new_depth = match instruction.target {
        None => 0,
        Some(target) => {
            if target == id || descendant_ids(node).contains(&target) {
                return Err(TreeError::WouldCreateCycle { id, target });
            }
            let target_depth = depth_of(items, target).ok_or(TreeError::NotFound(target))?;
            match instruction.placement {
                Placement::Before | Placement::After => target_depth,
                Placement::FirstChild | Placement::LastChild => target_depth + 1,
            }
        }
    };
    check_depth(new_depth + height(node), depth_limit)?;

    let node = remove(items, id, RemoveMode::Cascade)?;

    let Some(target) = instruction.target else {
        items.push(node);
        return Ok(());
    };

    match instruction.placement {
        Placement::Before | Placement::After => {
            let (parent, index) = locate(items, target).ok_or(TreeError::NotFound(target))?;
            let siblings = siblings_mut(items, parent).ok_or(TreeError::NotFound(target))?;
            let at = if instruction.placement == Placement::Before {
                index
            } else {
                index + 1
            };
            siblings.insert(at, node);
        }
        Placement::FirstChild => {
            let target = find_mut(items, target).ok_or(TreeError::NotFound(target))?;
            target.children.insert(0, node);
        }
        Placement::LastChild => {
            let target = find_mut(items, target).ok_or(TreeError::NotFound(target))?;
            target.children.push(node);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::fixtures::*;

    fn moved(tree: &mut Vec<TreeItem<String>>, n: u128, target: Option<u128>, placement: Placement) {
        let instruction = MoveInstruction {
            id: id(n),
            target: target.map(id),
            placement,
        };
        move_node(tree, &instruction, None).unwrap();
    }

    #[test]
    fn measures_depth_height_and_count() {
        let tree = sample();
        assert_eq!(depth_of(&tree, id(3)), Some(2));
        assert_eq!(depth_of(&tree, id(99)), None);
        assert_eq!(max_depth(&tree), 3);
        assert_eq!(count(&tree), 5);
        assert_eq!(descendant_ids(&tree[0]), vec![id(2), id(3), id(4)]);
        assert_eq!(locate(&tree, id(4)), Some((Some(id(1)), 1)));
    }

    #[test]
    fn insert_respects_parent_index_and_limit() {
        let mut tree = sample();
        insert(&mut tree, leaf(6), Some(id(1)), Some(0), Some(3)).unwrap();
        assert_eq!(tree[0].children[0].id, id(6));

        let err = insert(&mut tree, leaf(7), Some(id(3)), None, Some(3)).unwrap_err();
        assert_eq!(err, TreeError::DepthExceeded { limit: 3 });

        let err = insert(&mut tree, leaf(2), None, None, None).unwrap_err();
        assert_eq!(err, TreeError::DuplicateId(id(2)));

        let err = insert(&mut tree, leaf(8), Some(id(99)), None, None).unwrap_err();
        assert_eq!(err, TreeError::NotFound(id(99)));

        insert(&mut tree, leaf(9), None, Some(100), None).unwrap();
        assert_eq!(tree.last().map(|t| t.id), Some(id(9)));
    }

    #[test]
    fn remove_cascade_drops_subtree() {
        let mut tree = sample();
        let removed = remove(&mut tree, id(2), RemoveMode::Cascade).unwrap();
        assert_eq!(removed.children.len(), 1);
        assert_eq!(shape(&tree), vec![(1, None, 0), (4, Some(1), 1), (5, None, 0)]);
    }

    #[test]
    fn remove_promote_splices_children_into_place() {
        let mut tree = sample();
        remove(&mut tree, id(1), RemoveMode::PromoteChildren).unwrap();
        assert_eq!(
            shape(&tree),
            vec![(2, None, 0), (3, Some(2), 1), (4, None, 0), (5, None, 0)]
        );
    }

    #[test]
    fn move_before_after_and_into() {
        let mut tree = sample();
        moved(&mut tree, 5, Some(4), Placement::Before);
        assert_eq!(
            shape(&tree),
            vec![(1, None, 0), (2, Some(1), 1), (3, Some(2), 2), (5, Some(1), 1), (4, Some(1), 1)]
        );

        moved(&mut tree, 2, Some(1), Placement::After);
        assert_eq!(
            shape(&tree),
            vec![(1, None, 0), (5, Some(1), 1), (4, Some(1), 1), (2, None, 0), (3, Some(2), 1)]
        );

        moved(&mut tree, 4, Some(2), Placement::FirstChild);
        moved(&mut tree, 1, Some(2), Placement::LastChild);
        assert_eq!(
            shape(&tree),
            vec![(2, None, 0), (4, Some(2), 1), (3, Some(2), 1), (1, Some(2), 1), (5, Some(1), 2)]
        );

        moved(&mut tree, 5, None, Placement::After);
        assert_eq!(tree.last().map(|t| t.id), Some(id(5)));
    }

    #[test]
    fn move_refuses_cycles_and_depth_overflow() {
        let mut tree = sample();
        let into_child = MoveInstruction {
            id: id(1),
            target: Some(id(3)),
            placement: Placement::LastChild,
        };
        assert_eq!(
            move_node(&mut tree, &into_child, None),
            Err(TreeError::WouldCreateCycle {
                id: id(1),
                target: id(3)
            })
        );

        let onto_self = MoveInstruction {
            id: id(2),
            target: Some(id(2)),
            placement: Placement::Before,
        };
        assert!(matches!(
            move_node(&mut tree, &onto_self, None),
            Err(TreeError::WouldCreateCycle { .. })
        ));

        let too_deep = MoveInstruction {
            id: id(2),
            target: Some(id(4)),
            placement: Placement::FirstChild,
        };
        assert_eq!(
            move_node(&mut tree, &too_deep, Some(3)),
            Err(TreeError::DepthExceeded { limit: 3 })
        );

        // Failed moves leave the tree untouched.
        assert_eq!(tree, sample());
    }
}
