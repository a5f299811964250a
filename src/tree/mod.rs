//! Ordered trees shared by the admin menu and the site navigations.
//!
//! Trees are kept nested (`TreeItem`) in the store. Editing goes through one of
//! three shapes: the nested tree itself, a depth-first flat list with parent
//! pointers (`FlatItem`, what a sortable drag-and-drop list works with), or
//! persisted rows with sibling positions (`TreeRecord`, what imports and seed
//! files carry).

pub mod error;
pub mod flat;
pub mod integrity;
pub mod ops;
pub mod projection;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use error::TreeError;
pub use flat::{build, flatten, from_records, to_records, FlatItem, TreeRecord};
pub use integrity::{check_integrity, repair, IntegrityReport};
pub use ops::{
    contains, count, depth_of, descendant_ids, find, find_mut, height, insert, locate, max_depth,
    move_node, remove, MoveInstruction, Placement, RemoveMode,
};
pub use projection::{apply_projection, drag, project, DragInstruction, DragOptions, Projection};

/// A node and its ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct TreeItem<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: T,
    #[serde(default)]
    pub children: Vec<TreeItem<T>>,
}

impl<T> TreeItem<T> {
    pub fn new(id: Uuid, data: T) -> Self {
        Self {
            id,
            data,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeItem<T>>) -> Self {
        self.children = children;
        self
    }

    /// Visit this node and every descendant, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TreeItem<T>)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// All ids in the tree, in depth-first order.
pub fn ids<T>(items: &[TreeItem<T>]) -> Vec<Uuid> {
    let mut out = Vec::new();
    for item in items {
        item.walk(&mut |node| out.push(node.id));
    }
    out
}

/// Keep nodes for which `keep` returns true. A rejected node drops its subtree.
pub fn retain<T: Clone>(
    items: &[TreeItem<T>],
    keep: &mut impl FnMut(&TreeItem<T>) -> bool,
) -> Vec<TreeItem<T>> {
    let mut out = Vec::new();
    for item in items {
        if keep(item) {
            out.push(TreeItem {
                id: item.id,
                data: item.data.clone(),
                children: retain(&item.children, keep),
            });
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Deterministic ids so assertions read naturally.
    pub fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    pub fn node(n: u128, children: Vec<TreeItem<String>>) -> TreeItem<String> {
        TreeItem::new(id(n), format!("n{}", n)).with_children(children)
    }

    pub fn leaf(n: u128) -> TreeItem<String> {
        node(n, vec![])
    }

    /// 1
    /// ├── 2
    /// │   └── 3
    /// └── 4
    /// 5
    pub fn sample() -> Vec<TreeItem<String>> {
        vec![node(1, vec![node(2, vec![leaf(3)]), leaf(4)]), leaf(5)]
    }

    /// Ids of the tree in depth-first order, as small integers.
    pub fn shape(items: &[TreeItem<String>]) -> Vec<(u128, Option<u128>, usize)> {
        flatten(items)
            .into_iter()
            .map(|f| (f.id.as_u128(), f.parent_id.map(|p| p.as_u128()), f.depth))
            .collect()
    }
}
