use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TreeError, TreeItem};

/// One node of a depth-first flattened tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatItem<T> {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub depth: usize,
    /// Position among siblings.
    pub index: usize,
    #[serde(flatten)]
    pub data: T,
}

/// A persisted row: parent pointer plus sibling position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord<T> {
    pub id: Uuid,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub position: u32,
    #[serde(flatten)]
    pub data: T,
}

pub fn flatten<T: Clone>(items: &[TreeItem<T>]) -> Vec<FlatItem<T>> {
    let mut out = Vec::new();
    flatten_into(items, None, 0, &mut out);
    out
}

fn flatten_into<T: Clone>(
    items: &[TreeItem<T>],
    parent_id: Option<Uuid>,
    depth: usize,
    out: &mut Vec<FlatItem<T>>,
) {
    for (index, item) in items.iter().enumerate() {
        out.push(FlatItem {
            id: item.id,
            parent_id,
            depth,
            index,
            data: item.data.clone(),
        });
        flatten_into(&item.children, Some(item.id), depth + 1, out);
    }
}

/// Rebuild a tree from a flat list. Siblings keep their relative order in the
/// list; `depth` and `index` are ignored, only parent pointers count.
pub fn build<T>(flat: Vec<FlatItem<T>>) -> Result<Vec<TreeItem<T>>, TreeError> {
    assemble(flat.into_iter().map(|f| (f.id, f.parent_id, f.data)))
}

pub fn to_records<T: Clone>(items: &[TreeItem<T>]) -> Vec<TreeRecord<T>> {
    flatten(items)
        .into_iter()
        .map(|f| TreeRecord {
            id: f.id,
            parent_id: f.parent_id,
            position: f.index as u32,
            data: f.data,
        })
        .collect()
}

/// Rebuild a tree from persisted rows, ordering siblings by `position`.
/// Rows with equal positions keep their input order.
pub fn from_records<T>(mut records: Vec<TreeRecord<T>>) -> Result<Vec<TreeItem<T>>, TreeError> {
    records.sort_by_key(|r| r.position);
    assemble(records.into_iter().map(|r| (r.id, r.parent_id, r.data)))
}

fn assemble<T>(
    nodes: impl IntoIterator<Item = (Uuid, Option<Uuid>, T)>,
) -> Result<Vec<TreeItem<T>>, TreeError> {
    let mut payloads: HashMap<Uuid, T> = HashMap::new();
    let mut order: Vec<(Uuid, Option<Uuid>)> = Vec::new();

    for (id, parent_id, data) in nodes {
        if payloads.insert(id, data).is_some() {
            return Err(TreeError::DuplicateId(id));
        }
        order.push((id, parent_id));
    }

    let mut children: HashMap<Option<Uuid>, Vec<Uuid>> = HashMap::new();
    for &(id, parent_id) in &order {
        if let Some(parent) = parent_id {
            if !payloads.contains_key(&parent) {
                return Err(TreeError::Orphan {
                    id,
                    parent_id: parent,
                });
            }
        }
        children.entry(parent_id).or_default().push(id);
    }

    let roots = children.remove(&None).unwrap_or_default();
    let tree = attach(&roots, &mut children, &mut payloads);

    // Anything not reachable from the root level hangs off a parent cycle.
    if let Some(&(stray, _)) = order.iter().find(|(id, _)| payloads.contains_key(id)) {
        return Err(TreeError::Cycle(stray));
    }

    Ok(tree)
}

fn attach<T>(
    ids: &[Uuid],
    children: &mut HashMap<Option<Uuid>, Vec<Uuid>>,
    payloads: &mut HashMap<Uuid, T>,
) -> Vec<TreeItem<T>> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(data) = payloads.remove(id) else {
            continue;
        };
        let child_ids = children.remove(&Some(*id)).unwrap_or_default();
        out.push(TreeItem {
            id: *id,
            data,
            children: attach(&child_ids, children, payloads),
        });
    }
    out
}
