use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use super::TreeRecord;

/// Structural problems found in a set of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub duplicate_ids: Vec<Uuid>,
    /// Rows whose parent id is not present.
    pub orphans: Vec<Uuid>,
    /// Each entry lists the members of one parent cycle, in walk order.
    pub cycles: Vec<Vec<Uuid>>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_ids.is_empty() && self.orphans.is_empty() && self.cycles.is_empty()
    }
}

pub fn check_integrity<T>(records: &[TreeRecord<T>]) -> IntegrityReport {
    let mut report = IntegrityReport::default();
    let mut parents: HashMap<Uuid, Option<Uuid>> = HashMap::new();
    let mut order = Vec::new();

    for record in records {
        if parents.contains_key(&record.id) {
            if !report.duplicate_ids.contains(&record.id) {
                report.duplicate_ids.push(record.id);
            }
            continue;
        }
        parents.insert(record.id, record.parent_id);
        order.push(record.id);
    }

    for id in &order {
        if let Some(Some(parent)) = parents.get(id) {
            if !parents.contains_key(parent) {
                report.orphans.push(*id);
            }
        }
    }

    // Walk each parent chain once; a node met twice on the same walk closes a cycle.
    let mut settled: HashSet<Uuid> = HashSet::new();
    for start in &order {
        let mut path: Vec<Uuid> = Vec::new();
        let mut on_path: HashSet<Uuid> = HashSet::new();
        let mut current = Some(*start);

        while let Some(id) = current {
            if settled.contains(&id) {
                break;
            }
            if on_path.contains(&id) {
                if let Some(at) = path.iter().position(|p| *p == id) {
                    report.cycles.push(path[at..].to_vec());
                }
                break;
            }
            path.push(id);
            on_path.insert(id);
            current = parents.get(&id).copied().flatten().filter(|p| parents.contains_key(p));
        }

        settled.extend(path);
    }

    report
}

/// Promote orphans to the root level and break each cycle by detaching its
/// first member to the root level. Later duplicates of an id are dropped.
/// Promoted rows are appended after the existing root rows.
pub fn repair<T>(records: Vec<TreeRecord<T>>) -> (Vec<TreeRecord<T>>, IntegrityReport) {
    let report = check_integrity(&records);
    if report.is_clean() {
        return (records, report);
    }

    let detach: HashSet<Uuid> = report
        .orphans
        .iter()
        .copied()
        .chain(report.cycles.iter().filter_map(|cycle| cycle.first().copied()))
        .collect();

    let mut seen = HashSet::new();
    let mut repaired: Vec<TreeRecord<T>> = records
        .into_iter()
        .filter(|r| seen.insert(r.id))
        .collect();

    let mut next_root = repaired
        .iter()
        .filter(|r| r.parent_id.is_none())
        .map(|r| r.position + 1)
        .max()
        .unwrap_or(0);

    for record in repaired.iter_mut() {
        if detach.contains(&record.id) {
            tracing::debug!("Promoting tree node {} to the root level", record.id);
            record.parent_id = None;
            record.position = next_root;
            next_root += 1;
        }
    }

    (repaired, report)
}
