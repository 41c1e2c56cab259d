//! Tree expansion below an account's entry points.
//!
//! Works over units already fetched for one organization; no I/O.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::model::BusinessUnit;

/// Expand entry points into the connected set of units below them.
///
/// `universe` is every unit of the organization. The result starts with the
/// entry points, rendered as roots (parent cleared) even if their real parent
/// lies outside the visible scope, followed by their descendants in
/// breadth-first order. Each key appears once, so duplicates in `universe`
/// or parent loops below an entry point cannot make the walk run forever.
pub fn build_tree(entry_points: &[BusinessUnit], universe: &[BusinessUnit]) -> Vec<BusinessUnit> {
    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, unit) in universe.iter().enumerate() {
        if let Some(parent) = unit.parent_key() {
            children.entry(parent).or_default().push(idx);
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut result: Vec<BusinessUnit> = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    for entry in entry_points {
        if !seen.insert(entry.key.as_str()) {
            continue;
        }
        let mut root = entry.clone();
        root.parent_unit = None;
        result.push(root);
        queue.push_back(entry.key.as_str());
    }

    while let Some(key) = queue.pop_front() {
        let Some(child_indexes) = children.get(key) else {
            continue;
        };
        for &idx in child_indexes {
            let child = &universe[idx];
            if seen.insert(child.key.as_str()) {
                result.push(child.clone());
                queue.push_back(child.key.as_str());
            }
        }
    }

    debug!(
        "built tree of {} units from {} entry points over {} candidates",
        result.len(),
        entry_points.len(),
        universe.len()
    );
    result
}
