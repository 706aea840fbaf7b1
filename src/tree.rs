use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::{debug, warn};
use procstat::{Pid, ProcessRecord};

use crate::Snapshot;

/// A resolved [`Snapshot`]: every record knows the position of its parent
/// and every position knows its children.
///
/// All relationships are positions into the one record vector the tree owns.
#[derive(Debug, Clone, Default)]
pub struct ProcessTree {
    records: Vec<ProcessRecord>,
    /// Children of each position, in discovery order
    children: Vec<Vec<usize>>,
    /// Records without a resolvable parent, in discovery order
    roots: Vec<usize>,
    positions: HashMap<Pid, usize>,
}

impl Snapshot {
    /// Link every record to its parent.
    ///
    /// A record is a root when its parent pid is `0`, when no record carries
    /// its parent pid (an orphan), or when it names itself as parent. Should
    /// two records share a pid, the first one listed is the one children
    /// attach to.
    pub fn resolve(self) -> ProcessTree {
        let mut records = self.records;

        let mut positions = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match positions.entry(record.id) {
                Entry::Vacant(entry) => {
                    entry.insert(index);
                }
                Entry::Occupied(entry) => warn!(
                    "Pid {} is listed at positions {} and {index}, keeping the first",
                    record.id,
                    entry.get()
                ),
            }
        }

        let mut children = vec![Vec::new(); records.len()];
        let mut roots = Vec::new();
        for (index, record) in records.iter_mut().enumerate() {
            record.parent_index = parent_position(record, index, &positions);
            match record.parent_index {
                Some(parent) => children[parent].push(index),
                None => roots.push(index),
            }
        }

        debug!(
            "Resolved {} processes into {} root(s)",
            records.len(),
            roots.len()
        );

        ProcessTree {
            records,
            children,
            roots,
            positions,
        }
    }
}

fn parent_position(
    record: &ProcessRecord,
    index: usize,
    positions: &HashMap<Pid, usize>,
) -> Option<usize> {
    if record.has_root_parent() {
        return None;
    }

    match positions.get(&record.parent_id) {
        Some(&parent) if parent == index => {
            warn!("Process {} names itself as its parent", record.id);
            None
        }
        Some(&parent) => Some(parent),
        None => {
            debug!(
                "Parent {} of process {} is not running, treating it as a root",
                record.parent_id, record.id
            );
            None
        }
    }
}

impl ProcessTree {
    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&ProcessRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn children(&self, index: usize) -> &[usize] {
        self.children
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn position_of(&self, pid: Pid) -> Option<usize> {
        self.positions.get(&pid).copied()
    }

    /// Positions that no root leads to. Only records caught in a parent cycle
    /// end up here.
    pub fn detached(&self) -> Vec<usize> {
        let mut reachable = vec![false; self.records.len()];
        let mut stack = self.roots.clone();
        while let Some(index) = stack.pop() {
            if std::mem::replace(&mut reachable[index], true) {
                continue;
            }
            stack.extend_from_slice(&self.children[index]);
        }

        reachable
            .iter()
            .enumerate()
            .filter(|(_, reachable)| !**reachable)
            .map(|(index, _)| index)
            .collect()
    }
}
