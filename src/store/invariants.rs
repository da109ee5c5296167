//! Structural Invariants
//!
//! `check_invariants` verifies the containment forest; `from_parts` builds a
//! store from loaded containment lists and repairs whatever would break it.

use std::collections::{HashMap, HashSet, VecDeque};

use super::TreeStore;
use crate::domain::{ChildRef, DomainError, DomainResult, Group, GroupId, LeafKey};

impl TreeStore {
    /// Verify that containment is a forest in which every group and every
    /// known leaf sits in exactly one container, every group reference
    /// resolves, and the parent index matches containment.
    pub fn check_invariants(&self) -> DomainResult<()> {
        let mut group_seen: HashMap<&GroupId, usize> = HashMap::new();
        let mut leaf_seen: HashMap<&LeafKey, usize> = HashMap::new();

        for id in &self.top_level {
            if !self.groups.contains_key(id) {
                return Err(DomainError::Internal(format!(
                    "top-level group {} does not exist",
                    id
                )));
            }
            *group_seen.entry(id).or_default() += 1;
        }
        for key in &self.ungrouped {
            *leaf_seen.entry(key).or_default() += 1;
        }
        for group in self.groups.values() {
            for child in &group.children {
                match child {
                    ChildRef::Group { id } => {
                        if !self.groups.contains_key(id) {
                            return Err(DomainError::Internal(format!(
                                "group {} references missing group {}",
                                group.id, id
                            )));
                        }
                        *group_seen.entry(id).or_default() += 1;
                    }
                    ChildRef::Leaf { key } => {
                        *leaf_seen.entry(key).or_default() += 1;
                    }
                }
            }
        }

        for id in self.groups.keys() {
            let count = group_seen.get(id).copied().unwrap_or(0);
            if count != 1 {
                return Err(DomainError::Internal(format!(
                    "group {} appears in {} containers",
                    id, count
                )));
            }
        }
        for (key, count) in &leaf_seen {
            if *count > 1 {
                return Err(DomainError::Internal(format!(
                    "leaf {} appears in {} containers",
                    key, count
                )));
            }
        }
        for key in self.leaves.keys() {
            if !leaf_seen.contains_key(key) {
                return Err(DomainError::Internal(format!("leaf {} is not placed", key)));
            }
        }

        let mut expected: HashMap<ChildRef, GroupId> = HashMap::new();
        for group in self.groups.values() {
            for child in &group.children {
                expected.insert(child.clone(), group.id.clone());
            }
        }
        if expected != self.parent_index {
            return Err(DomainError::Internal("parent index is stale".to_string()));
        }

        for id in self.groups.keys() {
            let mut steps = 0;
            let mut current = self.parent_of(&ChildRef::group(id.clone()));
            while let Some(parent) = current {
                steps += 1;
                if steps > self.groups.len() {
                    return Err(DomainError::Internal(format!(
                        "group {} is part of a cycle",
                        id
                    )));
                }
                current = self.parent_of(&ChildRef::group(parent.clone()));
            }
        }

        Ok(())
    }

    /// Build a store from loaded containment, dropping dangling and
    /// duplicate references and promoting unreachable groups to top level.
    /// Returns the store and the number of repairs made.
    pub(crate) fn from_parts(
        top_level: Vec<GroupId>,
        ungrouped: Vec<LeafKey>,
        groups: HashMap<GroupId, Group>,
    ) -> (Self, usize) {
        let mut store = TreeStore {
            groups,
            ..Default::default()
        };
        let mut repairs = 0;
        let mut placed_groups: HashSet<GroupId> = HashSet::new();
        let mut placed_leaves: HashSet<LeafKey> = HashSet::new();
        let mut queue: VecDeque<GroupId> = VecDeque::new();

        for id in top_level {
            if store.groups.contains_key(&id) && placed_groups.insert(id.clone()) {
                store.top_level.push(id.clone());
                queue.push_back(id);
            } else {
                repairs += 1;
            }
        }

        loop {
            while let Some(id) = queue.pop_front() {
                let children = match store.groups.get_mut(&id) {
                    Some(group) => std::mem::take(&mut group.children),
                    None => continue,
                };
                let mut kept = Vec::with_capacity(children.len());
                for child in children {
                    let keep = match &child {
                        ChildRef::Group { id: child_id } => {
                            let ok = store.groups.contains_key(child_id)
                                && placed_groups.insert(child_id.clone());
                            if ok {
                                queue.push_back(child_id.clone());
                            }
                            ok
                        }
                        ChildRef::Leaf { key } => placed_leaves.insert(key.clone()),
                    };
                    if keep {
                        kept.push(child);
                    } else {
                        repairs += 1;
                    }
                }
                if let Some(group) = store.groups.get_mut(&id) {
                    group.children = kept;
                }
            }

            // a group nobody reached (missing from top level, or caught in
            // a cycle) becomes top-level; its subtree is walked next round
            let mut orphans: Vec<&GroupId> = store
                .groups
                .keys()
                .filter(|id| !placed_groups.contains(*id))
                .collect();
            orphans.sort();
            let Some(orphan) = orphans.first().map(|id| (*id).clone()) else {
                break;
            };
            placed_groups.insert(orphan.clone());
            store.top_level.push(orphan.clone());
            queue.push_back(orphan);
            repairs += 1;
        }

        for key in ungrouped {
            if placed_leaves.insert(key.clone()) {
                store.ungrouped.push(key);
            } else {
                repairs += 1;
            }
        }

        store.rebuild_parent_index();
        (store, repairs)
    }
}
