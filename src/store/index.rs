//! Parent Index and Tree Walks
//!
//! The parent index is a cache over containment. It is always rebuilt in
//! full, never patched.

use std::collections::HashSet;

use super::TreeStore;
use crate::domain::{ChildRef, GroupId, LeafKey};

impl TreeStore {
    /// Clear and repopulate the parent index from every group's children.
    /// Must run after any change to children, top-level or ungrouped.
    pub fn rebuild_parent_index(&mut self) {
        self.parent_index.clear();
        for group in self.groups.values() {
            for child in &group.children {
                self.parent_index.insert(child.clone(), group.id.clone());
            }
        }
    }

    /// Linear scan for the group whose children hold `key`
    pub fn find_containing_group(&self, key: &LeafKey) -> Option<&GroupId> {
        let needle = ChildRef::leaf(key.clone());
        self.groups
            .values()
            .find(|group| group.contains(&needle))
            .map(|group| &group.id)
    }

    /// Whether `target` is `root` itself or any group below it
    pub fn subtree_contains_group(&self, root: &GroupId, target: &GroupId) -> bool {
        if root == target {
            return true;
        }
        let mut visited = HashSet::new();
        let mut to_visit = vec![root];
        while let Some(current) = to_visit.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(group) = self.groups.get(current) else {
                continue;
            };
            for child in group.child_groups() {
                if child == target {
                    return true;
                }
                to_visit.push(child);
            }
        }
        false
    }
}
