//! Tree Store
//!
//! Canonical in-memory model of one workspace:
//! - groups and leaves in flat tables keyed by id/key (arena)
//! - containment: top-level group ids, group children, ungrouped leaf keys
//! - parent index derived from containment (see `index`)
//!
//! Invariant checking and repair of loaded data live in `invariants`.

mod index;
mod invariants;

use std::collections::{HashMap, HashSet};

use crate::domain::{ChildRef, Group, GroupId, LeafItem, LeafKey};

/// Authoritative tree of one workspace
#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    pub(crate) top_level: Vec<GroupId>,
    pub(crate) ungrouped: Vec<LeafKey>,
    pub(crate) groups: HashMap<GroupId, Group>,
    pub(crate) leaves: HashMap<LeafKey, LeafItem>,
    pub(crate) parent_index: HashMap<ChildRef, GroupId>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Lookups
    // ========================

    /// Top-level group ids in display order
    pub fn top_level(&self) -> &[GroupId] {
        &self.top_level
    }

    /// Leaf keys not contained in any group, in display order
    pub fn ungrouped(&self) -> &[LeafKey] {
        &self.ungrouped
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn group_mut(&mut self, id: &GroupId) -> Option<&mut Group> {
        self.groups.get_mut(id)
    }

    pub fn contains_group(&self, id: &GroupId) -> bool {
        self.groups.contains_key(id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn leaf(&self, key: &LeafKey) -> Option<&LeafItem> {
        self.leaves.get(key)
    }

    pub fn leaf_mut(&mut self, key: &LeafKey) -> Option<&mut LeafItem> {
        self.leaves.get_mut(key)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &LeafItem> {
        self.leaves.values()
    }

    /// Keys of every known leaf, sorted for a stable iteration order
    pub fn leaf_keys(&self) -> Vec<LeafKey> {
        let mut keys: Vec<LeafKey> = self.leaves.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Immediate containing group of a node (None for top-level groups
    /// and ungrouped leaves)
    pub fn parent_of(&self, node: &ChildRef) -> Option<&GroupId> {
        self.parent_index.get(node)
    }

    /// Whether the node sits in some container
    pub fn is_placed(&self, node: &ChildRef) -> bool {
        if self.parent_index.contains_key(node) {
            return true;
        }
        match node {
            ChildRef::Group { id } => self.top_level.contains(id),
            ChildRef::Leaf { key } => self.ungrouped.contains(key),
        }
    }

    // ========================
    // Observation
    // ========================

    /// Insert or refresh a leaf seen on the host.
    ///
    /// An existing leaf keeps its own flag and only has its title updated.
    /// A new leaf gets `enabled` and is appended to `ungrouped` unless the
    /// key is already placed (restored from storage). Returns true when the
    /// leaf was not known before.
    pub fn upsert_leaf(&mut self, key: LeafKey, title: impl Into<String>, enabled: bool) -> bool {
        if let Some(leaf) = self.leaves.get_mut(&key) {
            leaf.title = title.into();
            leaf.present = true;
            return false;
        }

        if !self.is_placed(&ChildRef::leaf(key.clone())) {
            self.ungrouped.push(key.clone());
        }
        self.leaves
            .insert(key.clone(), LeafItem::new(key, title, enabled));
        true
    }

    /// Flag every leaf missing from `seen` as not present. Returns how many
    /// leaves went missing.
    pub fn mark_absent_except(&mut self, seen: &HashSet<LeafKey>) -> usize {
        let mut missing = 0;
        for leaf in self.leaves.values_mut() {
            let present = seen.contains(&leaf.key);
            if leaf.present && !present {
                missing += 1;
            }
            leaf.present = present;
        }
        missing
    }

    // ========================
    // Structural primitives
    // ========================

    /// Allocate an id no group of this store uses: `group_<unix-millis>`,
    /// suffixed when that id is taken.
    pub fn allocate_group_id(&self) -> GroupId {
        let base = format!("group_{}", chrono::Utc::now().timestamp_millis());
        let candidate = GroupId::new(base.clone());
        if !self.groups.contains_key(&candidate) {
            return candidate;
        }
        let mut suffix = 1usize;
        loop {
            let candidate = GroupId::new(format!("{}_{}", base, suffix));
            if !self.groups.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Remove a node from wherever it sits, leaving its descendants alone.
    /// The parent index is stale afterwards; callers rebuild it.
    pub(crate) fn detach(&mut self, node: &ChildRef) -> bool {
        let mut removed = false;
        match node {
            ChildRef::Group { id } => {
                let before = self.top_level.len();
                self.top_level.retain(|g| g != id);
                removed |= self.top_level.len() != before;
                for group in self.groups.values_mut() {
                    removed |= group.remove_child(node);
                }
            }
            ChildRef::Leaf { key } => {
                let before = self.ungrouped.len();
                self.ungrouped.retain(|k| k != key);
                removed |= self.ungrouped.len() != before;
                while let Some(owner) = self.find_containing_group(key).cloned() {
                    match self.groups.get_mut(&owner) {
                        Some(group) => {
                            if group.remove_child(node) {
                                removed = true;
                            } else {
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        }
        removed
    }
}
