//! Enablement Operations
//!
//! Flag edits on leaves and groups. Each returns the leaves whose effective
//! state actually flipped, computed as a before/after diff, so callers push
//! only real changes to the host.

use crate::cascade::{
    ancestors_all_enabled, descendant_leaf_keys, EffectiveFlip, EffectiveSnapshot,
};
use crate::domain::{ChildRef, DomainError, DomainResult, GroupId, LeafKey};
use crate::store::TreeStore;

/// Trait for enabled/collapsed flag operations
pub trait EnablementOperations {
    /// Set a leaf's own flag. Returns no flip while an ancestor gates it.
    fn set_leaf_enabled(&mut self, key: &LeafKey, enabled: bool) -> DomainResult<Vec<EffectiveFlip>>;

    /// Set a group's own flag; diff over its descendant leaves.
    fn set_group_enabled(&mut self, id: &GroupId, enabled: bool) -> DomainResult<Vec<EffectiveFlip>>;

    /// Enable exactly `id` and disable every other group; diff over all
    /// leaves of the workspace.
    fn isolate_group(&mut self, id: &GroupId) -> DomainResult<Vec<EffectiveFlip>>;

    /// Flip the display-only collapsed flag, returning the new value.
    fn toggle_collapsed(&mut self, id: &GroupId) -> DomainResult<bool>;
}

impl EnablementOperations for TreeStore {
    fn set_leaf_enabled(&mut self, key: &LeafKey, enabled: bool) -> DomainResult<Vec<EffectiveFlip>> {
        let leaf = self
            .leaf_mut(key)
            .ok_or_else(|| DomainError::NotFound(format!("leaf {}", key)))?;
        if leaf.enabled == enabled {
            return Ok(Vec::new());
        }
        leaf.enabled = enabled;

        if ancestors_all_enabled(self, &ChildRef::leaf(key.clone())) {
            Ok(vec![EffectiveFlip {
                key: key.clone(),
                enabled,
            }])
        } else {
            Ok(Vec::new())
        }
    }

    fn set_group_enabled(&mut self, id: &GroupId, enabled: bool) -> DomainResult<Vec<EffectiveFlip>> {
        if !self.contains_group(id) {
            return Err(DomainError::NotFound(format!("group {}", id)));
        }
        let snapshot = EffectiveSnapshot::capture(self, descendant_leaf_keys(self, id));
        if let Some(group) = self.group_mut(id) {
            group.enabled = enabled;
        }
        Ok(snapshot.flips(self))
    }

    fn isolate_group(&mut self, id: &GroupId) -> DomainResult<Vec<EffectiveFlip>> {
        if !self.contains_group(id) {
            return Err(DomainError::NotFound(format!("group {}", id)));
        }
        let snapshot = EffectiveSnapshot::capture(self, self.leaf_keys());
        for group in self.groups.values_mut() {
            group.enabled = group.id == *id;
        }
        Ok(snapshot.flips(self))
    }

    fn toggle_collapsed(&mut self, id: &GroupId) -> DomainResult<bool> {
        let group = self
            .group_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("group {}", id)))?;
        group.collapsed = !group.collapsed;
        Ok(group.collapsed)
    }
}
