//! Hierarchy Operations
//!
//! Structural edits: create, rename, delete and reparent groups and leaves.
//! An `Err` leaves the store exactly as it was.

use crate::cascade::{descendant_leaf_keys, EffectiveFlip, EffectiveSnapshot};
use crate::domain::{
    ChildRef, DomainError, DomainResult, Group, GroupId, DEFAULT_GROUP_TITLE,
    DEFAULT_SUBGROUP_TITLE,
};
use crate::store::TreeStore;

/// Trait for structural tree operations
pub trait HierarchyOperations {
    /// Create an enabled, expanded group under `parent` (top level when
    /// `None`). A blank title falls back to the default one.
    fn create_group(&mut self, parent: Option<&GroupId>, title: Option<&str>) -> DomainResult<GroupId>;

    /// Replace a group's title. Blank titles are rejected.
    fn rename_group(&mut self, id: &GroupId, title: &str) -> DomainResult<()>;

    /// Remove a group, promoting its children into the container it sat in.
    fn delete_group(&mut self, id: &GroupId) -> DomainResult<Vec<EffectiveFlip>>;

    /// Move a node to the end of `target`'s children.
    fn reparent(&mut self, node: &ChildRef, target: &GroupId) -> DomainResult<Vec<EffectiveFlip>>;
}

impl TreeStore {
    /// Leaves whose effective state may change when `node` moves
    fn leaves_under(&self, node: &ChildRef) -> Vec<crate::domain::LeafKey> {
        match node {
            ChildRef::Leaf { key } => vec![key.clone()],
            ChildRef::Group { id } => descendant_leaf_keys(self, id),
        }
    }
}

impl HierarchyOperations for TreeStore {
    fn create_group(&mut self, parent: Option<&GroupId>, title: Option<&str>) -> DomainResult<GroupId> {
        if let Some(parent_id) = parent {
            if !self.contains_group(parent_id) {
                return Err(DomainError::NotFound(format!("group {}", parent_id)));
            }
        }

        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ if parent.is_some() => DEFAULT_SUBGROUP_TITLE.to_string(),
            _ => DEFAULT_GROUP_TITLE.to_string(),
        };

        let id = self.allocate_group_id();
        self.groups.insert(id.clone(), Group::new(id.clone(), title));
        match parent.and_then(|p| self.groups.get_mut(p)) {
            Some(parent_group) => parent_group.children.push(ChildRef::group(id.clone())),
            None => self.top_level.push(id.clone()),
        }

        self.rebuild_parent_index();
        Ok(id)
    }

    fn rename_group(&mut self, id: &GroupId, title: &str) -> DomainResult<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::InvalidInput("group title must not be blank".to_string()));
        }
        let group = self
            .group_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("group {}", id)))?;
        group.title = title.to_string();
        Ok(())
    }

    fn delete_group(&mut self, id: &GroupId) -> DomainResult<Vec<EffectiveFlip>> {
        if !self.contains_group(id) {
            return Err(DomainError::NotFound(format!("group {}", id)));
        }
        let snapshot = EffectiveSnapshot::capture(self, descendant_leaf_keys(self, id));
        let node = ChildRef::group(id.clone());
        let parent = self.parent_of(&node).cloned();

        let Some(removed) = self.groups.remove(id) else {
            return Err(DomainError::NotFound(format!("group {}", id)));
        };

        match parent.as_ref().and_then(|p| self.groups.get_mut(p)) {
            Some(parent_group) => {
                let at = parent_group
                    .children
                    .iter()
                    .position(|c| *c == node)
                    .unwrap_or(parent_group.children.len());
                parent_group.children.retain(|c| *c != node);
                parent_group.children.splice(at..at, removed.children);
            }
            None => {
                let at = self
                    .top_level
                    .iter()
                    .position(|g| g == id)
                    .unwrap_or(self.top_level.len());
                self.top_level.retain(|g| g != id);
                let mut promoted_groups = Vec::new();
                for child in removed.children {
                    match child {
                        ChildRef::Group { id } => promoted_groups.push(id),
                        ChildRef::Leaf { key } => self.ungrouped.push(key),
                    }
                }
                self.top_level.splice(at..at, promoted_groups);
            }
        }

        self.rebuild_parent_index();
        Ok(snapshot.flips(self))
    }

    fn reparent(&mut self, node: &ChildRef, target: &GroupId) -> DomainResult<Vec<EffectiveFlip>> {
        if !self.contains_group(target) {
            return Err(DomainError::NotFound(format!("group {}", target)));
        }
        match node {
            ChildRef::Group { id } => {
                if !self.contains_group(id) {
                    return Err(DomainError::NotFound(format!("group {}", id)));
                }
                if self.subtree_contains_group(id, target) {
                    return Err(DomainError::Conflict(format!(
                        "group {} cannot move into its own subtree ({})",
                        id, target
                    )));
                }
            }
            ChildRef::Leaf { key } => {
                if !self.is_placed(node) && self.leaf(key).is_none() {
                    return Err(DomainError::NotFound(format!("leaf {}", key)));
                }
            }
        }

        let snapshot = EffectiveSnapshot::capture(self, self.leaves_under(node));
        self.detach(node);
        if let Some(target_group) = self.groups.get_mut(target) {
            target_group.children.push(node.clone());
        }
        self.rebuild_parent_index();
        Ok(snapshot.flips(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LeafKey;

    fn store_with_leaves(keys: &[&str]) -> TreeStore {
        let mut store = TreeStore::new();
        for key in keys {
            store.upsert_leaf(LeafKey::new(*key), key.to_uppercase(), true);
        }
        store
    }

    #[test]
    fn test_create_group_defaults() {
        let mut store = TreeStore::new();
        let top = store.create_group(None, None).unwrap();
        let sub = store.create_group(Some(&top), Some("  ")).unwrap();

        assert_eq!(store.group(&top).unwrap().title, DEFAULT_GROUP_TITLE);
        assert_eq!(store.group(&sub).unwrap().title, DEFAULT_SUBGROUP_TITLE);
        assert_eq!(store.top_level(), &[top.clone()]);
        assert_eq!(store.parent_of(&ChildRef::group(sub.clone())), Some(&top));
        let group = store.group(&sub).unwrap();
        assert!(group.enabled && !group.collapsed);
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_create_group_unknown_parent_is_noop() {
        let mut store = TreeStore::new();
        let err = store
            .create_group(Some(&GroupId::new("missing")), Some("X"))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(store.group_count(), 0);
    }

    #[test]
    fn test_rename_rejects_blank() {
        let mut store = TreeStore::new();
        let id = store.create_group(None, Some("Papers")).unwrap();

        assert!(store.rename_group(&id, "   ").is_err());
        assert_eq!(store.group(&id).unwrap().title, "Papers");

        store.rename_group(&id, "  Reading list ").unwrap();
        assert_eq!(store.group(&id).unwrap().title, "Reading list");
    }

    #[test]
    fn test_reparent_leaf_out_of_ungrouped() {
        let mut store = store_with_leaves(&["a", "b"]);
        let g = store.create_group(None, Some("G")).unwrap();

        let flips = store.reparent(&ChildRef::leaf(LeafKey::new("a")), &g).unwrap();
        assert!(flips.is_empty());
        assert_eq!(store.ungrouped(), &[LeafKey::new("b")]);
        assert_eq!(store.parent_of(&ChildRef::leaf(LeafKey::new("a"))), Some(&g));
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_reparent_into_disabled_group_reports_flip() {
        let mut store = store_with_leaves(&["a"]);
        let g = store.create_group(None, Some("G")).unwrap();
        store.group_mut(&g).unwrap().enabled = false;

        let flips = store.reparent(&ChildRef::leaf(LeafKey::new("a")), &g).unwrap();
        assert_eq!(
            flips,
            vec![EffectiveFlip {
                key: LeafKey::new("a"),
                enabled: false
            }]
        );
    }

    #[test]
    fn test_reparent_rejects_cycles() {
        let mut store = TreeStore::new();
        let g1 = store.create_group(None, Some("G1")).unwrap();
        let g2 = store.create_group(Some(&g1), Some("G2")).unwrap();
        let before_top = store.top_level().to_vec();
        let before_children = store.group(&g2).unwrap().children.clone();

        for target in [&g2, &g1] {
            let err = store.reparent(&ChildRef::group(g1.clone()), target).unwrap_err();
            assert!(matches!(err, DomainError::Conflict(_)));
        }
        assert_eq!(store.top_level(), before_top.as_slice());
        assert_eq!(store.group(&g2).unwrap().children, before_children);
        assert_eq!(store.parent_of(&ChildRef::group(g2.clone())), Some(&g1));
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_reparent_group_between_parents() {
        let mut store = TreeStore::new();
        let g1 = store.create_group(None, Some("G1")).unwrap();
        let g2 = store.create_group(None, Some("G2")).unwrap();
        let g3 = store.create_group(Some(&g1), Some("G3")).unwrap();

        store.reparent(&ChildRef::group(g3.clone()), &g2).unwrap();
        assert!(store.group(&g1).unwrap().children.is_empty());
        assert_eq!(store.parent_of(&ChildRef::group(g3.clone())), Some(&g2));

        // top-level group moves under a sibling
        store.reparent(&ChildRef::group(g1.clone()), &g2).unwrap();
        assert_eq!(store.top_level(), &[g2.clone()]);
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_reparent_unknown_nodes() {
        let mut store = TreeStore::new();
        let g = store.create_group(None, Some("G")).unwrap();
        assert!(store.reparent(&ChildRef::leaf(LeafKey::new("x")), &g).is_err());
        assert!(store
            .reparent(&ChildRef::group(GroupId::new("x")), &g)
            .is_err());
        assert!(store
            .reparent(&ChildRef::group(g.clone()), &GroupId::new("x"))
            .is_err());
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_nested_group_promotes_children_in_place() {
        let mut store = store_with_leaves(&["a", "b"]);
        let top = store.create_group(None, Some("Top")).unwrap();
        let mid = store.create_group(Some(&top), Some("Mid")).unwrap();
        let inner = store.create_group(Some(&mid), Some("Inner")).unwrap();
        store.reparent(&ChildRef::leaf(LeafKey::new("a")), &mid).unwrap();
        store.reparent(&ChildRef::leaf(LeafKey::new("b")), &top).unwrap();

        store.delete_group(&mid).unwrap();
        assert!(!store.contains_group(&mid));
        assert_eq!(
            store.group(&top).unwrap().children,
            vec![
                ChildRef::group(inner.clone()),
                ChildRef::leaf(LeafKey::new("a")),
                ChildRef::leaf(LeafKey::new("b")),
            ]
        );
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_top_level_group() {
        let mut store = store_with_leaves(&["a"]);
        let first = store.create_group(None, Some("First")).unwrap();
        let doomed = store.create_group(None, Some("Doomed")).unwrap();
        let last = store.create_group(None, Some("Last")).unwrap();
        let child = store.create_group(Some(&doomed), Some("Child")).unwrap();
        store.reparent(&ChildRef::leaf(LeafKey::new("a")), &doomed).unwrap();
        store.group_mut(&doomed).unwrap().enabled = false;

        let flips = store.delete_group(&doomed).unwrap();
        assert_eq!(store.top_level(), &[first, child, last]);
        assert_eq!(store.ungrouped(), &[LeafKey::new("a")]);
        assert_eq!(
            flips,
            vec![EffectiveFlip {
                key: LeafKey::new("a"),
                enabled: true
            }]
        );
        store.check_invariants().unwrap();
    }
}
