//! Cascade Engine
//!
//! Pure queries over a `TreeStore`: effective enablement of leaves, gating,
//! and per-group progress counts. Nothing here mutates.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{ChildRef, GroupId, LeafKey};
use crate::store::TreeStore;

/// `(effectively enabled, total)` over a group's present leaf descendants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GroupCounts {
    pub enabled: usize,
    pub total: usize,
}

/// A leaf whose effective state changed, with its new value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveFlip {
    pub key: LeafKey,
    pub enabled: bool,
}

/// True when every group above `node` exists and is enabled.
/// Top-level groups and ungrouped leaves have no ancestors.
pub fn ancestors_all_enabled(store: &TreeStore, node: &ChildRef) -> bool {
    let mut current = store.parent_of(node);
    let mut steps = 0;
    while let Some(parent_id) = current {
        steps += 1;
        if steps > store.group_count() {
            log::error!("parent index cycle above {}", node);
            return false;
        }
        match store.group(parent_id) {
            Some(group) if group.enabled => {}
            _ => return false,
        }
        current = store.parent_of(&ChildRef::group(parent_id.clone()));
    }
    true
}

/// Own flag AND every ancestor enabled. Unknown keys are never enabled.
pub fn is_effectively_enabled(store: &TreeStore, key: &LeafKey) -> bool {
    match store.leaf(key) {
        Some(leaf) => leaf.enabled && ancestors_all_enabled(store, &ChildRef::leaf(key.clone())),
        None => false,
    }
}

/// A leaf is gated when some ancestor disables it; a group also counts as
/// gated when its own flag is off.
pub fn is_gated(store: &TreeStore, node: &ChildRef) -> bool {
    let own_off = match node {
        ChildRef::Group { id } => store.group(id).map_or(true, |g| !g.enabled),
        ChildRef::Leaf { .. } => false,
    };
    own_off || !ancestors_all_enabled(store, node)
}

/// Leaf keys below a group, transitively, in display order. Sub-groups are
/// always descended into whatever their own flag.
pub fn descendant_leaf_keys(store: &TreeStore, group_id: &GroupId) -> Vec<LeafKey> {
    let mut keys = Vec::new();
    let mut visited = HashSet::new();
    collect_leaf_keys(store, group_id, &mut visited, &mut keys);
    keys
}

fn collect_leaf_keys<'a>(
    store: &'a TreeStore,
    group_id: &'a GroupId,
    visited: &mut HashSet<&'a GroupId>,
    keys: &mut Vec<LeafKey>,
) {
    if !visited.insert(group_id) {
        return;
    }
    let Some(group) = store.group(group_id) else {
        return;
    };
    for child in &group.children {
        match child {
            ChildRef::Leaf { key } => keys.push(key.clone()),
            ChildRef::Group { id } => collect_leaf_keys(store, id, visited, keys),
        }
    }
}

/// Progress badge for a group. Only leaves present on the host count.
pub fn group_counts(store: &TreeStore, group_id: &GroupId) -> GroupCounts {
    let mut counts = GroupCounts::default();
    for key in descendant_leaf_keys(store, group_id) {
        if !store.leaf(&key).is_some_and(|leaf| leaf.present) {
            continue;
        }
        counts.total += 1;
        if is_effectively_enabled(store, &key) {
            counts.enabled += 1;
        }
    }
    counts
}

/// Effective state of a set of leaves captured before a mutation
#[derive(Debug, Clone, Default)]
pub struct EffectiveSnapshot {
    states: Vec<(LeafKey, bool)>,
}

impl EffectiveSnapshot {
    pub fn capture<I>(store: &TreeStore, keys: I) -> Self
    where
        I: IntoIterator<Item = LeafKey>,
    {
        let states = keys
            .into_iter()
            .map(|key| {
                let enabled = is_effectively_enabled(store, &key);
                (key, enabled)
            })
            .collect();
        Self { states }
    }

    /// Leaves whose effective state differs in `store` from the snapshot
    pub fn flips(&self, store: &TreeStore) -> Vec<EffectiveFlip> {
        self.states
            .iter()
            .filter_map(|(key, before)| {
                let now = is_effectively_enabled(store, key);
                (now != *before).then(|| EffectiveFlip {
                    key: key.clone(),
                    enabled: now,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Group;

    /// g1 (top) > g2 > leaf l; g1 > leaf m; ungrouped u
    fn cascade_store() -> TreeStore {
        let mut store = TreeStore::new();
        for (key, title) in [("l", "L"), ("m", "M"), ("u", "U")] {
            store.upsert_leaf(LeafKey::new(key), title, true);
        }
        store.ungrouped.retain(|k| k.as_str() == "u");

        let mut g1 = Group::new(GroupId::new("g1"), "G1");
        let mut g2 = Group::new(GroupId::new("g2"), "G2");
        g1.children.push(ChildRef::group(GroupId::new("g2")));
        g1.children.push(ChildRef::leaf(LeafKey::new("m")));
        g2.children.push(ChildRef::leaf(LeafKey::new("l")));
        store.groups.insert(g1.id.clone(), g1);
        store.groups.insert(g2.id.clone(), g2);
        store.top_level.push(GroupId::new("g1"));
        store.rebuild_parent_index();
        store.check_invariants().unwrap();
        store
    }

    fn set_group(store: &mut TreeStore, id: &str, enabled: bool) {
        store.group_mut(&GroupId::new(id)).unwrap().enabled = enabled;
    }

    fn set_leaf(store: &mut TreeStore, key: &str, enabled: bool) {
        store.leaf_mut(&LeafKey::new(key)).unwrap().enabled = enabled;
    }

    #[test]
    fn test_cascade_is_and_of_chain() {
        let mut store = cascade_store();
        let l = LeafKey::new("l");
        assert!(is_effectively_enabled(&store, &l));

        for (kind, name) in [("leaf", "l"), ("group", "g1"), ("group", "g2")] {
            match kind {
                "leaf" => set_leaf(&mut store, name, false),
                _ => set_group(&mut store, name, false),
            }
            assert!(!is_effectively_enabled(&store, &l), "{} off gates l", name);
            match kind {
                "leaf" => set_leaf(&mut store, name, true),
                _ => set_group(&mut store, name, true),
            }
            assert!(is_effectively_enabled(&store, &l), "{} back on restores l", name);
        }
    }

    #[test]
    fn test_ungrouped_and_unknown() {
        let store = cascade_store();
        assert!(ancestors_all_enabled(&store, &ChildRef::leaf(LeafKey::new("u"))));
        assert!(is_effectively_enabled(&store, &LeafKey::new("u")));
        assert!(!is_effectively_enabled(&store, &LeafKey::new("nope")));
    }

    #[test]
    fn test_gating() {
        let mut store = cascade_store();
        set_group(&mut store, "g1", false);
        assert!(is_gated(&store, &ChildRef::leaf(LeafKey::new("l"))));
        assert!(is_gated(&store, &ChildRef::group(GroupId::new("g2"))));
        assert!(is_gated(&store, &ChildRef::group(GroupId::new("g1"))));
        assert!(!is_gated(&store, &ChildRef::leaf(LeafKey::new("u"))));
        // gated leaves keep their own flag
        assert!(store.leaf(&LeafKey::new("l")).unwrap().enabled);
    }

    #[test]
    fn test_group_counts_include_disabled_subgroups() {
        let mut store = cascade_store();
        let g1 = GroupId::new("g1");
        assert_eq!(group_counts(&store, &g1), GroupCounts { enabled: 2, total: 2 });

        set_group(&mut store, "g2", false);
        assert_eq!(group_counts(&store, &g1), GroupCounts { enabled: 1, total: 2 });
        assert_eq!(
            group_counts(&store, &GroupId::new("g2")),
            GroupCounts { enabled: 0, total: 1 }
        );
    }

    #[test]
    fn test_group_counts_skip_absent_leaves() {
        let mut store = cascade_store();
        store.leaf_mut(&LeafKey::new("m")).unwrap().present = false;
        assert_eq!(
            group_counts(&store, &GroupId::new("g1")),
            GroupCounts { enabled: 1, total: 1 }
        );
    }

    #[test]
    fn test_snapshot_flips() {
        let mut store = cascade_store();
        let keys = descendant_leaf_keys(&store, &GroupId::new("g1"));
        assert_eq!(keys, vec![LeafKey::new("l"), LeafKey::new("m")]);

        set_leaf(&mut store, "m", false);
        let snapshot = EffectiveSnapshot::capture(&store, keys);
        set_group(&mut store, "g1", false);

        let flips = snapshot.flips(&store);
        assert_eq!(
            flips,
            vec![EffectiveFlip {
                key: LeafKey::new("l"),
                enabled: false
            }]
        );
    }
}
