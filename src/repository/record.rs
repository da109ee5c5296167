//! Persisted Record
//!
//! JSON shape of one workspace's tree as written to the storage backend.
//! Field names are camelCase; missing fields fall back to defaults so older
//! or partial records still load.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::{ChildRef, DomainError, DomainResult, Group, GroupId, LeafKey};
use crate::store::TreeStore;

/// Current record layout version
pub const STATE_VERSION: u32 = 1;

/// Remembered own flags by leaf key, including leaves not on the host
pub type EnabledMap = BTreeMap<LeafKey, bool>;

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    STATE_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGroup {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub children: Vec<ChildRef>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub collapsed: bool,
}

/// Snapshot of a workspace tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    #[serde(default)]
    pub top_level_group_ids: Vec<GroupId>,
    #[serde(default)]
    pub ungrouped_leaf_keys: Vec<LeafKey>,
    #[serde(default)]
    pub groups: BTreeMap<GroupId, StoredGroup>,
    #[serde(default)]
    pub enabled_by_leaf_key: EnabledMap,
    #[serde(default = "default_version")]
    pub version: u32,
}

impl Default for StoredState {
    fn default() -> Self {
        Self {
            top_level_group_ids: Vec::new(),
            ungrouped_leaf_keys: Vec::new(),
            groups: BTreeMap::new(),
            enabled_by_leaf_key: EnabledMap::new(),
            version: STATE_VERSION,
        }
    }
}

impl StoredState {
    /// Snapshot `store`. Flags in `remembered` are kept for leaves the
    /// store does not know; the store's own flags win otherwise.
    pub fn capture(store: &TreeStore, remembered: &EnabledMap) -> Self {
        let groups = store
            .groups()
            .map(|g| {
                (
                    g.id.clone(),
                    StoredGroup {
                        title: g.title.clone(),
                        children: g.children.clone(),
                        enabled: g.enabled,
                        collapsed: g.collapsed,
                    },
                )
            })
            .collect();

        let mut enabled_by_leaf_key = remembered.clone();
        for leaf in store.leaves() {
            enabled_by_leaf_key.insert(leaf.key.clone(), leaf.enabled);
        }

        Self {
            top_level_group_ids: store.top_level().to_vec(),
            ungrouped_leaf_keys: store.ungrouped().to_vec(),
            groups,
            enabled_by_leaf_key,
            version: STATE_VERSION,
        }
    }

    /// Rebuild the containment of a store. Leaves are filled in by the
    /// next scan; their remembered flags are returned alongside.
    pub fn restore(self) -> (TreeStore, EnabledMap) {
        let groups: HashMap<GroupId, Group> = self
            .groups
            .into_iter()
            .map(|(id, stored)| {
                let group = Group {
                    id: id.clone(),
                    title: stored.title,
                    children: stored.children,
                    enabled: stored.enabled,
                    collapsed: stored.collapsed,
                };
                (id, group)
            })
            .collect();

        let (store, repairs) =
            TreeStore::from_parts(self.top_level_group_ids, self.ungrouped_leaf_keys, groups);
        if repairs > 0 {
            log::warn!("Repaired {} broken references in stored state", repairs);
        }
        (store, self.enabled_by_leaf_key)
    }

    pub fn to_json(&self) -> DomainResult<String> {
        serde_json::to_string(self).map_err(|e| DomainError::Internal(e.to_string()))
    }

    pub fn from_json(json: &str) -> DomainResult<Self> {
        serde_json::from_str(json).map_err(|e| DomainError::InvalidInput(e.to_string()))
    }
}
