//! Leaf Entity
//!
//! One item of the host surface, as observed by the last scan.

use serde::{Deserialize, Serialize};

use super::ids::LeafKey;

/// A host item placed somewhere in the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafItem {
    /// Stable key derived from the item's title
    pub key: LeafKey,
    /// Title as last seen on the host
    pub title: String,
    /// Own enabled flag (effective state also depends on ancestors)
    pub enabled: bool,
    /// False when the last scan did not see this item
    pub present: bool,
}

impl LeafItem {
    pub fn new(key: LeafKey, title: impl Into<String>, enabled: bool) -> Self {
        Self {
            key,
            title: title.into(),
            enabled,
            present: true,
        }
    }
}
