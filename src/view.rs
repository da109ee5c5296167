//! Tree View
//!
//! Flattens a workspace tree into display rows.

use serde::Serialize;

use crate::cascade::{group_counts, is_gated, GroupCounts};
use crate::domain::{ChildRef, GroupId, LeafKey};
use crate::store::TreeStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RowKind {
    Group {
        id: GroupId,
        title: String,
        enabled: bool,
        collapsed: bool,
        counts: GroupCounts,
    },
    Leaf {
        key: LeafKey,
        title: String,
        enabled: bool,
    },
}

/// One rendered line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRow {
    pub depth: usize,
    /// Dimmed because the node (or an ancestor) is switched off
    pub gated: bool,
    #[serde(flatten)]
    pub kind: RowKind,
}

/// Render the tree as indented rows using recursive DFS.
///
/// Groups come first in top-level order, then ungrouped leaves at depth 0.
/// Collapsed groups hide their children. A non-empty `filter` hides leaves
/// whose title does not contain it (case-insensitive); groups stay visible.
/// Leaves the last scan did not see are skipped.
pub fn flatten(store: &TreeStore, filter: &str) -> Vec<ViewRow> {
    let filter = filter.trim().to_lowercase();

    fn leaf_row(store: &TreeStore, key: &LeafKey, depth: usize, filter: &str) -> Option<ViewRow> {
        let leaf = store.leaf(key).filter(|l| l.present)?;
        if !filter.is_empty() && !leaf.title.to_lowercase().contains(filter) {
            return None;
        }
        Some(ViewRow {
            depth,
            gated: is_gated(store, &ChildRef::leaf(key.clone())),
            kind: RowKind::Leaf {
                key: key.clone(),
                title: leaf.title.clone(),
                enabled: leaf.enabled,
            },
        })
    }

    fn collect(
        store: &TreeStore,
        id: &GroupId,
        depth: usize,
        filter: &str,
        result: &mut Vec<ViewRow>,
    ) {
        let Some(group) = store.group(id) else {
            return;
        };
        result.push(ViewRow {
            depth,
            gated: is_gated(store, &ChildRef::group(id.clone())),
            kind: RowKind::Group {
                id: id.clone(),
                title: group.title.clone(),
                enabled: group.enabled,
                collapsed: group.collapsed,
                counts: group_counts(store, id),
            },
        });
        if group.collapsed {
            return;
        }
        for child in &group.children {
            match child {
                ChildRef::Group { id } => collect(store, id, depth + 1, filter, result),
                ChildRef::Leaf { key } => {
                    result.extend(leaf_row(store, key, depth + 1, filter));
                }
            }
        }
    }

    let mut result = Vec::new();
    for id in store.top_level() {
        collect(store, id, 0, &filter, &mut result);
    }
    for key in store.ungrouped() {
        result.extend(leaf_row(store, key, 0, &filter));
    }
    result
}
