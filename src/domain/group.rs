//! Group Entity
//!
//! A named folder over leaf items and other groups. Children are held as
//! references into the store's flat tables, never as owned subtrees.

use serde::{Deserialize, Serialize};

use super::ids::{ChildRef, GroupId};

/// Title given to a top-level group created without one
pub const DEFAULT_GROUP_TITLE: &str = "New Group";

/// Title given to a nested group created without one
pub const DEFAULT_SUBGROUP_TITLE: &str = "New Subgroup";

/// A group of leaves and sub-groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier
    pub id: GroupId,
    /// Display title
    pub title: String,
    /// Contained nodes in display order
    pub children: Vec<ChildRef>,
    /// Own enabled flag (gates every descendant)
    pub enabled: bool,
    /// Whether children are hidden in the UI
    pub collapsed: bool,
}

impl Group {
    /// Create an empty, enabled, expanded group
    pub fn new(id: GroupId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            children: Vec::new(),
            enabled: true,
            collapsed: false,
        }
    }

    pub fn contains(&self, child: &ChildRef) -> bool {
        self.children.iter().any(|c| c == child)
    }

    /// Remove every occurrence of `child`; returns true if one was removed
    pub fn remove_child(&mut self, child: &ChildRef) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c != child);
        self.children.len() != before
    }

    /// Iterate over the ids of direct sub-groups
    pub fn child_groups(&self) -> impl DoubleEndedIterator<Item = &GroupId> {
        self.children.iter().filter_map(ChildRef::as_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LeafKey;

    #[test]
    fn test_group_creation() {
        let group = Group::new(GroupId::new("group_1"), "Research");
        assert_eq!(group.id.as_str(), "group_1");
        assert!(group.enabled);
        assert!(!group.collapsed);
        assert!(group.children.is_empty());
    }

    #[test]
    fn test_remove_child() {
        let mut group = Group::new(GroupId::new("group_1"), "Research");
        let leaf = ChildRef::leaf(LeafKey::new("source_a"));
        group.children.push(leaf.clone());
        group.children.push(ChildRef::group(GroupId::new("group_2")));

        assert!(group.contains(&leaf));
        assert!(group.remove_child(&leaf));
        assert!(!group.remove_child(&leaf));
        assert_eq!(group.child_groups().count(), 1);
    }
}
