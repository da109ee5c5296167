//! Identifiers
//!
//! String newtypes for group ids, leaf keys and workspace keys, plus the
//! `ChildRef` used for containment.

use std::fmt;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

/// Prefix of the storage key a workspace's record is saved under.
const STORAGE_KEY_PREFIX: &str = "sources_plus_state_";

/// Path segment that precedes the workspace id in a host location.
const WORKSPACE_SEGMENT: &str = "notebook";

/// Unique id of a group, generated at creation time
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable, content-derived key of a leaf item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeafKey(String);

impl LeafKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeafKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the workspace (project) a tree belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceKey(String);

impl WorkspaceKey {
    /// Returns `None` for an empty or whitespace-only value.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Derive the workspace from a host location path such as
    /// `/notebook/<id>/...`. The segment is percent-decoded.
    pub fn from_location_path(path: &str) -> Option<Self> {
        let mut segments = path.split('/');
        segments.find(|segment| *segment == WORKSPACE_SEGMENT)?;
        let raw = segments.next()?;
        let decoded = percent_decode_str(raw).decode_utf8_lossy();
        Self::new(decoded.into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key the persisted record lives under in the storage backend
    pub fn storage_key(&self) -> String {
        format!("{}{}", STORAGE_KEY_PREFIX, self.0)
    }
}

impl fmt::Display for WorkspaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entry of a container: either a nested group or a leaf item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChildRef {
    Group { id: GroupId },
    Leaf { key: LeafKey },
}

impl ChildRef {
    pub fn group(id: GroupId) -> Self {
        ChildRef::Group { id }
    }

    pub fn leaf(key: LeafKey) -> Self {
        ChildRef::Leaf { key }
    }

    pub fn as_group(&self) -> Option<&GroupId> {
        match self {
            ChildRef::Group { id } => Some(id),
            ChildRef::Leaf { .. } => None,
        }
    }
}

impl fmt::Display for ChildRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildRef::Group { id } => write!(f, "group {}", id),
            ChildRef::Leaf { key } => write!(f, "leaf {}", key),
        }
    }
}
