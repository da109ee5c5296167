//! Repository Layer - Core Traits
//!
//! Abstract storage for workspace snapshots.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;

use super::record::StoredState;
use crate::domain::{DomainResult, WorkspaceKey};

/// Key/value store of one snapshot per workspace
///
/// All operations are async to support various backends.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Load the snapshot of a workspace, `None` if nothing was saved yet
    async fn get(&self, workspace: &WorkspaceKey) -> DomainResult<Option<StoredState>>;

    /// Replace the snapshot of a workspace
    async fn set(&self, workspace: &WorkspaceKey, state: &StoredState) -> DomainResult<()>;
}
