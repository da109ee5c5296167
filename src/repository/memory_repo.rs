//! In-Memory State Repository
//!
//! Keeps serialized snapshots in a map. Goes through the same JSON codec
//! as the SQLite backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::record::StoredState;
use super::traits::StateRepository;
use crate::domain::{DomainResult, WorkspaceKey};

#[derive(Default)]
pub struct MemoryStateRepository {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON stored under a storage key
    #[cfg(test)]
    pub(crate) async fn raw(&self, storage_key: &str) -> Option<String> {
        self.entries.lock().await.get(storage_key).cloned()
    }

    /// Store raw JSON under a storage key, bypassing the codec
    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, storage_key: impl Into<String>, json: impl Into<String>) {
        self.entries.lock().await.insert(storage_key.into(), json.into());
    }
}

#[async_trait]
impl StateRepository for MemoryStateRepository {
    async fn get(&self, workspace: &WorkspaceKey) -> DomainResult<Option<StoredState>> {
        let entries = self.entries.lock().await;
        entries
            .get(&workspace.storage_key())
            .map(|json| StoredState::from_json(json))
            .transpose()
    }

    async fn set(&self, workspace: &WorkspaceKey, state: &StoredState) -> DomainResult<()> {
        let json = state.to_json()?;
        self.entries.lock().await.insert(workspace.storage_key(), json);
        Ok(())
    }
}
