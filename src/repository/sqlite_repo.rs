//! SQLite State Repository
//!
//! Stores each workspace snapshot as a JSON document keyed by its storage
//! key.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use super::db::SharedConnection;
use super::record::StoredState;
use super::traits::StateRepository;
use crate::domain::{DomainError, DomainResult, WorkspaceKey};

pub struct SqliteStateRepository {
    conn: SharedConnection,
}

impl SqliteStateRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl StateRepository for SqliteStateRepository {
    async fn get(&self, workspace: &WorkspaceKey) -> DomainResult<Option<StoredState>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let json: Option<String> = conn
            .query_row(
                "SELECT state_json FROM workspace_state WHERE storage_key = ?",
                params![workspace.storage_key()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        json.map(|j| StoredState::from_json(&j)).transpose()
    }

    async fn set(&self, workspace: &WorkspaceKey, state: &StoredState) -> DomainResult<()> {
        let json = state.to_json()?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(DomainError::Internal("Database not initialized".to_string()))?;

        let now = chrono::Local::now().timestamp_millis();
        conn.execute(
            "INSERT INTO workspace_state (storage_key, state_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(storage_key) DO UPDATE SET state_json = excluded.state_json, updated_at = excluded.updated_at",
            params![workspace.storage_key(), json, now],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        log::debug!("Saved state for workspace {}", workspace);
        Ok(())
    }
}
