//! Workspace Session
//!
//! One open workspace: its tree, sync state, remembered flags and display
//! filter, bound to the repository it persists into. Every user-facing
//! edit goes through here. Rejected edits are logged and leave nothing
//! changed; the caller only sees `false` / `None`.

use std::collections::HashSet;
use std::sync::Arc;

use crate::cascade::EffectiveFlip;
use crate::domain::{ChildRef, DomainResult, GroupId, LeafKey, WorkspaceKey};
use crate::mutation::{EnablementOperations, HierarchyOperations};
use crate::repository::{EnabledMap, StateRepository, StoredState};
use crate::store::TreeStore;
use crate::sync::{ChangeGate, PushReport, SourceRegistry, Synchronizer, ToggleSink};
use crate::view::{flatten, ViewRow};

/// Summary of one rescan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescanReport {
    pub seen: usize,
    pub added: usize,
    pub missing: usize,
    pub push: PushReport,
}

pub struct WorkspaceSession {
    workspace: Option<WorkspaceKey>,
    store: TreeStore,
    sync: Synchronizer,
    remembered: EnabledMap,
    filter: String,
    dirty: bool,
    repo: Arc<dyn StateRepository>,
}

impl WorkspaceSession {
    /// Open a workspace, restoring its last snapshot. Without a workspace
    /// the session starts empty and never persists.
    pub async fn open(repo: Arc<dyn StateRepository>, workspace: Option<WorkspaceKey>) -> Self {
        let (store, remembered) = match &workspace {
            Some(ws) => match repo.get(ws).await {
                Ok(Some(state)) => {
                    log::info!("Restored state for workspace {}", ws);
                    state.restore()
                }
                Ok(None) => {
                    log::info!("No saved state for workspace {}", ws);
                    (TreeStore::new(), EnabledMap::new())
                }
                Err(e) => {
                    log::warn!("Failed to load state for workspace {}: {}", ws, e);
                    (TreeStore::new(), EnabledMap::new())
                }
            },
            None => {
                log::info!("No workspace in location; persistence disabled");
                (TreeStore::new(), EnabledMap::new())
            }
        };

        Self {
            workspace,
            store,
            sync: Synchronizer::new(),
            remembered,
            filter: String::new(),
            dirty: false,
            repo,
        }
    }

    pub fn workspace(&self) -> Option<&WorkspaceKey> {
        self.workspace.as_ref()
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.sync
    }

    /// Gate for the host adapter's change events
    pub fn gate(&self) -> ChangeGate {
        self.sync.gate()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Display rows under the current filter
    pub fn view(&self) -> Vec<ViewRow> {
        flatten(&self.store, &self.filter)
    }

    // ========================
    // Persistence
    // ========================

    pub fn snapshot(&self) -> StoredState {
        StoredState::capture(&self.store, &self.remembered)
    }

    /// Write the snapshot if anything changed since the last flush. Storage
    /// failures are logged and not retried.
    pub async fn flush(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;

        let Some(ws) = &self.workspace else {
            return false;
        };
        match self.repo.set(ws, &self.snapshot()).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to save state for workspace {}: {}", ws, e);
                false
            }
        }
    }

    // ========================
    // Host synchronization
    // ========================

    /// Re-read the host's items. New leaves land in ungrouped (or in the
    /// place storage remembers for them); leaves the host no longer shows
    /// are kept but hidden. Ends with a full re-sync pass.
    pub fn rescan<H>(&mut self, host: &mut H) -> RescanReport
    where
        H: SourceRegistry + ToggleSink + ?Sized,
    {
        // clicks made before the scan win over the flags about to be pushed
        self.ingest_changes();

        let records = host.scan();
        let mut report = RescanReport {
            seen: records.len(),
            ..Default::default()
        };

        let mut seen = HashSet::with_capacity(records.len());
        for record in records {
            self.sync.observe_host(&record.key, record.host_enabled);
            let enabled = self
                .remembered
                .get(&record.key)
                .copied()
                .unwrap_or(record.host_enabled);
            seen.insert(record.key.clone());
            if self.store.upsert_leaf(record.key, record.title, enabled) {
                report.added += 1;
            }
        }
        report.missing = self.store.mark_absent_except(&seen);
        if report.added > 0 {
            self.dirty = true;
        }

        report.push = self.sync.resync_all(&self.store, host);
        log::info!(
            "Rescan: {} seen, {} new, {} missing, {} pushed",
            report.seen,
            report.added,
            report.missing,
            report.push.pushed
        );
        report
    }

    /// Fold host toggle changes queued by the gate into leaf flags
    pub fn ingest_changes(&mut self) -> usize {
        let changed = self.sync.ingest_pending(&mut self.store);
        if changed > 0 {
            self.dirty = true;
        }
        changed
    }

    // ========================
    // Edits
    // ========================

    fn accept<T>(&mut self, op: &str, result: DomainResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.dirty = true;
                Some(value)
            }
            Err(e) => {
                log::debug!("{} ignored: {}", op, e);
                None
            }
        }
    }

    fn accept_flips<S>(&mut self, op: &str, result: DomainResult<Vec<EffectiveFlip>>, sink: &mut S) -> bool
    where
        S: ToggleSink + ?Sized,
    {
        match self.accept(op, result) {
            Some(flips) => {
                self.sync.push_flips(&self.store, &flips, sink);
                true
            }
            None => false,
        }
    }

    pub fn create_group(&mut self, parent: Option<&GroupId>, title: Option<&str>) -> Option<GroupId> {
        let result = self.store.create_group(parent, title);
        self.accept("create group", result)
    }

    pub fn rename_group(&mut self, id: &GroupId, title: &str) -> bool {
        let result = self.store.rename_group(id, title);
        self.accept("rename group", result).is_some()
    }

    pub fn delete_group<S: ToggleSink + ?Sized>(&mut self, id: &GroupId, sink: &mut S) -> bool {
        self.ingest_changes();
        let result = self.store.delete_group(id);
        self.accept_flips("delete group", result, sink)
    }

    pub fn move_node<S: ToggleSink + ?Sized>(&mut self, node: &ChildRef, target: &GroupId, sink: &mut S) -> bool {
        self.ingest_changes();
        let result = self.store.reparent(node, target);
        self.accept_flips("move", result, sink)
    }

    pub fn toggle_leaf<S: ToggleSink + ?Sized>(&mut self, key: &LeafKey, enabled: bool, sink: &mut S) -> bool {
        self.ingest_changes();
        let result = self.store.set_leaf_enabled(key, enabled);
        self.accept_flips("toggle leaf", result, sink)
    }

    pub fn toggle_group<S: ToggleSink + ?Sized>(&mut self, id: &GroupId, enabled: bool, sink: &mut S) -> bool {
        self.ingest_changes();
        let result = self.store.set_group_enabled(id, enabled);
        self.accept_flips("toggle group", result, sink)
    }

    pub fn isolate_group<S: ToggleSink + ?Sized>(&mut self, id: &GroupId, sink: &mut S) -> bool {
        self.ingest_changes();
        let result = self.store.isolate_group(id);
        self.accept_flips("isolate group", result, sink)
    }

    /// Returns the new collapsed flag
    pub fn toggle_collapsed(&mut self, id: &GroupId) -> Option<bool> {
        let result = self.store.toggle_collapsed(id);
        self.accept("toggle collapsed", result)
    }

    /// Display-only; never persisted
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }
}
