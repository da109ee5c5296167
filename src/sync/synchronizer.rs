//! Synchronizer
//!
//! Mirrors effective leaf state onto the host toggles and folds host-side
//! changes back into the tree.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::guard::{ChangeGate, SyncGuard};
use super::host::{ChangeNotification, ToggleSink};
use crate::cascade::{is_effectively_enabled, EffectiveFlip};
use crate::domain::LeafKey;
use crate::store::TreeStore;

/// Outcome of one push batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PushReport {
    pub pushed: usize,
    /// Host already showed the value, or the leaf is not on the host
    pub skipped: usize,
    pub failed: usize,
}

/// Per-session sync state: guard, notification queue, and the last known
/// host value of every leaf.
#[derive(Debug)]
pub struct Synchronizer {
    guard: SyncGuard,
    tx: UnboundedSender<ChangeNotification>,
    rx: UnboundedReceiver<ChangeNotification>,
    mirror: HashMap<LeafKey, bool>,
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synchronizer {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            guard: SyncGuard::new(),
            tx,
            rx,
            mirror: HashMap::new(),
        }
    }

    /// Gate for the host adapter to report toggle changes through
    pub fn gate(&self) -> ChangeGate {
        ChangeGate::new(self.guard.clone(), self.tx.clone())
    }

    pub fn guard(&self) -> &SyncGuard {
        &self.guard
    }

    /// Record the host value seen during a scan
    pub fn observe_host(&mut self, key: &LeafKey, enabled: bool) {
        self.mirror.insert(key.clone(), enabled);
    }

    pub fn mirrored(&self, key: &LeafKey) -> Option<bool> {
        self.mirror.get(key).copied()
    }

    /// Push a batch of flips under one guard scope. The store must already
    /// hold its final state.
    pub fn push_flips<S>(&mut self, store: &TreeStore, flips: &[EffectiveFlip], sink: &mut S) -> PushReport
    where
        S: ToggleSink + ?Sized,
    {
        let mut report = PushReport::default();
        if flips.is_empty() {
            return report;
        }

        let _scope = self.guard.hold();
        for flip in flips {
            let on_host = store.leaf(&flip.key).map(|l| l.present).unwrap_or(false);
            if !on_host || self.mirror.get(&flip.key) == Some(&flip.enabled) {
                report.skipped += 1;
                continue;
            }

            match sink.push(&flip.key, flip.enabled) {
                Ok(()) => {
                    self.mirror.insert(flip.key.clone(), flip.enabled);
                    report.pushed += 1;
                }
                Err(e) => {
                    log::warn!("Failed to push {} = {}: {}", flip.key, flip.enabled, e);
                    report.failed += 1;
                }
            }
        }

        log::debug!(
            "push batch: {} pushed, {} skipped, {} failed",
            report.pushed,
            report.skipped,
            report.failed
        );
        report
    }

    /// Push the effective state of every present leaf wherever the host
    /// disagrees.
    pub fn resync_all<S>(&mut self, store: &TreeStore, sink: &mut S) -> PushReport
    where
        S: ToggleSink + ?Sized,
    {
        let desired: Vec<EffectiveFlip> = store
            .leaves()
            .filter(|leaf| leaf.present)
            .map(|leaf| EffectiveFlip {
                key: leaf.key.clone(),
                enabled: is_effectively_enabled(store, &leaf.key),
            })
            .collect();
        self.push_flips(store, &desired, sink)
    }

    /// Apply queued host changes to leaf own flags. Returns how many flags
    /// changed.
    pub fn ingest_pending(&mut self, store: &mut TreeStore) -> usize {
        let mut changed = 0;
        while let Ok(ChangeNotification { key, enabled }) = self.rx.try_recv() {
            self.mirror.insert(key.clone(), enabled);
            match store.leaf_mut(&key) {
                Some(leaf) if leaf.enabled != enabled => {
                    leaf.enabled = enabled;
                    changed += 1;
                }
                Some(_) => {}
                None => log::debug!("host change for unknown leaf {}", key),
            }
        }
        changed
    }
}
