//! Re-entrancy Guard
//!
//! Pushing state onto a host toggle makes the host fire its own change
//! event. While a push batch runs the guard is held, and `ChangeGate` drops
//! every notification that arrives, so programmatic pushes are never read
//! back as user edits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::host::ChangeNotification;
use crate::domain::LeafKey;

/// Shared flag, set for the duration of a push batch
#[derive(Debug, Clone, Default)]
pub struct SyncGuard {
    active: Arc<AtomicBool>,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Hold the guard until the returned scope is dropped
    pub fn hold(&self) -> GuardScope {
        let previous = self.active.swap(true, Ordering::SeqCst);
        GuardScope {
            active: Arc::clone(&self.active),
            previous,
        }
    }
}

/// Releases the guard on drop, unwinding included. Nested scopes restore
/// the state they found.
#[derive(Debug)]
pub struct GuardScope {
    active: Arc<AtomicBool>,
    previous: bool,
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        self.active.store(self.previous, Ordering::SeqCst);
    }
}

/// Entry point for host change events, handed to the host adapter
#[derive(Debug, Clone)]
pub struct ChangeGate {
    guard: SyncGuard,
    tx: UnboundedSender<ChangeNotification>,
}

impl ChangeGate {
    pub(crate) fn new(guard: SyncGuard, tx: UnboundedSender<ChangeNotification>) -> Self {
        Self { guard, tx }
    }

    /// Queue a host toggle change for ingestion. Returns false when it was
    /// dropped because a push batch is running (or the session is gone).
    pub fn notify(&self, key: LeafKey, enabled: bool) -> bool {
        if self.guard.is_held() {
            log::trace!("ignoring host change for {} during push", key);
            return false;
        }
        self.tx.send(ChangeNotification { key, enabled }).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_scope_releases_on_drop() {
        let guard = SyncGuard::new();
        {
            let _scope = guard.hold();
            assert!(guard.is_held());
            {
                let _inner = guard.hold();
            }
            assert!(guard.is_held(), "inner scope restores the outer hold");
        }
        assert!(!guard.is_held());
    }

    #[test]
    fn test_scope_releases_on_panic() {
        let guard = SyncGuard::new();
        let cloned = guard.clone();
        let result = std::panic::catch_unwind(move || {
            let _scope = cloned.hold();
            panic!("push failed");
        });
        assert!(result.is_err());
        assert!(!guard.is_held());
    }

    #[test]
    fn test_gate_drops_while_held() {
        let guard = SyncGuard::new();
        let (tx, mut rx) = unbounded_channel();
        let gate = ChangeGate::new(guard.clone(), tx);

        {
            let _scope = guard.hold();
            assert!(!gate.notify(LeafKey::new("a"), true));
        }
        assert!(gate.notify(LeafKey::new("b"), false));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.key, LeafKey::new("b"));
        assert!(rx.try_recv().is_err());
    }
}
