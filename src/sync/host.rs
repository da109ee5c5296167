//! Host Surface Interfaces
//!
//! Narrow traits the core calls to read the host's items, mirror effective
//! state onto the host's own toggles, and show notices.

use serde::{Deserialize, Serialize};

use super::guard::ChangeGate;
use crate::domain::{resolve_scan, DomainResult, KeyResolver, LeafKey};

/// Display title used for host items that expose none
pub const UNTITLED_SOURCE: &str = "Untitled Source";

/// One host item as seen by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub key: LeafKey,
    pub title: String,
    /// State of the host's own toggle at scan time
    pub host_enabled: bool,
}

/// Host-side state change not initiated by the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub key: LeafKey,
    pub enabled: bool,
}

/// Read path: yields the host's current items
pub trait SourceRegistry {
    fn scan(&mut self) -> Vec<SourceRecord>;
}

/// Write path: sets the host's toggle for one item. Fire-and-forget; an
/// error only means the host mirror may lag.
pub trait ToggleSink {
    fn push(&mut self, key: &LeafKey, enabled: bool) -> DomainResult<()>;
}

/// Transient user notices (toasts)
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Everything the commands layer needs from a host
pub trait HostSurface: SourceRegistry + ToggleSink + Notifier {
    /// Start reporting toggle changes to a (new) session
    fn bind(&mut self, gate: ChangeGate);
}

/// Build scan records from raw `(title, host_enabled)` rows, deriving keys
/// with `resolver`. Blank titles become `UNTITLED_SOURCE` for display but
/// are hashed as-is.
pub fn records_from_rows<R>(resolver: &R, rows: &[(String, bool)]) -> Vec<SourceRecord>
where
    R: KeyResolver + ?Sized,
{
    let keys = resolve_scan(resolver, rows.iter().map(|(title, _)| title.as_str()));
    keys.into_iter()
        .zip(rows)
        .map(|(key, (title, host_enabled))| SourceRecord {
            key,
            title: display_title(title),
            host_enabled: *host_enabled,
        })
        .collect()
}

/// Title as shown to the user: trimmed, `UNTITLED_SOURCE` when blank
pub fn display_title(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        UNTITLED_SOURCE.to_string()
    } else {
        title.to_string()
    }
}
