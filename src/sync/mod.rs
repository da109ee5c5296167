//! Synchronization Protocol
//!
//! - host: traits the host surface implements
//! - guard: re-entrancy guard and the change gate
//! - synchronizer: pushes effective state and ingests host changes
//! - memory_host: in-memory host used by the replay binary and tests

mod guard;
mod host;
mod memory_host;
mod synchronizer;

pub use guard::{ChangeGate, GuardScope, SyncGuard};
pub use host::{
    records_from_rows, ChangeNotification, HostSurface, Notifier, SourceRecord, SourceRegistry,
    ToggleSink, UNTITLED_SOURCE,
};
pub use memory_host::MemoryHost;
pub use synchronizer::{PushReport, Synchronizer};
