//! In-memory host surface
//!
//! A host with a flat list of titled toggles. Used by the replay binary and
//! by tests; programmatic pushes echo back through the attached gate like a
//! real host's change events would.

use super::guard::ChangeGate;
use super::host::{
    display_title, records_from_rows, HostSurface, Notifier, SourceRecord, SourceRegistry, ToggleSink,
};
use crate::domain::{DomainError, DomainResult, KeyResolver, LeafKey, TitleKeyResolver};

#[derive(Debug, Default)]
pub struct MemoryHost<R: KeyResolver = TitleKeyResolver> {
    resolver: R,
    sources: Vec<SourceRecord>,
    gate: Option<ChangeGate>,
    pushes: Vec<(LeafKey, bool)>,
    notices: Vec<String>,
}

impl MemoryHost<TitleKeyResolver> {
    pub fn new() -> Self {
        Self::with_resolver(TitleKeyResolver)
    }
}

impl<R: KeyResolver> MemoryHost<R> {
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            sources: Vec::new(),
            gate: None,
            pushes: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Replace the host's item list: `(title, enabled)` in display order.
    /// Keys are resolved once here, as a scan would.
    pub fn set_sources(&mut self, rows: Vec<(String, bool)>) {
        self.sources = records_from_rows(&self.resolver, &rows);
    }

    /// Key of the first source displayed under `title`
    pub fn key_for_title(&self, title: &str) -> Option<LeafKey> {
        let wanted = display_title(title);
        self.sources
            .iter()
            .find(|r| r.title == wanted)
            .map(|r| r.key.clone())
    }

    fn position(&self, key: &LeafKey) -> Option<usize> {
        self.sources.iter().position(|r| &r.key == key)
    }

    pub fn host_state(&self, key: &LeafKey) -> Option<bool> {
        self.position(key).map(|i| self.sources[i].host_enabled)
    }

    /// Simulate the user clicking a host toggle. Returns whether the change
    /// reached the session.
    pub fn user_toggle(&mut self, key: &LeafKey, enabled: bool) -> bool {
        let Some(index) = self.position(key) else {
            return false;
        };
        self.sources[index].host_enabled = enabled;
        match &self.gate {
            Some(gate) => gate.notify(key.clone(), enabled),
            None => false,
        }
    }

    pub fn take_pushes(&mut self) -> Vec<(LeafKey, bool)> {
        std::mem::take(&mut self.pushes)
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }
}

impl<R: KeyResolver> SourceRegistry for MemoryHost<R> {
    fn scan(&mut self) -> Vec<SourceRecord> {
        self.sources.clone()
    }
}

impl<R: KeyResolver> ToggleSink for MemoryHost<R> {
    fn push(&mut self, key: &LeafKey, enabled: bool) -> DomainResult<()> {
        let index = self
            .position(key)
            .ok_or_else(|| DomainError::NotFound(format!("source {}", key)))?;
        self.sources[index].host_enabled = enabled;
        self.pushes.push((key.clone(), enabled));

        // programmatic writes fire the same event as user clicks
        if let Some(gate) = &self.gate {
            gate.notify(key.clone(), enabled);
        }
        Ok(())
    }
}

impl<R: KeyResolver> Notifier for MemoryHost<R> {
    fn notify(&mut self, message: &str) {
        log::info!("notice: {}", message);
        self.notices.push(message.to_string());
    }
}

impl<R: KeyResolver> HostSurface for MemoryHost<R> {
    fn bind(&mut self, gate: ChangeGate) {
        self.gate = Some(gate);
    }
}
