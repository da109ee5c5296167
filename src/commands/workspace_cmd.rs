//! Workspace Commands
//!
//! Host-driven entry points: rescans, queued host changes, and switching
//! to another workspace when the host location changes.

use super::{AppState, CommandOutcome};
use crate::domain::WorkspaceKey;
use crate::session::WorkspaceSession;
use crate::sync::HostSurface;

/// Re-read the host's items and re-sync every toggle
pub async fn rescan(state: &AppState, host: &mut dyn HostSurface) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let report = session.rescan(host);
    session.flush().await;
    Ok(CommandOutcome::from_session(report.added > 0 || report.missing > 0, &session))
}

/// Apply host toggle changes reported through the gate
pub async fn ingest_changes(state: &AppState) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let changed = session.ingest_changes();
    session.flush().await;
    Ok(CommandOutcome::from_session(changed > 0, &session))
}

/// Current view without changing anything
pub async fn get_view(state: &AppState) -> Result<CommandOutcome, String> {
    let session = state.session.lock().await;
    Ok(CommandOutcome::from_session(false, &session))
}

/// Switch to the workspace named by a host location path. The current
/// session takes in pending host changes and is flushed first; the host is
/// rebound and rescanned.
pub async fn open_workspace(
    state: &AppState,
    host: &mut dyn HostSurface,
    location_path: String,
) -> Result<CommandOutcome, String> {
    let workspace = WorkspaceKey::from_location_path(&location_path);
    let mut session = state.session.lock().await;
    if session.workspace() == workspace.as_ref() {
        return Ok(CommandOutcome::from_session(false, &session));
    }

    session.ingest_changes();
    session.flush().await;
    *session = WorkspaceSession::open(state.repo.clone(), workspace).await;
    host.bind(session.gate());
    session.rescan(host);
    session.flush().await;
    Ok(CommandOutcome::from_session(true, &session))
}
