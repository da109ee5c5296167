//! Group Commands
//!
//! Create, rename, delete, toggle, isolate and collapse groups.

use super::{AppState, CommandOutcome};
use crate::domain::{ChildRef, GroupId};
use crate::sync::HostSurface;

/// Create a top-level group
pub async fn create_group(state: &AppState, title: Option<String>) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let applied = session.create_group(None, title.as_deref()).is_some();
    session.flush().await;
    Ok(CommandOutcome::from_session(applied, &session))
}

/// Create a group nested under `parent`
pub async fn create_subgroup(
    state: &AppState,
    parent: GroupId,
    title: Option<String>,
) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let applied = session.create_group(Some(&parent), title.as_deref()).is_some();
    session.flush().await;
    Ok(CommandOutcome::from_session(applied, &session))
}

pub async fn rename_group(state: &AppState, id: GroupId, title: String) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let applied = session.rename_group(&id, &title);
    session.flush().await;
    Ok(CommandOutcome::from_session(applied, &session))
}

/// Delete a group; its children move up one level
pub async fn delete_group(
    state: &AppState,
    host: &mut dyn HostSurface,
    id: GroupId,
) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let applied = session.delete_group(&id, host);
    session.flush().await;
    Ok(CommandOutcome::from_session(applied, &session))
}

pub async fn toggle_group(
    state: &AppState,
    host: &mut dyn HostSurface,
    id: GroupId,
    enabled: bool,
) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let applied = session.toggle_group(&id, enabled, host);
    session.flush().await;
    Ok(CommandOutcome::from_session(applied, &session))
}

/// Enable only this group, disable every other one
pub async fn isolate_group(
    state: &AppState,
    host: &mut dyn HostSurface,
    id: GroupId,
) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let applied = session.isolate_group(&id, &mut *host);
    if applied {
        if let Some(group) = session.store().group(&id) {
            host.notify(&format!("Isolated \"{}\"", group.title));
        }
    }
    session.flush().await;
    Ok(CommandOutcome::from_session(applied, &session))
}

pub async fn toggle_collapsed(state: &AppState, id: GroupId) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let applied = session.toggle_collapsed(&id).is_some();
    session.flush().await;
    Ok(CommandOutcome::from_session(applied, &session))
}

/// Move a group (with its subtree) under `target`
pub async fn move_group(
    state: &AppState,
    host: &mut dyn HostSurface,
    id: GroupId,
    target: GroupId,
) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let applied = session.move_node(&ChildRef::group(id), &target, host);
    session.flush().await;
    Ok(CommandOutcome::from_session(applied, &session))
}
