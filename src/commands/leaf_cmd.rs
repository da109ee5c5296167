//! Leaf Commands

use super::{AppState, CommandOutcome};
use crate::domain::{ChildRef, GroupId, LeafKey};
use crate::sync::HostSurface;

/// Set a leaf's own flag. While an ancestor is off the flag is only
/// recorded.
pub async fn toggle_leaf(
    state: &AppState,
    host: &mut dyn HostSurface,
    key: LeafKey,
    enabled: bool,
) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let applied = session.toggle_leaf(&key, enabled, host);
    session.flush().await;
    Ok(CommandOutcome::from_session(applied, &session))
}

/// Move a leaf into `target` (drag and drop)
pub async fn move_leaf(
    state: &AppState,
    host: &mut dyn HostSurface,
    key: LeafKey,
    target: GroupId,
) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    let applied = session.move_node(&ChildRef::leaf(key), &target, host);
    session.flush().await;
    Ok(CommandOutcome::from_session(applied, &session))
}

/// Filter leaf rows by title substring
pub async fn set_filter(state: &AppState, query: String) -> Result<CommandOutcome, String> {
    let mut session = state.session.lock().await;
    session.set_filter(query);
    Ok(CommandOutcome::from_session(true, &session))
}
