//! Commands Layer
//!
//! User-facing surface commands. Each handler locks the session, applies
//! one edit, flushes the snapshot and returns the refreshed view. Handlers
//! return `Result<_, String>` at the boundary; a rejected edit is not an
//! error, it comes back with `applied == false`.

mod group_cmd;
mod leaf_cmd;
mod workspace_cmd;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::{GroupId, LeafKey};
use crate::repository::StateRepository;
use crate::session::WorkspaceSession;
use crate::sync::HostSurface;
use crate::view::ViewRow;

pub use group_cmd::*;
pub use leaf_cmd::*;
pub use workspace_cmd::*;

/// Application state shared across commands
pub struct AppState {
    pub repo: Arc<dyn StateRepository>,
    pub session: Mutex<WorkspaceSession>,
}

impl AppState {
    pub fn new(repo: Arc<dyn StateRepository>, session: WorkspaceSession) -> Self {
        Self {
            repo,
            session: Mutex::new(session),
        }
    }
}

/// Result of a command: whether it changed anything, plus the view
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub applied: bool,
    pub rows: Vec<ViewRow>,
}

impl CommandOutcome {
    fn from_session(applied: bool, session: &WorkspaceSession) -> Self {
        Self {
            applied,
            rows: session.view(),
        }
    }
}

/// One surface command as sent by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SurfaceCommand {
    CreateGroup {
        title: Option<String>,
    },
    CreateSubgroup {
        parent: GroupId,
        title: Option<String>,
    },
    RenameGroup {
        id: GroupId,
        title: String,
    },
    DeleteGroup {
        id: GroupId,
    },
    ToggleLeaf {
        key: LeafKey,
        enabled: bool,
    },
    ToggleGroup {
        id: GroupId,
        enabled: bool,
    },
    IsolateGroup {
        id: GroupId,
    },
    ToggleCollapsed {
        id: GroupId,
    },
    MoveLeaf {
        key: LeafKey,
        target: GroupId,
    },
    MoveGroup {
        id: GroupId,
        target: GroupId,
    },
    SetFilter {
        query: String,
    },
}

/// Dispatch one command
pub async fn execute(
    state: &AppState,
    host: &mut dyn HostSurface,
    command: SurfaceCommand,
) -> Result<CommandOutcome, String> {
    match command {
        SurfaceCommand::CreateGroup { title } => create_group(state, title).await,
        SurfaceCommand::CreateSubgroup { parent, title } => create_subgroup(state, parent, title).await,
        SurfaceCommand::RenameGroup { id, title } => rename_group(state, id, title).await,
        SurfaceCommand::DeleteGroup { id } => delete_group(state, host, id).await,
        SurfaceCommand::ToggleLeaf { key, enabled } => toggle_leaf(state, host, key, enabled).await,
        SurfaceCommand::ToggleGroup { id, enabled } => toggle_group(state, host, id, enabled).await,
        SurfaceCommand::IsolateGroup { id } => isolate_group(state, host, id).await,
        SurfaceCommand::ToggleCollapsed { id } => toggle_collapsed(state, id).await,
        SurfaceCommand::MoveLeaf { key, target } => move_leaf(state, host, key, target).await,
        SurfaceCommand::MoveGroup { id, target } => move_group(state, host, id, target).await,
        SurfaceCommand::SetFilter { query } => set_filter(state, query).await,
    }
}
