//! Sources Plus replay host
//!
//! Drives a workspace session from JSON lines on stdin against an in-memory
//! host surface and prints the resulting view, host pushes and notices as
//! one JSON line per event.
//!
//! Usage: `sources-plus [config.json] < events.jsonl`

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use rolling_logger::RollingConfig;
use sources_plus::commands::{self, AppState, CommandOutcome, SurfaceCommand};
use sources_plus::config::AppConfig;
use sources_plus::domain::{LeafKey, WorkspaceKey};
use sources_plus::repository::{init_db, SqliteStateRepository, StateRepository};
use sources_plus::session::WorkspaceSession;
use sources_plus::sync::{HostSurface, MemoryHost};
use sources_plus::view::ViewRow;

#[derive(Debug, Deserialize)]
struct SourceLine {
    title: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// One input line
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ReplayEvent {
    /// Host item list changed; triggers a rescan
    Sources { items: Vec<SourceLine> },
    /// User flipped a host toggle directly
    HostToggle { title: String, enabled: bool },
    /// Host navigated to another location
    Location { path: String },
    Command { payload: SurfaceCommand },
    View,
}

/// One output line
#[derive(Debug, Serialize)]
struct ReplayReport {
    applied: bool,
    rows: Vec<ViewRow>,
    pushes: Vec<(LeafKey, bool)>,
    notices: Vec<String>,
}

async fn handle(state: &AppState, host: &mut MemoryHost, event: ReplayEvent) -> Result<CommandOutcome, String> {
    match event {
        ReplayEvent::Sources { items } => {
            host.set_sources(items.into_iter().map(|s| (s.title, s.enabled)).collect());
            commands::rescan(state, host).await
        }
        ReplayEvent::HostToggle { title, enabled } => {
            let key = host
                .key_for_title(&title)
                .ok_or_else(|| format!("No source titled {:?}", title))?;
            host.user_toggle(&key, enabled);
            commands::ingest_changes(state).await
        }
        ReplayEvent::Location { path } => commands::open_workspace(state, host, path).await,
        ReplayEvent::Command { payload } => commands::execute(state, host, payload).await,
        ReplayEvent::View => commands::get_view(state).await,
    }
}

async fn run() -> Result<(), String> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load_or_default(config_path.as_deref())?;

    let log_config = RollingConfig {
        level: if config.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        },
        ..Default::default()
    };
    rolling_logger::init_logger(config.log_dir.clone(), &config.app_name, log_config)?;

    let db_state = init_db(&config.db_path).await?;
    let repo: Arc<dyn StateRepository> = Arc::new(SqliteStateRepository::new(db_state.connection()));

    let workspace = config
        .location_path
        .as_deref()
        .and_then(WorkspaceKey::from_location_path);
    let session = WorkspaceSession::open(repo.clone(), workspace).await;
    let mut host = MemoryHost::new();
    host.bind(session.gate());
    let state = AppState::new(repo, session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("Failed to read stdin: {}", e))?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = match serde_json::from_str::<ReplayEvent>(line) {
            Ok(event) => handle(&state, &mut host, event).await,
            Err(e) => Err(format!("Invalid event: {}", e)),
        };
        let output = match outcome {
            Ok(outcome) => serde_json::to_string(&ReplayReport {
                applied: outcome.applied,
                rows: outcome.rows,
                pushes: host.take_pushes(),
                notices: host.take_notices(),
            }),
            Err(e) => {
                log::warn!("{}", e);
                serde_json::to_string(&serde_json::json!({ "error": e }))
            }
        }
        .map_err(|e| format!("Failed to encode output: {}", e))?;
        println!("{}", output);
    }

    state.session.lock().await.flush().await;
    db_state.close().await;
    log::info!("Replay finished");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
