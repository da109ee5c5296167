//! Application Configuration
//!
//! JSON file with every field optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database holding workspace snapshots
    pub db_path: PathBuf,
    /// Directory for rotated log files
    pub log_dir: PathBuf,
    /// Log file name and log prefix
    pub app_name: String,
    /// Host location the session starts in, e.g. `/notebook/<id>`
    pub location_path: Option<String>,
    /// Write debug-level logs
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("sources_plus.db"),
            log_dir: PathBuf::from("logs"),
            app_name: "SourcesPlus".to_string(),
            location_path: None,
            verbose: false,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&text).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    /// Defaults when no path is given or the file does not exist
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            _ => Ok(Self::default()),
        }
    }
}
