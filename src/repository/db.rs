//! Database Connection and Setup
//!
//! Manages SQLite database connection and migrations.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared connection handle
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Database state wrapper
pub struct DbState {
    conn: SharedConnection,
}

impl DbState {
    /// Handle for repositories; every clone shares one connection
    pub fn connection(&self) -> SharedConnection {
        Arc::clone(&self.conn)
    }

    /// Close the connection. Repositories holding the handle start
    /// failing with "Database not initialized".
    pub async fn close(&self) {
        self.conn.lock().await.take();
    }
}

/// Initialize database with path (`:memory:` for a private in-memory db)
pub async fn init_db(db_path: &Path) -> Result<DbState, String> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create db directory: {}", e))?;
        }
    }

    let conn = Connection::open(db_path).map_err(|e| format!("Failed to open db: {}", e))?;

    // Run migrations
    run_migrations(&conn)?;

    log::info!("Database ready at {}", db_path.display());
    Ok(DbState {
        conn: Arc::new(Mutex::new(Some(conn))),
    })
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(mut rows) = stmt.query([]) else {
        return false;
    };
    while let Ok(Some(row)) = rows.next() {
        if let Ok(name) = row.get::<_, String>(1) {
            if name == column {
                return true;
            }
        }
    }
    false
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> Result<(), String> {
    // Snapshot table - one JSON document per workspace
    conn.execute(
        "CREATE TABLE IF NOT EXISTS workspace_state (
            storage_key TEXT PRIMARY KEY,
            state_json TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| format!("Failed to create workspace_state table: {}", e))?;

    // Migration: add updated_at column
    if !column_exists(conn, "workspace_state", "updated_at") {
        conn.execute(
            "ALTER TABLE workspace_state ADD COLUMN updated_at INTEGER NOT NULL DEFAULT 0",
            [],
        )
        .map_err(|e| format!("Failed to add updated_at column: {}", e))?;
    }

    Ok(())
}
