//! Repository Layer
//!
//! Persistence codec and storage backends for workspace snapshots.

mod db;
mod memory_repo;
mod record;
mod sqlite_repo;
mod traits;


pub use db::{init_db, DbState, SharedConnection};
pub use memory_repo::MemoryStateRepository;
pub use record::{EnabledMap, StoredGroup, StoredState, STATE_VERSION};
pub use sqlite_repo::SqliteStateRepository;
pub use traits::StateRepository;
