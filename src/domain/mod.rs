//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO dependency on the store, sync or storage layers.

mod error;
mod group;
mod ids;
mod leaf;
mod source_key;

pub use error::{DomainError, DomainResult};
pub use group::{Group, DEFAULT_GROUP_TITLE, DEFAULT_SUBGROUP_TITLE};
pub use ids::{ChildRef, GroupId, LeafKey, WorkspaceKey};
pub use leaf::LeafItem;
pub use source_key::{resolve_scan, KeyResolver, TitleKeyResolver};
