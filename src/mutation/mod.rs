//! Mutation Operations
//!
//! This module provides tree edits split into specialized sub-modules:
//! - hierarchy: Structural edits (create, rename, delete, reparent)
//! - enablement: Flag edits (leaf/group toggle, isolate, collapse)
//!
//! Every edit that changes containment rebuilds the parent index before
//! returning.

mod enablement;
mod hierarchy;

// Re-export all operation traits so they can be used by importing the module
pub use enablement::EnablementOperations;
pub use hierarchy::HierarchyOperations;
