//! Sources Plus
//!
//! Nested groups over a host's flat list of toggleable sources. Groups gate
//! everything below them; the resulting effective state is mirrored onto
//! the host's own toggles.
//!
//! Layered architecture:
//! - domain: Core entities, ids and key derivation
//! - store: Arena tree and its parent index
//! - cascade: Effective enablement and badge counts
//! - mutation: Tree edits returning effective-state diffs
//! - sync: Host interfaces, re-entrancy guard, push/ingest
//! - repository: Snapshot codec and storage backends
//! - session: One open workspace
//! - view: Display rows
//! - commands: Surface command handlers

pub mod cascade;
pub mod commands;
pub mod config;
pub mod domain;
pub mod mutation;
pub mod repository;
pub mod session;
pub mod store;
pub mod sync;
pub mod view;
