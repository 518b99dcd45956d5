//! # Entity Store
//!
//! The live [`Database`] plus the [`SnapshotRegistry`] of named copies.
//! Locking lives in the manager; nothing here is shared.

mod database;
mod snapshot;

pub use database::Database;
pub use snapshot::SnapshotRegistry;
