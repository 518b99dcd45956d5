//! Named copies of the database.

use super::Database;
use crate::domain::MockError;
use std::collections::BTreeMap;

/// Snapshots keyed by name.
#[derive(Debug, Default)]
pub struct SnapshotRegistry {
    snapshots: BTreeMap<String, Database>,
}

impl SnapshotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of `database` under `name`, replacing any earlier one.
    pub fn take(&mut self, name: &str, database: &Database) {
        self.snapshots.insert(name.to_string(), database.clone());
    }

    /// A fresh copy of the snapshot, leaving it revertible again.
    pub fn restore(&self, name: &str) -> Result<Database, MockError> {
        self.snapshots
            .get(name)
            .cloned()
            .ok_or_else(|| MockError::SnapshotNotFound(name.to_string()))
    }

    pub fn remove(&mut self, name: &str) -> Result<(), MockError> {
        self.snapshots
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| MockError::SnapshotNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.snapshots.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
