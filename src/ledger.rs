//! Change ledger: staged writes and deletions for one run
//!
//! The ledger is independent of the entry cache. The cache says what exists;
//! the ledger says what this run has staged to change. A key holds at most
//! one record and a later stage replaces an earlier one (last write wins)
//! while keeping the record's original position.

use hashlink::LinkedHashMap;

use crate::key::PathKey;

/// A staged change for one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Replace the file's content
    Upsert(String),
    /// Remove the file
    Delete,
}

/// One ledger record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staged {
    /// Canonical path the change applies to
    pub path: String,
    pub change: Change,
}

#[derive(Debug, Default)]
pub struct ChangeLedger {
    records: LinkedHashMap<PathKey, Staged>,
}

impl ChangeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `change` for `path`, replacing any earlier record for `key`.
    pub fn stage(&mut self, key: PathKey, path: String, change: Change) {
        let staged = Staged { path, change };
        match self.records.get_mut(&key) {
            Some(record) => *record = staged,
            None => {
                self.records.insert(key, staged);
            }
        }
    }

    pub fn get(&self, key: &PathKey) -> Option<&Change> {
        self.records.get(key).map(|staged| &staged.change)
    }

    pub fn is_deleted(&self, key: &PathKey) -> bool {
        matches!(self.get(key), Some(Change::Delete))
    }

    /// Records in staging order
    pub fn iter(&self) -> impl Iterator<Item = (&PathKey, &Staged)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
