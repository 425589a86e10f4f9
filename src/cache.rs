//! Entry cache: what the run has observed to exist
//!
//! Entries are recorded lazily the first time a path is observed and are
//! never evicted during a run. Deletions are tracked by the change ledger,
//! not here.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::key::PathKey;
use crate::path::canonicalize;

/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// A path classified as a file or a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    File { path: String },
    Directory { path: String },
}

impl Entry {
    /// Build an entry of `kind` for `path`, canonicalizing the path.
    pub fn new(kind: EntryKind, path: &str) -> Self {
        let path = canonicalize(path);
        match kind {
            EntryKind::File => Entry::File { path },
            EntryKind::Directory => Entry::Directory { path },
        }
    }

    pub fn file(path: &str) -> Self {
        Self::new(EntryKind::File, path)
    }

    pub fn directory(path: &str) -> Self {
        Self::new(EntryKind::Directory, path)
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::File { .. } => EntryKind::File,
            Entry::Directory { .. } => EntryKind::Directory,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Entry::File { path } | Entry::Directory { path } => path,
        }
    }

    pub fn key(&self) -> PathKey {
        PathKey::derive(self.path())
    }

    pub fn is_directory(&self) -> bool {
        self.kind() == EntryKind::Directory
    }
}

/// Mapping from path key to the entry observed for it
#[derive(Debug, Default)]
pub struct EntryCache {
    entries: HashMap<PathKey, Entry>,
}

impl EntryCache {
    /// Create a new empty entry cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached entry without resolving
    pub fn get(&self, key: &PathKey) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Check if a key has been observed
    pub fn contains(&self, key: &PathKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Record `entry` unless its slot is taken.
    ///
    /// Returns the cached entry when the kinds agree (the existing record is
    /// kept), and `None` when the slot already holds the other kind.
    pub fn upsert(&mut self, entry: Entry) -> Option<&Entry> {
        let kind = entry.kind();
        let cached = self.entries.entry(entry.key()).or_insert(entry);
        if cached.kind() == kind {
            Some(cached)
        } else {
            None
        }
    }

    /// Get a cached entry, or resolve and cache it if not present.
    ///
    /// `resolver` runs only on a miss. A resolver returning `None` leaves the
    /// cache untouched.
    pub fn get_or_resolve<F>(&mut self, key: PathKey, resolver: F) -> Result<Option<&Entry>>
    where
        F: FnOnce() -> Result<Option<Entry>>,
    {
        if !self.entries.contains_key(&key) {
            match resolver()? {
                Some(entry) => {
                    self.entries.insert(key, entry);
                }
                None => return Ok(None),
            }
        }
        Ok(self.entries.get(&key))
    }

    /// Get the number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
