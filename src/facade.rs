//! # Facade File System
//!
//! The facade is the staged overlay a run reads and writes through. It
//! composes three pieces of run-local state with an injected [`Backend`]:
//!
//! - **[`EntryCache`]**: what the run has observed to exist, and as what kind.
//! - **[`MembershipIndex`]**: which children have been seen under each
//!   directory (sticky, only grows).
//! - **[`ChangeLedger`]**: what the run has staged to write or delete.
//!
//! Reads go through the ledger first and fall back to the backend. Writes
//! never reach the backend: they are staged in the ledger and turned into
//! [`ExternalCommand`]s by [`FacadeFileSystem::build_external_commands`] at
//! the end of the run.
//!
//! `exists` and `is_directory` only consult the entry cache. A path the run
//! has not observed yet reports "does not exist" even when the backend has it.
//!
//! A facade belongs to exactly one run. Its state is unsynchronized and it is
//! deliberately not `Clone`.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::backend::{Backend, GlobQuery};
use crate::cache::{Entry, EntryCache, EntryKind};
use crate::command::ExternalCommand;
use crate::error::{Error, Result};
use crate::key::PathKey;
use crate::ledger::{Change, ChangeLedger};
use crate::membership::MembershipIndex;

/// What to do when the backend fails to read a file the ledger has no
/// record for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadFailurePolicy {
    /// Log a warning and treat the file as empty
    #[default]
    Empty,
    /// Fail the read with `Error::BackingRead`
    Error,
}

pub struct FacadeFileSystem {
    backend: Box<dyn Backend>,
    entries: EntryCache,
    membership: MembershipIndex,
    ledger: ChangeLedger,
    read_failures: ReadFailurePolicy,
}

impl FacadeFileSystem {
    /// Create a facade over `backend` with empty run state
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            entries: EntryCache::new(),
            membership: MembershipIndex::new(),
            ledger: ChangeLedger::new(),
            read_failures: ReadFailurePolicy::default(),
        }
    }

    pub fn with_read_failures(mut self, policy: ReadFailurePolicy) -> Self {
        self.read_failures = policy;
        self
    }

    /// Resolve and cache the entry for `path`.
    ///
    /// The backend is only asked on a cache miss. Returns `None` when the
    /// backend has nothing at `path`.
    pub fn upsert_entry(&mut self, path: &str) -> Result<Option<Entry>> {
        let path = self.backend.resolve_path(path);
        let key = PathKey::derive(&path);
        let backend = &self.backend;
        let entry = self.entries.get_or_resolve(key, || {
            Ok(backend
                .describe_path(&path)?
                .map(|kind| Entry::new(kind, &path)))
        })?;
        Ok(entry.cloned())
    }

    /// Like [`upsert_entry`](Self::upsert_entry), but `None` unless the entry
    /// is a directory. A cached file is left as it is.
    pub fn upsert_directory(&mut self, path: &str) -> Result<Option<Entry>> {
        self.upsert_of_kind(path, EntryKind::Directory)
    }

    /// Like [`upsert_entry`](Self::upsert_entry), but `None` unless the entry
    /// is a file. A cached directory is left as it is.
    pub fn upsert_file(&mut self, path: &str) -> Result<Option<Entry>> {
        self.upsert_of_kind(path, EntryKind::File)
    }

    fn upsert_of_kind(&mut self, path: &str, expected: EntryKind) -> Result<Option<Entry>> {
        let entry = self.upsert_entry(path)?;
        match entry {
            Some(entry) if entry.kind() == expected => Ok(Some(entry)),
            Some(entry) => {
                debug!(
                    "Expected {:?} at {}, found {:?}",
                    expected,
                    entry.path(),
                    entry.kind()
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// List the children of `path`.
    ///
    /// Every child the backend reports is merged into the membership index
    /// and entry cache. The result is the union of everything ever observed
    /// under `path`, in order of first observation.
    pub fn list_directory(&mut self, path: &str) -> Result<Vec<String>> {
        let path = self.backend.resolve_path(path);
        let parent = PathKey::derive(&path);
        for child in self.backend.list_directory_children(&path)? {
            let child_key = child.key();
            if self.entries.upsert(child.clone()).is_none() {
                debug!(
                    "Listing of {} reports {} as {:?}, keeping the cached kind",
                    path,
                    child.path(),
                    child.kind()
                );
            }
            self.membership.insert(parent, child_key);
        }

        Ok(self
            .membership
            .children_of(&parent)
            .filter_map(|key| self.entries.get(key))
            .map(|entry| entry.path().to_string())
            .collect())
    }

    /// Read a file through the ledger.
    ///
    /// Staged content wins over the backend. A staged deletion fails with
    /// `Error::AlreadyDeleted`. Backend failures follow the read failure
    /// policy.
    pub fn read_file(&self, path: &str) -> Result<String> {
        let path = self.backend.resolve_path(path);
        match self.ledger.get(&PathKey::derive(&path)) {
            Some(Change::Delete) => Err(Error::AlreadyDeleted { path }),
            Some(Change::Upsert(data)) => Ok(data.clone()),
            None => match self.backend.read_file(&path) {
                Ok(content) => Ok(content),
                Err(e) => match self.read_failures {
                    ReadFailurePolicy::Empty => {
                        warn!("Failed to read {}, treating it as empty: {}", path, e);
                        Ok(String::new())
                    }
                    ReadFailurePolicy::Error => Err(match e {
                        Error::BackingRead { .. } => e,
                        other => Error::BackingRead {
                            path,
                            message: other.to_string(),
                        },
                    }),
                },
            },
        }
    }

    /// True if `path` has been observed as a directory
    pub fn is_directory(&self, path: &str) -> bool {
        self.entries
            .get(&self.key_of(path))
            .is_some_and(Entry::is_directory)
    }

    /// True if `path` has been observed at all
    pub fn exists(&self, path: &str) -> bool {
        self.entries.contains(&self.key_of(path))
    }

    /// Key of `path` after the backend has resolved its spelling
    pub fn key_of(&self, path: &str) -> PathKey {
        PathKey::derive(&self.backend.resolve_path(path))
    }

    /// Expand globs under `base_dir` through the backend.
    ///
    /// Every match is recorded as a file without asking the backend for its
    /// real kind.
    pub fn list_matching_paths(
        &mut self,
        base_dir: &str,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<String>> {
        let query = GlobQuery {
            include: include.to_vec(),
            exclude: exclude.to_vec(),
            base_dir: self.backend.resolve_path(base_dir),
        };
        let matches = self.backend.match_glob(&query)?;

        Ok(matches
            .into_iter()
            .map(|path| {
                let entry = Entry::file(&path);
                if self.entries.upsert(entry.clone()).is_none() {
                    debug!("Glob match {} is cached as a directory", entry.path());
                }
                entry.path().to_string()
            })
            .collect())
    }

    /// Stage a deletion of `path`, whatever it was cached as.
    pub fn delete_file(&mut self, path: &str) {
        let entry = self.record_file(path);
        self.ledger
            .stage(entry.key(), entry.path().to_string(), Change::Delete);
    }

    /// Stage `data` as the content of `path`. Last write wins.
    pub fn upsert_data(&mut self, path: &str, data: impl Into<String>) {
        let entry = self.record_file(path);
        self.ledger.stage(
            entry.key(),
            entry.path().to_string(),
            Change::Upsert(data.into()),
        );
    }

    fn record_file(&mut self, path: &str) -> Entry {
        let entry = Entry::file(&self.backend.resolve_path(path));
        if self.entries.upsert(entry.clone()).is_none() {
            debug!(
                "Staging a file change for {}, which is cached as a directory",
                entry.path()
            );
        }
        entry
    }

    /// Reconcile the ledger into one external command per staged path.
    ///
    /// Reads the ledger without draining it, so calling it twice yields the
    /// same list.
    pub fn build_external_commands(&self) -> Vec<ExternalCommand> {
        self.ledger
            .iter()
            .map(|(key, staged)| {
                let path = self
                    .entries
                    .get(key)
                    .map(Entry::path)
                    .unwrap_or(staged.path.as_str())
                    .to_string();
                match &staged.change {
                    Change::Delete => ExternalCommand::DeleteFile { path },
                    Change::Upsert(data) => ExternalCommand::UpsertFile {
                        path,
                        data: data.clone(),
                    },
                }
            })
            .collect()
    }

    pub fn entries(&self) -> &EntryCache {
        &self.entries
    }

    pub fn membership(&self) -> &MembershipIndex {
        &self.membership
    }

    pub fn ledger(&self) -> &ChangeLedger {
        &self.ledger
    }
}
