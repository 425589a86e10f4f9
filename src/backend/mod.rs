//! # Backing Store Collaborators
//!
//! The overlay never touches a real store directly. Everything it needs from
//! one (classifying a path, listing a directory, reading a file, expanding a
//! glob) goes through the [`Backend`] trait, which is injected into the
//! [`FacadeFileSystem`](crate::facade::FacadeFileSystem) at construction.
//!
//! Two implementations ship with the crate:
//!
//! - **[`HostBackend`]**: the host filesystem, via `std::fs`, `walkdir` and
//!   `glob`.
//! - **[`MemoryBackend`]**: an in-memory tree, used by tests, benchmarks and
//!   anywhere a run should not depend on disk state.
//!
//! Tests that need to observe or fail individual calls implement the trait
//! directly with a mock.

mod host;
mod memory;

pub use host::HostBackend;
pub use memory::MemoryBackend;

use crate::cache::{Entry, EntryKind};
use crate::error::Result;
use crate::path::canonicalize;

/// Parameters of a glob expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobQuery {
    /// Patterns a path must match (any of), relative to `base_dir`
    pub include: Vec<String>,
    /// Patterns that reject a path (any of), relative to `base_dir`
    pub exclude: Vec<String>,
    /// Directory the expansion is restricted to
    pub base_dir: String,
}

/// Capability contract for a real store
pub trait Backend: Send + Sync {
    /// The single spelling of `path` this store keys on.
    ///
    /// The facade resolves every incoming path through here before deriving
    /// a key, so two spellings of one location must resolve to the same
    /// string. Stores without a working directory only need lexical
    /// canonicalization.
    fn resolve_path(&self, path: &str) -> String {
        canonicalize(path)
    }

    /// Classify `path`. `Ok(None)` means the store has nothing there.
    fn describe_path(&self, path: &str) -> Result<Option<EntryKind>>;

    /// Current children of the directory at `path`.
    fn list_directory_children(&self, path: &str) -> Result<Vec<Entry>>;

    /// Content of the file at `path`.
    fn read_file(&self, path: &str) -> Result<String>;

    /// Files under `query.base_dir` selected by the query, as absolute paths.
    fn match_glob(&self, query: &GlobQuery) -> Result<Vec<String>>;
}
