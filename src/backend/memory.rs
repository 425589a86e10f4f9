//! In-memory backend for fast, disk-free runs

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Backend, GlobQuery};
use crate::cache::{Entry, EntryKind};
use crate::error::{Error, Result};
use crate::path::{canonicalize, compile_patterns, dirname, relative_to, selected_by};

#[derive(Debug, Default)]
struct MemoryTree {
    /// Canonical path -> content
    files: BTreeMap<String, String>,
    /// Canonical directory paths, including every ancestor of a file
    directories: BTreeSet<String>,
}

impl MemoryTree {
    fn add_ancestors(&mut self, path: &str) -> Result<()> {
        let mut current = dirname(path)?;
        loop {
            let parent = dirname(&current)?;
            let done = parent == current;
            self.directories.insert(current.clone());
            if done {
                return Ok(());
            }
            current = parent;
        }
    }
}

/// In-memory store of files and directories
///
/// Clones share the same storage, so a test can keep a handle and change the
/// store after handing a clone to a facade.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    tree: Arc<Mutex<MemoryTree>>,
}

impl MemoryBackend {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryTree>> {
        self.tree.lock().map_err(|_| Error::LockPoisoned {
            context: "memory backend".to_string(),
        })
    }

    /// Add or update a file with string content, creating its ancestors
    pub fn add_file_string(&self, path: &str, content: &str) -> Result<()> {
        let path = canonicalize(path);
        let mut tree = self.lock()?;
        if tree.directories.contains(&path) {
            return Err(Error::Filesystem {
                message: format!("Cannot create file over directory: {}", path),
            });
        }
        tree.add_ancestors(&path)?;
        tree.files.insert(path, content.to_string());
        Ok(())
    }

    /// Add an (empty) directory and its ancestors
    pub fn add_directory(&self, path: &str) -> Result<()> {
        let path = canonicalize(path);
        let mut tree = self.lock()?;
        if tree.files.contains_key(&path) {
            return Err(Error::Filesystem {
                message: format!("Cannot create directory over file: {}", path),
            });
        }
        tree.add_ancestors(&path)?;
        tree.directories.insert(path);
        Ok(())
    }

    /// Remove a file, returning its content
    pub fn remove_file(&self, path: &str) -> Result<Option<String>> {
        Ok(self.lock()?.files.remove(&canonicalize(path)))
    }

    /// Check if a file or directory exists
    pub fn exists(&self, path: &str) -> bool {
        let path = canonicalize(path);
        self.lock()
            .map(|tree| tree.files.contains_key(&path) || tree.directories.contains(&path))
            .unwrap_or(false)
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.lock().map(|tree| tree.files.len()).unwrap_or(0)
    }

    /// Check if the store has no files
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Backend for MemoryBackend {
    fn describe_path(&self, path: &str) -> Result<Option<EntryKind>> {
        let path = canonicalize(path);
        let tree = self.lock()?;
        if tree.directories.contains(&path) {
            Ok(Some(EntryKind::Directory))
        } else if tree.files.contains_key(&path) {
            Ok(Some(EntryKind::File))
        } else {
            Ok(None)
        }
    }

    fn list_directory_children(&self, path: &str) -> Result<Vec<Entry>> {
        let path = canonicalize(path);
        let tree = self.lock()?;
        if !tree.directories.contains(&path) {
            return Err(Error::Backend {
                operation: "list".to_string(),
                path,
                message: "not a directory".to_string(),
            });
        }

        let is_child = |candidate: &String| {
            candidate != &path && dirname(candidate).is_ok_and(|parent| parent == path)
        };
        let mut children: Vec<Entry> = tree
            .directories
            .iter()
            .filter(|candidate| is_child(candidate))
            .map(|dir| Entry::directory(dir))
            .chain(
                tree.files
                    .keys()
                    .filter(|candidate| is_child(candidate))
                    .map(|file| Entry::file(file)),
            )
            .collect();
        children.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(children)
    }

    fn read_file(&self, path: &str) -> Result<String> {
        let path = canonicalize(path);
        self.lock()?
            .files
            .get(&path)
            .cloned()
            .ok_or_else(|| Error::BackingRead {
                path,
                message: "no such file".to_string(),
            })
    }

    fn match_glob(&self, query: &GlobQuery) -> Result<Vec<String>> {
        let include = compile_patterns(&query.include)?;
        let exclude = compile_patterns(&query.exclude)?;
        let base = canonicalize(&query.base_dir);
        let tree = self.lock()?;

        Ok(tree
            .files
            .keys()
            .filter(|file| {
                relative_to(&base, file)
                    .is_some_and(|relative| selected_by(&relative, &include, &exclude))
            })
            .cloned()
            .collect())
    }
}
