//! Host filesystem backend

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use super::{Backend, GlobQuery};
use crate::cache::{Entry, EntryKind};
use crate::error::{Error, Result};
use crate::path::{canonicalize, compile_patterns, relative_to, selected_by};

/// Directory names never listed or walked by default
const DEFAULT_IGNORED: &[&str] = &[".git"];

/// Backend over the real host filesystem
#[derive(Debug, Clone)]
pub struct HostBackend {
    ignored: Vec<String>,
}

impl Default for HostBackend {
    fn default() -> Self {
        Self {
            ignored: DEFAULT_IGNORED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl HostBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of ignored directory names.
    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored = names.into_iter().map(Into::into).collect();
        self
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignored.iter().any(|ignored| ignored == name)
    }

    /// `path` made absolute against the working directory.
    fn absolute(path: &str) -> Result<PathBuf> {
        let path = Path::new(path);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(std::env::current_dir()?.join(path))
        }
    }
}

fn path_string(path: &Path) -> String {
    canonicalize(&path.to_string_lossy())
}

impl Backend for HostBackend {
    fn resolve_path(&self, path: &str) -> String {
        match Self::absolute(path) {
            Ok(absolute) => path_string(&absolute),
            Err(e) => {
                debug!("Cannot resolve {} against the working directory: {}", path, e);
                canonicalize(path)
            }
        }
    }

    fn describe_path(&self, path: &str) -> Result<Option<EntryKind>> {
        match fs::metadata(Self::absolute(path)?) {
            Ok(metadata) if metadata.is_dir() => Ok(Some(EntryKind::Directory)),
            Ok(metadata) if metadata.is_file() => Ok(Some(EntryKind::File)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Backend {
                operation: "describe".to_string(),
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn list_directory_children(&self, path: &str) -> Result<Vec<Entry>> {
        let read_dir = fs::read_dir(Self::absolute(path)?).map_err(|e| Error::Backend {
            operation: "list".to_string(),
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let mut children = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            let name = dir_entry.file_name();
            if self.is_ignored(&name.to_string_lossy()) {
                continue;
            }

            let child = dir_entry.path();
            let Some(kind) = classify(&child) else {
                debug!("Skipping unclassifiable entry {}", child.display());
                continue;
            };
            children.push(Entry::new(kind, &path_string(&child)));
        }

        children.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(children)
    }

    fn read_file(&self, path: &str) -> Result<String> {
        fs::read_to_string(Self::absolute(path)?).map_err(|e| Error::BackingRead {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn match_glob(&self, query: &GlobQuery) -> Result<Vec<String>> {
        let include = compile_patterns(&query.include)?;
        let exclude = compile_patterns(&query.exclude)?;
        let base_dir = Self::absolute(&query.base_dir)?;
        let base = path_string(&base_dir);

        let walker = walkdir::WalkDir::new(&base_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !self.is_ignored(&e.file_name().to_string_lossy())
            });

        let mut matches = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", base, e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let absolute = path_string(entry.path());
            let Some(relative) = relative_to(&base, &absolute) else {
                continue;
            };
            if selected_by(&relative, &include, &exclude) {
                matches.push(absolute);
            }
        }

        debug!(
            "Glob {:?} under {} matched {} file(s)",
            query.include,
            base,
            matches.len()
        );
        Ok(matches)
    }
}

/// Kind of the entry at `path`, following symlinks. Dangling links and
/// special files have none.
fn classify(path: &Path) -> Option<EntryKind> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Some(EntryKind::Directory),
        Ok(metadata) if metadata.is_file() => Some(EntryKind::File),
        _ => None,
    }
}
