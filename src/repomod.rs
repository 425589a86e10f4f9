//! # Repomod Plugin Surface
//!
//! A repomod drives a run through three optional hooks. Each hook is a
//! [`Repomod`] trait method with a default implementation, and the defaults
//! are exactly what the interpreter does when a repomod does not care about
//! that step:
//!
//! - **`handle_directory`**: list the directory, emit `HandleDirectory` for
//!   child directories and `HandleFile` for everything else.
//! - **`handle_file`**: emit a single `UpsertFile` for the same path.
//! - **`handle_data`**: emit `Noop`.
//!
//! Hooks only see a capability-scoped view of the run:
//!
//! | Hook               | API              | Capabilities                                 |
//! |--------------------|------------------|----------------------------------------------|
//! | `handle_directory` | [`DirectoryApi`] | path utilities, list, exists, is-directory   |
//! | `handle_file`      | [`FileApi`]      | path utilities, read, exists, is-directory   |
//! | `handle_data`      | [`DataApi`]      | path utilities                               |
//!
//! None of them can stage a change directly; changes only happen through the
//! commands a hook returns.

use crate::command::{Command, Options};
use crate::error::Result;
use crate::facade::FacadeFileSystem;
use crate::path;

/// Path helpers available to every hook
pub trait PathUtils {
    fn dirname(&self, path: &str) -> Result<String> {
        path::dirname(path)
    }

    fn basename(&self, path: &str) -> Result<String> {
        path::basename(path)
    }

    fn join_paths(&self, base: &str, segments: &[&str]) -> Result<String> {
        path::join_paths(base, segments)
    }
}

/// What `handle_directory` may do
pub struct DirectoryApi<'a> {
    fs: &'a mut FacadeFileSystem,
}

impl<'a> DirectoryApi<'a> {
    pub(crate) fn new(fs: &'a mut FacadeFileSystem) -> Self {
        Self { fs }
    }

    /// Children of `path`, see [`FacadeFileSystem::list_directory`]
    pub fn list_directory(&mut self, path: &str) -> Result<Vec<String>> {
        self.fs.list_directory(path)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.fs.exists(path)
    }

    pub fn is_directory(&self, path: &str) -> bool {
        self.fs.is_directory(path)
    }
}

impl PathUtils for DirectoryApi<'_> {}

/// What `handle_file` may do
pub struct FileApi<'a> {
    fs: &'a FacadeFileSystem,
}

impl<'a> FileApi<'a> {
    pub(crate) fn new(fs: &'a FacadeFileSystem) -> Self {
        Self { fs }
    }

    /// Current content of `path`, see [`FacadeFileSystem::read_file`]
    pub fn read_file(&self, path: &str) -> Result<String> {
        self.fs.read_file(path)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.fs.exists(path)
    }

    pub fn is_directory(&self, path: &str) -> bool {
        self.fs.is_directory(path)
    }
}

impl PathUtils for FileApi<'_> {}

/// What `handle_data` may do
#[derive(Debug, Default)]
pub struct DataApi;

impl PathUtils for DataApi {}

/// The default directory hook: one traversal command per child.
pub fn walk_directory(
    api: &mut DirectoryApi<'_>,
    path: &str,
    options: &Options,
) -> Result<Vec<Command>> {
    let children = api.list_directory(path)?;
    Ok(children
        .into_iter()
        .map(|child| {
            if api.is_directory(&child) {
                Command::handle_directory(child, options.clone())
            } else {
                Command::handle_file(child, options.clone())
            }
        })
        .collect())
}

/// A transformation plugin
pub trait Repomod {
    /// Name used in logs
    fn name(&self) -> &str {
        "repomod"
    }

    /// Glob patterns selecting files for the fast path. When non-empty, every
    /// `HandleDirectory` first dispatches `HandleFile` for each match under
    /// that directory.
    fn include_patterns(&self) -> &[String] {
        &[]
    }

    fn exclude_patterns(&self) -> &[String] {
        &[]
    }

    fn handle_directory(
        &self,
        api: &mut DirectoryApi<'_>,
        path: &str,
        options: &Options,
    ) -> Result<Vec<Command>> {
        walk_directory(api, path, options)
    }

    fn handle_file(
        &self,
        _api: &FileApi<'_>,
        path: &str,
        options: &Options,
    ) -> Result<Vec<Command>> {
        Ok(vec![Command::upsert_file(path, options.clone())])
    }

    fn handle_data(
        &self,
        _api: &DataApi,
        _path: &str,
        _data: &str,
        _options: &Options,
    ) -> Result<Command> {
        Ok(Command::Noop)
    }
}
