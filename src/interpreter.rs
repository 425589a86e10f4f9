//! # Command Interpreter
//!
//! Walks a root path by dispatching [`Command`]s against a
//! [`FacadeFileSystem`], calling [`Repomod`] hooks and feeding the commands
//! they return back into itself.
//!
//! ## Ordering
//!
//! Dispatch is depth-first and sequential: when a step produces several
//! commands, the first one and everything it produces resolve completely
//! before the second one starts. Two commands touching the same path
//! therefore never interleave, and a run over the same tree always stages
//! changes in the same order.
//!
//! The walk uses an explicit stack instead of native recursion, so an
//! arbitrarily deep hook tree cannot overflow the thread stack. Children are
//! pushed in reverse so the first child is popped first.
//!
//! ## Commands
//!
//! | Command           | Effect                                                           |
//! |-------------------|------------------------------------------------------------------|
//! | `HandleDirectory` | include fast path, then `upsert_directory` + `handle_directory`  |
//! | `HandleFile`      | `upsert_file` + `handle_file`                                    |
//! | `UpsertFile`      | read through the facade + `handle_data`                          |
//! | `DeleteFile`      | stage a deletion                                                 |
//! | `UpsertData`      | stage content                                                    |
//! | `MoveFile`        | read old, stage content at new, stage deletion of old            |
//! | `CopyFile`        | read old, stage content at new                                   |
//! | `Noop`            | nothing                                                          |
//!
//! ## Failure
//!
//! Any error from a hook or the backend aborts the run. Changes staged before
//! the failure are not rolled back, and [`Interpreter::run`] consumes the
//! interpreter so the partial ledger is dropped with it.

use log::{debug, info, trace};

use crate::cache::EntryKind;
use crate::command::{Command, ExternalCommand, Options};
use crate::error::Result;
use crate::facade::FacadeFileSystem;
use crate::repomod::{DataApi, DirectoryApi, FileApi, Repomod};

/// Counters collected over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Commands popped off the stack and dispatched
    pub commands: usize,
    /// Traversal branches dropped because the path had the wrong kind or did
    /// not exist
    pub abandoned: usize,
    /// Repomod hook invocations
    pub hook_calls: usize,
    /// Largest number of pending frames at once
    pub peak_pending: usize,
}

enum Frame {
    Dispatch(Command),
    /// Directory stage of a `HandleDirectory`, run once its fast-path
    /// matches have resolved
    EnterDirectory { path: String, options: Options },
}

pub struct Interpreter<'r> {
    repomod: &'r dyn Repomod,
    fs: FacadeFileSystem,
    stats: RunStats,
}

impl<'r> Interpreter<'r> {
    pub fn new(repomod: &'r dyn Repomod, fs: FacadeFileSystem) -> Self {
        Self {
            repomod,
            fs,
            stats: RunStats::default(),
        }
    }

    pub fn filesystem(&self) -> &FacadeFileSystem {
        &self.fs
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Run the traversal from `root` and reconcile the staged changes.
    ///
    /// A root that is neither a file nor a directory yields no commands.
    pub fn run(mut self, root: &str, options: Options) -> Result<Vec<ExternalCommand>> {
        let initial = match self.fs.upsert_entry(root)? {
            Some(entry) => match entry.kind() {
                EntryKind::Directory => Command::handle_directory(entry.path(), options),
                EntryKind::File => Command::handle_file(entry.path(), options),
            },
            None => {
                info!("Nothing found at {}, no changes staged", root);
                return Ok(Vec::new());
            }
        };

        self.execute(initial)?;

        let commands = self.fs.build_external_commands();
        info!(
            "Repomod '{}' finished: {} command(s), {} abandoned branch(es), {} staged change(s)",
            self.repomod.name(),
            self.stats.commands,
            self.stats.abandoned,
            commands.len()
        );
        Ok(commands)
    }

    /// Dispatch `command` and everything it produces, depth first.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        let mut pending = vec![Frame::Dispatch(command)];

        while let Some(frame) = pending.pop() {
            let produced = match frame {
                Frame::Dispatch(command) => {
                    self.stats.commands += 1;
                    self.dispatch(command)?
                }
                Frame::EnterDirectory { path, options } => {
                    self.enter_directory(&path, &options)?
                }
            };
            pending.extend(produced.into_iter().rev());
            self.stats.peak_pending = self.stats.peak_pending.max(pending.len());
        }

        Ok(())
    }

    fn dispatch(&mut self, command: Command) -> Result<Vec<Frame>> {
        let repomod = self.repomod;
        trace!("Dispatching {}", command.kind());

        match command {
            Command::HandleDirectory { path, options } => {
                let mut frames = Vec::new();
                let include = repomod.include_patterns();
                if !include.is_empty() {
                    let matches =
                        self.fs
                            .list_matching_paths(&path, include, repomod.exclude_patterns())?;
                    debug!("{} fast-path match(es) under {}", matches.len(), path);
                    frames.extend(matches.into_iter().map(|file| {
                        Frame::Dispatch(Command::handle_file(file, options.clone()))
                    }));
                }
                frames.push(Frame::EnterDirectory { path, options });
                Ok(frames)
            }

            Command::HandleFile { path, options } => {
                if self.fs.upsert_file(&path)?.is_none() {
                    debug!("Abandoning file branch at {}", path);
                    self.stats.abandoned += 1;
                    return Ok(Vec::new());
                }
                self.stats.hook_calls += 1;
                let api = FileApi::new(&self.fs);
                let commands = repomod.handle_file(&api, &path, &options)?;
                Ok(commands.into_iter().map(Frame::Dispatch).collect())
            }

            Command::UpsertFile { path, options } => {
                let data = self.fs.read_file(&path)?;
                self.stats.hook_calls += 1;
                let command = repomod.handle_data(&DataApi, &path, &data, &options)?;
                Ok(vec![Frame::Dispatch(command)])
            }

            Command::DeleteFile { path, .. } => {
                self.fs.delete_file(&path);
                Ok(Vec::new())
            }

            Command::UpsertData { path, data } => {
                self.fs.upsert_data(&path, data);
                Ok(Vec::new())
            }

            Command::MoveFile {
                old_path, new_path, ..
            } => {
                if self.fs.key_of(&old_path) == self.fs.key_of(&new_path) {
                    debug!("Ignoring move of {} onto itself", old_path);
                    return Ok(Vec::new());
                }
                let data = self.fs.read_file(&old_path)?;
                self.fs.upsert_data(&new_path, data);
                self.fs.delete_file(&old_path);
                Ok(Vec::new())
            }

            Command::CopyFile {
                old_path, new_path, ..
            } => {
                if self.fs.key_of(&old_path) == self.fs.key_of(&new_path) {
                    debug!("Ignoring copy of {} onto itself", old_path);
                    return Ok(Vec::new());
                }
                let data = self.fs.read_file(&old_path)?;
                self.fs.upsert_data(&new_path, data);
                Ok(Vec::new())
            }

            Command::Noop => Ok(Vec::new()),
        }
    }

    fn enter_directory(&mut self, path: &str, options: &Options) -> Result<Vec<Frame>> {
        if self.fs.upsert_directory(path)?.is_none() {
            debug!("Abandoning directory branch at {}", path);
            self.stats.abandoned += 1;
            return Ok(Vec::new());
        }
        self.stats.hook_calls += 1;
        let repomod = self.repomod;
        let mut api = DirectoryApi::new(&mut self.fs);
        let commands = repomod.handle_directory(&mut api, path, options)?;
        Ok(commands.into_iter().map(Frame::Dispatch).collect())
    }
}

/// Run `repomod` over `root` with a fresh facade around `fs`.
pub fn run(
    repomod: &dyn Repomod,
    fs: FacadeFileSystem,
    root: &str,
    options: Options,
) -> Result<Vec<ExternalCommand>> {
    Interpreter::new(repomod, fs).run(root, options)
}
