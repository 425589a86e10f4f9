//! # repomod
//!
//! A staged virtual file system plus a command interpreter for running
//! repository-wide transformations ("repomods") without touching the disk.
//!
//! ## Quick Example
//!
//! ```
//! use repomod::backend::MemoryBackend;
//! use repomod::command::{Command, ExternalCommand, Options};
//! use repomod::facade::FacadeFileSystem;
//! use repomod::interpreter;
//! use repomod::repomod::{DataApi, Repomod};
//!
//! struct Shout;
//!
//! impl Repomod for Shout {
//!     fn handle_data(
//!         &self,
//!         _api: &DataApi,
//!         path: &str,
//!         data: &str,
//!         _options: &Options,
//!     ) -> repomod::error::Result<Command> {
//!         Ok(Command::upsert_data(path, data.to_uppercase()))
//!     }
//! }
//!
//! let backend = MemoryBackend::new();
//! backend.add_file_string("/repo/hello.txt", "hi").unwrap();
//!
//! let fs = FacadeFileSystem::new(Box::new(backend));
//! let commands = interpreter::run(&Shout, fs, "/repo", Options::new()).unwrap();
//! assert_eq!(
//!     commands,
//!     vec![ExternalCommand::UpsertFile {
//!         path: "/repo/hello.txt".to_string(),
//!         data: "HI".to_string(),
//!     }]
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Backends (`backend`)**: the read-only store a run observes, either the
//!   host file system or an in-memory tree.
//! - **Facade (`facade`)**: the staged overlay over a backend. It caches what
//!   the run has seen (`cache`, `membership`) and records what the run wants
//!   to change (`ledger`), keyed by a digest of the canonical path (`key`).
//! - **Repomods (`repomod`)**: plugins with three optional hooks, each given
//!   a capability-scoped view of the facade.
//! - **Interpreter (`interpreter`)**: dispatches `command`s depth first,
//!   calling hooks and feeding their commands back into itself.
//! - **Declarative repomods (`config`, `operators`)**: YAML-described
//!   delete/rename/copy/replace transformations.
//! - **Apply (`apply`)**: writes the external commands of a finished run to
//!   disk.

pub mod apply;
pub mod backend;
pub mod cache;
pub mod command;
pub mod config;
pub mod error;
pub mod facade;
pub mod interpreter;
pub mod key;
pub mod ledger;
pub mod membership;
pub mod operators;
pub mod path;
pub mod repomod;

#[cfg(test)]
mod path_proptest;
