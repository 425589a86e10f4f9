//! # Error Handling
//!
//! This module defines the centralized error type for `repomod`. It uses the
//! `thiserror` library to build a single `Error` enum covering every failure a
//! run can raise, with messages that carry enough context (paths, hook names,
//! operations) to diagnose a failed traversal.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum representing all possible errors.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Not every failure is an `Error`. Kind mismatches (a path expected to be a
//! file turns out to be a directory, or vice versa) are soft: the facade
//! reports them as `Ok(None)` and the interpreter abandons that branch.
//! Backing read failures are recovered into empty content unless the run uses
//! `ReadFailurePolicy::Error`, in which case they surface as
//! `Error::BackingRead`.

use thiserror::Error;

/// Main error type for repomod operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing a repomod configuration file.
    #[error("Configuration parsing error: {message}{}", render_hint(hint))]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A path string could not be interpreted (empty, or containing a NUL byte).
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// The run attempted to read a path it has already staged for deletion.
    #[error("File already deleted in this run: {path}")]
    AlreadyDeleted { path: String },

    /// The backing store failed to read a file and the run was configured to
    /// surface read failures.
    #[error("Backing read error for {path}: {message}")]
    BackingRead { path: String, message: String },

    /// A backing store primitive (describe, list, glob) failed.
    #[error("Backend error during {operation} of {path}: {message}")]
    Backend {
        operation: String,
        path: String,
        message: String,
    },

    /// A repomod hook reported a failure.
    #[error("Hook error in {hook}: {message}")]
    Hook { hook: String, message: String },

    /// A declarative operator could not be compiled or applied.
    #[error("Operator execution error: {operator} - {message}")]
    Operator { operator: String, message: String },

    /// An error occurred while applying external commands to the host
    /// filesystem.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration that is not valid YAML, or does not fit the schema
    /// in a way no hint covers.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

fn render_hint(hint: &Option<String>) -> String {
    hint.as_ref()
        .map(|h| format!("\n  hint: {}", h))
        .unwrap_or_default()
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
