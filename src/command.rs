//! Commands exchanged between repomod hooks and the interpreter, and the
//! reconciled external commands a run produces.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Free-form options threaded through the dispatch
pub type Options = HashMap<String, String>;

/// One pending unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Traversal
    HandleDirectory {
        path: String,
        options: Options,
    },
    HandleFile {
        path: String,
        options: Options,
    },

    // File
    UpsertFile {
        path: String,
        options: Options,
    },
    DeleteFile {
        path: String,
        options: Option<Options>,
    },
    MoveFile {
        old_path: String,
        new_path: String,
        options: Options,
    },
    CopyFile {
        old_path: String,
        new_path: String,
        options: Options,
    },

    // Data
    UpsertData {
        path: String,
        data: String,
    },
    Noop,
}

impl Command {
    pub fn handle_directory(path: impl Into<String>, options: Options) -> Self {
        Command::HandleDirectory {
            path: path.into(),
            options,
        }
    }

    pub fn handle_file(path: impl Into<String>, options: Options) -> Self {
        Command::HandleFile {
            path: path.into(),
            options,
        }
    }

    pub fn upsert_file(path: impl Into<String>, options: Options) -> Self {
        Command::UpsertFile {
            path: path.into(),
            options,
        }
    }

    pub fn delete_file(path: impl Into<String>) -> Self {
        Command::DeleteFile {
            path: path.into(),
            options: None,
        }
    }

    pub fn move_file(
        old_path: impl Into<String>,
        new_path: impl Into<String>,
        options: Options,
    ) -> Self {
        Command::MoveFile {
            old_path: old_path.into(),
            new_path: new_path.into(),
            options,
        }
    }

    pub fn copy_file(
        old_path: impl Into<String>,
        new_path: impl Into<String>,
        options: Options,
    ) -> Self {
        Command::CopyFile {
            old_path: old_path.into(),
            new_path: new_path.into(),
            options,
        }
    }

    pub fn upsert_data(path: impl Into<String>, data: impl Into<String>) -> Self {
        Command::UpsertData {
            path: path.into(),
            data: data.into(),
        }
    }

    /// Name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Command::HandleDirectory { .. } => "handleDirectory",
            Command::HandleFile { .. } => "handleFile",
            Command::UpsertFile { .. } => "upsertFile",
            Command::DeleteFile { .. } => "deleteFile",
            Command::MoveFile { .. } => "moveFile",
            Command::CopyFile { .. } => "copyFile",
            Command::UpsertData { .. } => "upsertData",
            Command::Noop => "noop",
        }
    }
}

/// A reconciled instruction for whoever applies the run to a real store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExternalCommand {
    UpsertFile { path: String, data: String },
    DeleteFile { path: String },
}

impl ExternalCommand {
    pub fn path(&self) -> &str {
        match self {
            ExternalCommand::UpsertFile { path, .. } | ExternalCommand::DeleteFile { path } => path,
        }
    }
}
