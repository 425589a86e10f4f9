//! Writing a run's external commands to disk
//!
//! The interpreter never touches the host file system. Once a run has
//! produced its [`ExternalCommand`]s, [`execute`] carries them out in order:
//!
//! 1.  **Check**: every command path must live under `root`. The check runs
//!     over the whole list before anything is written.
//!
//! 2.  **Upsert**: creates missing parent directories and writes the content.
//!
//! 3.  **Delete**: removes the file. A file that is already gone is counted as
//!     missing and logged, not treated as an error.
//!
//! Applying is not atomic. If a write fails halfway, the commands before it
//! stay applied.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, warn};
use serde::Serialize;

use crate::command::ExternalCommand;
use crate::error::{Error, Result};
use crate::path::relative_to;

/// What [`execute`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub written: usize,
    pub deleted: usize,
    /// Deletions whose file did not exist
    pub missing: usize,
}

/// Apply `commands` to the host file system under `root`.
pub fn execute(commands: &[ExternalCommand], root: &Path) -> Result<ApplySummary> {
    let root = root.to_string_lossy();
    if let Some(outside) = commands
        .iter()
        .find(|command| relative_to(&root, command.path()).is_none())
    {
        return Err(Error::Filesystem {
            message: format!("Refusing to apply '{}' outside {}", outside.path(), root),
        });
    }

    let mut summary = ApplySummary::default();
    for command in commands {
        match command {
            ExternalCommand::UpsertFile { path, data } => {
                let full_path = Path::new(path);
                if let Some(parent) = full_path.parent() {
                    fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                        message: format!(
                            "Failed to create directory '{}': {}",
                            parent.display(),
                            e
                        ),
                    })?;
                }
                fs::write(full_path, data).map_err(|e| Error::Filesystem {
                    message: format!("Failed to write file '{}': {}", path, e),
                })?;
                debug!("Wrote {}", path);
                summary.written += 1;
            }
            ExternalCommand::DeleteFile { path } => match fs::remove_file(path) {
                Ok(()) => {
                    debug!("Deleted {}", path);
                    summary.deleted += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!("Cannot delete {}: it no longer exists", path);
                    summary.missing += 1;
                }
                Err(e) => {
                    return Err(Error::Filesystem {
                        message: format!("Failed to delete file '{}': {}", path, e),
                    })
                }
            },
        }
    }

    Ok(summary)
}
