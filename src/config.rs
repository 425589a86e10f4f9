//! # Declarative Repomod Configuration
//!
//! Most transformations do not need compiled hooks. A `repomod.yaml` file
//! describes which files a run should touch and what to do with them, and
//! [`DeclarativeRepomod`](crate::operators::DeclarativeRepomod) turns it into
//! a [`Repomod`](crate::repomod::Repomod).
//!
//! ```yaml
//! name: js-to-ts
//! include: ["**/*.js", "**/*.orig"]
//! exclude: ["node_modules/**"]
//! read_failures: empty        # or: error
//! options:
//!   owner: platform
//! operations:
//!   - delete:
//!       patterns: ["**/*.orig"]
//!   - rename:
//!       mappings:
//!         - from: "(.*)\\.js$"
//!           to: "$1.ts"
//!   - copy:
//!       mappings:
//!         - from: "(.*)\\.env\\.example$"
//!           to: "$1.env"
//!   - replace:
//!       patterns: ["**/*.ts"]
//!       find: "require\\("
//!       with: "import("
//! ```
//!
//! Every pattern and mapping is matched against the path relative to the run
//! root. `include`/`exclude` feed the interpreter's glob fast path; without
//! `include` the run visits every file in the tree.

use crate::command::Options;
use crate::error::{Error, Result};
use crate::facade::ReadFailurePolicy;
use serde::{Deserialize, Serialize};

/// Operation names accepted in `operations`
pub const OPERATION_NAMES: &[&str] = &["delete", "rename", "copy", "replace"];

/// Delete operator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteOp {
    /// Glob patterns selecting files to delete.
    pub patterns: Vec<String>,
}

/// Path mapping used by `rename` and `copy`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMapping {
    /// A regular expression used to match relative file paths.
    pub from: String,
    /// The new relative path. May reference capture groups from `from`
    /// (`$1`, `$2`, ...).
    pub to: String,
}

/// Rename operator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameOp {
    /// List of rename mappings; the first one that matches wins
    pub mappings: Vec<PathMapping>,
}

/// Copy operator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyOp {
    /// List of copy mappings; every matching mapping produces a copy
    pub mappings: Vec<PathMapping>,
}

/// Replace operator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceOp {
    /// Glob patterns selecting files whose content is rewritten.
    pub patterns: Vec<String>,
    /// Regular expression to search for.
    pub find: String,
    /// Replacement text. May reference capture groups from `find`.
    pub with: String,
}

/// All possible operation types in the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operation {
    /// Delete matching files.
    Delete { delete: DeleteOp },
    /// Move matching files to a new path.
    Rename { rename: RenameOp },
    /// Copy matching files to a new path, keeping the original.
    Copy { copy: CopyOp },
    /// Rewrite the content of matching files.
    Replace { replace: ReplaceOp },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Delete { .. } => "delete",
            Operation::Rename { .. } => "rename",
            Operation::Copy { .. } => "copy",
            Operation::Replace { .. } => "replace",
        }
    }
}

/// A complete declarative repomod
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepomodConfig {
    /// Name used in logs
    #[serde(default)]
    pub name: Option<String>,
    /// Glob patterns for the fast path
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// What to do when a file cannot be read from disk
    #[serde(default)]
    pub read_failures: ReadFailurePolicy,
    /// Initial options threaded to every hook
    #[serde(default)]
    pub options: Options,
    /// Operations, applied in order
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// Parses a YAML string into a `RepomodConfig`.
///
/// An empty document (or one holding only comments) is a valid, empty
/// configuration.
pub fn parse(yaml_content: &str) -> Result<RepomodConfig> {
    if yaml_content.trim().is_empty()
        || matches!(
            serde_yaml::from_str::<serde_yaml::Value>(yaml_content),
            Ok(serde_yaml::Value::Null)
        )
    {
        return Ok(RepomodConfig::default());
    }

    match serde_yaml::from_str::<RepomodConfig>(yaml_content) {
        Ok(config) => Ok(config),
        Err(e) => Err(explain_parse_error(yaml_content, e)),
    }
}

/// Turn a serde error into something that points at the offending operation
/// when possible. Anything else stays a plain `Error::Yaml`.
fn explain_parse_error(yaml_content: &str, error: serde_yaml::Error) -> Error {
    use serde_yaml::Value;

    let operations = serde_yaml::from_str::<Value>(yaml_content)
        .ok()
        .and_then(|value| value.get("operations").cloned());

    if let Some(Value::Sequence(operations)) = operations {
        for (index, operation) in operations.iter().enumerate() {
            let Value::Mapping(map) = operation else {
                return Error::ConfigParse {
                    message: format!("Operation #{} is not a mapping", index + 1),
                    hint: Some("Write each operation as `- <name>: {...}`".to_string()),
                };
            };
            for key in map.keys() {
                let name = key.as_str().unwrap_or("<non-string>");
                if !OPERATION_NAMES.contains(&name) {
                    return Error::ConfigParse {
                        message: format!("Unknown operation '{}' at #{}", name, index + 1),
                        hint: Some(format!(
                            "Supported operations: {}",
                            OPERATION_NAMES.join(", ")
                        )),
                    };
                }
            }
        }
    }

    Error::Yaml(error)
}

/// Reads and parses a configuration file.
pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<RepomodConfig> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
