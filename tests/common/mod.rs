//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new()
//!     .with_config(configs::DELETE_ORIG)
//!     .with_file("a.orig", "old");
//! fixture.command_with_config().arg("run").assert().success();
//! ```
//!
//! The fixture keeps the configuration file next to, not inside, the
//! repository directory so a run never visits its own configuration.

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Delete every `.orig` file.
    pub const DELETE_ORIG: &str = r#"
operations:
  - delete:
      patterns: ["**/*.orig"]
"#;

    /// Rename `.js` to `.ts` and rewrite `require(` calls.
    pub const JS_TO_TS: &str = r#"
name: js-to-ts
include: ["**/*.js"]
exclude: ["node_modules/**"]
operations:
  - rename:
      mappings:
        - from: "(.*)\\.js$"
          to: "$1.ts"
  - replace:
      patterns: ["**/*.ts"]
      find: "require\\("
      with: "import("
"#;

    /// Configuration with an operation that does not exist.
    pub const UNKNOWN_OPERATION: &str = r#"
operations:
  - template:
      patterns: ["*"]
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "invalid: yaml: content:";

    /// Empty configuration (comments only).
    pub const EMPTY: &str = "# repomod configuration\n";
}

/// A temporary directory holding a `repomod.yaml` and a `repo/` tree.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new fixture with an empty `repo/` directory.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("repo")
            .create_dir_all()
            .expect("Failed to create repo directory");
        Self { temp_dir }
    }

    /// Write `repomod.yaml` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("repomod.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a file under `repo/`.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.repo_child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Path to the temporary directory.
    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path to the repository directory, with symlinks resolved.
    pub fn repo_path(&self) -> PathBuf {
        self.temp_dir
            .path()
            .join("repo")
            .canonicalize()
            .expect("Failed to resolve repo directory")
    }

    /// Path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("repomod.yaml")
    }

    /// A child path under `repo/`.
    pub fn repo_child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child("repo").child(path)
    }

    /// Absolute path string of `path` under the resolved repo directory.
    #[allow(dead_code)]
    pub fn repo_file(&self, path: &str) -> String {
        self.repo_path().join(path).to_string_lossy().into_owned()
    }

    /// A command for the repomod binary, run from the repository directory.
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repomod");
        cmd.current_dir(self.repo_path());
        cmd
    }

    /// `command()` with `--config` already pointing at the fixture config.
    #[allow(dead_code)]
    pub fn command_with_config(&self, subcommand: &str) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg(subcommand).arg("--config").arg(self.config_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
