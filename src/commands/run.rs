//! Run command implementation
//!
//! Loads a declarative repomod, runs it over a directory through the host
//! backend and prints the external commands it produced. Nothing is written
//! unless `--apply` is given.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use repomod::apply;
use repomod::backend::HostBackend;
use repomod::command::ExternalCommand;
use repomod::config;
use repomod::facade::{FacadeFileSystem, ReadFailurePolicy};
use repomod::interpreter;
use repomod::operators::DeclarativeRepomod;

/// How the resulting commands are printed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the repomod configuration file
    #[arg(short, long, value_name = "FILE", env = "REPOMOD_CONFIG")]
    pub config: PathBuf,

    /// Directory to run over (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output format for the resulting commands
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the resulting changes to disk
    #[arg(long)]
    pub apply: bool,

    /// Fail the run when a file cannot be read, instead of treating it as empty
    #[arg(long)]
    pub strict_reads: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the run command
pub fn execute(args: RunArgs) -> Result<()> {
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }
    let config = config::from_file(&args.config)?;

    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let root = std::fs::canonicalize(&root)
        .with_context(|| format!("Cannot resolve root directory {}", root.display()))?;
    let root_str = root.to_string_lossy().into_owned();

    let read_failures = if args.strict_reads {
        ReadFailurePolicy::Error
    } else {
        config.read_failures
    };

    let repomod = DeclarativeRepomod::new(&config, &root_str)?;
    let fs = FacadeFileSystem::new(Box::new(HostBackend::new())).with_read_failures(read_failures);
    let commands = interpreter::run(&repomod, fs, &root_str, config.options.clone())?;

    if !args.quiet {
        print!("{}", render(&commands, args.format)?);
    }

    if args.apply {
        let summary = apply::execute(&commands, &root)?;
        if !args.quiet {
            println!(
                "Applied: {} written, {} deleted, {} already missing",
                summary.written, summary.deleted, summary.missing
            );
        }
    }

    Ok(())
}

/// Render external commands in the requested format
pub fn render(commands: &[ExternalCommand], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(commands)?),
        OutputFormat::Yaml => serde_yaml::to_string(commands)?,
        OutputFormat::Text => {
            if commands.is_empty() {
                return Ok("No changes\n".to_string());
            }
            let mut out = String::new();
            for command in commands {
                match command {
                    ExternalCommand::UpsertFile { path, data } => {
                        out.push_str(&format!("upsert {} ({} bytes)\n", path, data.len()))
                    }
                    ExternalCommand::DeleteFile { path } => {
                        out.push_str(&format!("delete {}\n", path))
                    }
                }
            }
            out.push_str(&format!("{} change(s)\n", commands.len()));
            out
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(config: PathBuf, root: Option<PathBuf>) -> RunArgs {
        RunArgs {
            config,
            root,
            format: OutputFormat::Text,
            apply: false,
            strict_reads: false,
            quiet: true,
        }
    }

    fn sample_commands() -> Vec<ExternalCommand> {
        vec![
            ExternalCommand::UpsertFile {
                path: "/repo/a.ts".to_string(),
                data: "abc".to_string(),
            },
            ExternalCommand::DeleteFile {
                path: "/repo/a.js".to_string(),
            },
        ]
    }

    #[test]
    fn test_execute_missing_config() {
        let result = execute(args(PathBuf::from("/nonexistent/repomod.yaml"), None));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Configuration file not found"));
    }

    #[test]
    fn test_execute_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("repomod.yaml");
        fs::write(&config_path, "operations: []").unwrap();

        let result = execute(args(config_path, Some(temp_dir.path().join("missing"))));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Cannot resolve root directory"));
    }

    #[test]
    fn test_execute_apply_writes_changes() {
        let temp_dir = TempDir::new().unwrap();
        let repo = temp_dir.path().join("repo");
        fs::create_dir_all(repo.join("src")).unwrap();
        fs::write(repo.join("src/main.js"), "require('a')").unwrap();
        let config_path = temp_dir.path().join("repomod.yaml");
        fs::write(
            &config_path,
            r#"
include: ["**/*.js"]
operations:
  - rename:
      mappings:
        - from: "(.*)\\.js$"
          to: "$1.ts"
"#,
        )
        .unwrap();

        let mut run_args = args(config_path, Some(repo.clone()));
        run_args.apply = true;
        execute(run_args).unwrap();

        assert!(!repo.join("src/main.js").exists());
        assert_eq!(
            fs::read_to_string(repo.join("src/main.ts")).unwrap(),
            "require('a')"
        );
    }

    #[test]
    fn test_execute_without_apply_leaves_disk_alone() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.orig"), "x").unwrap();
        let config_path = temp_dir.path().join("repomod.yaml");
        fs::write(
            &config_path,
            "operations:\n  - delete:\n      patterns: ['*.orig']\n",
        )
        .unwrap();

        execute(args(config_path, Some(temp_dir.path().to_path_buf()))).unwrap();
        assert!(temp_dir.path().join("a.orig").exists());
    }

    #[test]
    fn test_render_text() {
        let text = render(&sample_commands(), OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "upsert /repo/a.ts (3 bytes)\ndelete /repo/a.js\n2 change(s)\n"
        );
        assert_eq!(render(&[], OutputFormat::Text).unwrap(), "No changes\n");
    }

    #[test]
    fn test_render_json_parses_back() {
        let json = render(&sample_commands(), OutputFormat::Json).unwrap();
        let parsed: Vec<ExternalCommand> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample_commands());
    }

    #[test]
    fn test_render_yaml() {
        let yaml = render(&sample_commands(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("kind: upsertFile"));
        assert!(yaml.contains("kind: deleteFile"));
    }
}
