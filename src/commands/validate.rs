//! # Validate Command Implementation
//!
//! Parses a repomod configuration and compiles every glob and regular
//! expression in it, without touching any repository. This is a read-only
//! operation.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use repomod::config;
use repomod::operators::DeclarativeRepomod;

/// Validate a repomod configuration file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the repomod configuration file to validate.
    #[arg(short, long, value_name = "FILE", env = "REPOMOD_CONFIG")]
    pub config: PathBuf,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs) -> Result<()> {
    let config_path = &args.config;
    println!("Validating configuration: {}", config_path.display());

    let config = config::from_file(config_path)?;
    // The root only anchors relative matching; any absolute path compiles the same
    DeclarativeRepomod::new(&config, "/")?;

    println!(
        "Configuration is valid: {} operation(s), {} include pattern(s), {} exclude pattern(s)",
        config.operations.len(),
        config.include.len(),
        config.exclude.len()
    );
    for (index, operation) in config.operations.iter().enumerate() {
        println!("  {}. {}", index + 1, operation.name());
    }

    Ok(())
}
