//! # repomod CLI
//!
//! Binary entry point for the `repomod` command-line tool.
//!
//! It parses arguments with `clap`, sets up logging and hands off to the
//! selected subcommand. All transformation logic lives in the library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
