//! # CLI Command Implementations
//!
//! Each subcommand of the `repomod` tool lives in its own file with:
//! - An `Args` struct deriving `clap::Args`.
//! - An `execute` function that takes the parsed `Args`, calls into the
//!   `repomod` library and reports the result.

pub mod run;
pub mod validate;
