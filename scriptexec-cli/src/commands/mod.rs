//! CLI command implementations
//!
//! Each submodule implements one subcommand and returns the text to print.

pub mod deploy;
pub mod init_config;

use anyhow::Result;

/// Common result type for CLI commands
pub type CommandResult = Result<String>;
