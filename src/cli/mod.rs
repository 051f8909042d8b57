//! cli
//!
//! Command-line interface for the submitter.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and install logging
//! - Delegate to command handlers
//!
//! The CLI layer is thin: handlers build a [`Submitter`](crate::submit::Submitter)
//! or the server from the loaded [`Config`] and report the outcome.

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::Result;

use crate::core::config::{Config, LogFormat};
use crate::telemetry::{self, LogSettings, Verbosity};

/// Shared state for command handlers.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration
    pub config: Config,
    /// Suppress informational output
    pub quiet: bool,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config = Config::load(cli.config.as_deref())?;

    let verbosity = if cli.debug {
        Verbosity::Debug
    } else if cli.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    };
    telemetry::init(&LogSettings {
        level: config.log_level().to_string(),
        format: if cli.json_logs {
            LogFormat::Json
        } else {
            config.log_format()
        },
        verbosity,
    })?;

    let ctx = Context {
        config,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
