//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read settings from this TOML file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Only log warnings and errors
//! - `--json-logs`: Emit logs as JSON lines

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::CONFIG_ENV;

/// Media type assumed for documents read from files or stdin.
pub const DEFAULT_CONTENT_TYPE: &str = "application/ld+json";

/// smp-submit - Submit software metadata to GitHub repositories as pull requests
#[derive(Parser, Debug)]
#[command(name = "smp-submit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "PATH", env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP submission service until interrupted
    Serve {
        /// Address to listen on (overrides server.listen)
        #[arg(long, value_name = "ADDR")]
        listen: Option<SocketAddr>,
    },

    /// Submit a metadata document and print the pull request URL
    Submit {
        /// Document to submit, or `-` for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Media type of the document
        #[arg(long, default_value = DEFAULT_CONTENT_TYPE)]
        content_type: String,
    },

    /// Print the repository a document points at, without contacting GitHub
    Resolve {
        /// Document to read, or `-` for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Media type of the document
        #[arg(long, default_value = DEFAULT_CONTENT_TYPE)]
        content_type: String,
    },
}
