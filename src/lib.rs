//! smp-submitter - Submit software metadata to GitHub as pull requests
//!
//! A metadata document (JSON-LD describing a piece of software) names the
//! GitHub repository it belongs to through `schema:codeRepository`. The
//! submitter forks that repository, writes the document into the fork and
//! opens (or reuses) a pull request back into the original.
//!
//! # Architecture
//!
//! - [`metadata`] - JSON-LD loading into a triple store and repository resolution
//! - [`submit`] - The fork, write and pull request workflow
//! - [`forge`] - Abstraction over the remote forge (GitHub) plus a mock
//! - [`core`] - Domain types and configuration
//! - [`server`] - HTTP front end
//! - [`cli`] - Command-line front end
//! - [`telemetry`] - Logging setup
//!
//! # Guarantees
//!
//! 1. Nothing is sent to GitHub until the document resolves to a repository
//! 2. Remote steps run strictly in order and the first failure stops the rest
//! 3. Resubmitting identical content writes nothing and reuses the open PR

pub mod cli;
pub mod core;
pub mod forge;
pub mod metadata;
pub mod server;
pub mod submit;
pub mod telemetry;
