//! core
//!
//! Core domain types and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: RepositoryRef, ForkHandle, FileRevision, PullRequestRef
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod types;
