//! forge
//!
//! Abstraction over the remote hosting service (GitHub).
//!
//! # Architecture
//!
//! The `Forge` trait defines the calls a submission makes: fork, read a
//! repository, read and write a file, list and open pull requests. The
//! submission workflow depends on `dyn Forge` only, so tests swap in
//! [`mock::MockForge`] without touching the network.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and request/response types
//! - [`github`]: GitHub REST implementation
//! - [`mock`]: In-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use smp_submitter::forge::github::GitHubForge;
//! use std::time::Duration;
//!
//! let forge = GitHubForge::new("ghp_xxx", "https://api.github.com", Duration::from_secs(20))?;
//! let repo = forge.get_repository("octocat/hello-world").await?;
//! println!("default branch: {}", repo.default_branch);
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
