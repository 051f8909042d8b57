//! core::types
//!
//! Strong types for submission domain concepts.
//!
//! # Types
//!
//! - [`RepositoryRef`] - Validated `owner/name` pair of a GitHub repository
//! - [`ForkHandle`] - A fork created (or reused) for a submission
//! - [`FileRevision`] - Opaque revision marker of a stored file (blob SHA)
//! - [`PullRequestRef`] - A pull request, discovered or newly created
//!
//! # Validation
//!
//! [`RepositoryRef`] enforces its invariants at construction time: owner and
//! name are non-empty and never contain `/`.
//!
//! # Examples
//!
//! ```
//! use smp_submitter::core::types::RepositoryRef;
//!
//! let repo = RepositoryRef::new("acme", "widgets").unwrap();
//! assert_eq!(repo.full_name(), "acme/widgets");
//!
//! assert!(RepositoryRef::new("", "widgets").is_err());
//! assert!(RepositoryRef::new("acme", "a/b").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid repository reference: {0}")]
    InvalidRepository(String),
}

/// A validated GitHub repository reference.
///
/// # Example
///
/// ```
/// use smp_submitter::core::types::RepositoryRef;
///
/// let repo: RepositoryRef = "octocat/hello-world".parse().unwrap();
/// assert_eq!(repo.owner(), "octocat");
/// assert_eq!(repo.name(), "hello-world");
/// assert_eq!(repo.to_string(), "octocat/hello-world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Create a new validated repository reference.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepository` if either segment is empty or
    /// contains a `/`.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, TypeError> {
        let owner = owner.into();
        let name = name.into();
        Self::validate_segment("owner", &owner)?;
        Self::validate_segment("name", &name)?;
        Ok(Self { owner, name })
    }

    fn validate_segment(label: &str, value: &str) -> Result<(), TypeError> {
        if value.is_empty() {
            return Err(TypeError::InvalidRepository(format!(
                "repository {} cannot be empty",
                label
            )));
        }
        if value.contains('/') {
            return Err(TypeError::InvalidRepository(format!(
                "repository {} cannot contain '/': {}",
                label, value
            )));
        }
        Ok(())
    }

    /// Get the repository owner (user or organization).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the `owner/name` form used by the GitHub API.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) => Self::new(owner, name),
            None => Err(TypeError::InvalidRepository(format!(
                "expected 'owner/name', got '{}'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for RepositoryRef {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepositoryRef> for String {
    fn from(repo: RepositoryRef) -> Self {
        repo.to_string()
    }
}

/// A fork of the target repository, owned by the submitting identity.
///
/// Only handed out by the fork orchestrator once the fork answers queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkHandle {
    /// Full name of the fork (`owner/name`)
    pub full_name: String,
    /// Login of the fork owner (the submitting identity)
    pub owner_login: String,
    /// Default branch of the fork
    pub default_branch: String,
}

/// Opaque revision marker of a stored file.
///
/// On GitHub this is the blob SHA returned by the contents API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRevision(String);

impl FileRevision {
    /// Wrap a revision marker.
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    /// Get the marker value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pull request on the base repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// PR number
    pub number: u64,
    /// PR URL (web URL for viewing)
    pub url: String,
    /// Full name of the repository the PR head lives in
    pub head_repo_full_name: String,
}
