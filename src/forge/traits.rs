//! forge::traits
//!
//! Forge trait definition for the GitHub operations a submission needs.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! Implementations translate transport outcomes into [`ForgeError`] and never
//! retry on their own; retry decisions (readiness polling) belong to the
//! callers in [`crate::submit`].
//!
//! # Example
//!
//! ```ignore
//! use smp_submitter::forge::{CreateForkRequest, Forge, ForgeError};
//!
//! async fn fork(forge: &dyn Forge, source: RepositoryRef) -> Result<(), ForgeError> {
//!     let fork = forge.create_fork(CreateForkRequest {
//!         source,
//!         name: "acme-widgets-20240101-000000".to_string(),
//!         default_branch_only: true,
//!     }).await?;
//!     println!("forked into {}", fork.full_name);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{FileRevision, PullRequestRef, RepositoryRef};

/// Errors from forge operations.
///
/// Remote failures keep the HTTP status and response body so callers can
/// surface them verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// The API answered with a non-success status.
    #[error("GitHub API returned {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The request never produced a response (connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// A success response could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The client could not be set up (e.g. a token that is not a valid header).
    #[error("client setup failed: {0}")]
    Setup(String),
}

impl ForgeError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ForgeError::Api { status, .. } => Some(*status),
            ForgeError::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Check if the remote rejected the credential (401 or 403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

/// Identity recorded as the committer of content writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

/// Request to fork a repository into the authenticated account.
#[derive(Debug, Clone)]
pub struct CreateForkRequest {
    /// Repository to fork
    pub source: RepositoryRef,
    /// Name of the new fork
    pub name: String,
    /// Copy only the default branch
    pub default_branch_only: bool,
}

/// Repository information returned by the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    /// `owner/name`
    pub full_name: String,
    /// Login of the owning account
    pub owner_login: String,
    /// Name of the default branch
    pub default_branch: String,
}

/// A file read from a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingFile {
    /// Revision marker to send with the next write
    pub revision: FileRevision,
    /// Decoded file content
    pub content: Vec<u8>,
}

/// Request to create or update a file on a branch.
#[derive(Debug, Clone)]
pub struct PutFileRequest {
    /// Full name of the repository to write to
    pub repository: String,
    /// Path of the file inside the repository
    pub path: String,
    /// Branch to commit on
    pub branch: String,
    /// Commit message
    pub message: String,
    /// Raw (not yet encoded) file content
    pub content: Vec<u8>,
    /// Committer identity
    pub committer: Committer,
    /// Revision of the file being replaced; `None` when creating
    pub revision: Option<FileRevision>,
}

/// Options for listing open pull requests.
#[derive(Debug, Clone)]
pub struct ListPullsOpts {
    /// Only pulls targeting this base branch
    pub base_branch: String,
    /// 1-based page number
    pub page: u32,
    /// Page size (GitHub caps this at 100)
    pub per_page: u32,
}

/// Summary of an open pull request from a list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSummary {
    /// PR number
    pub number: u64,
    /// Web URL of the PR
    pub url: String,
    /// Head branch name
    pub head_ref: String,
    /// Full name of the head repository (`None` if it was deleted)
    pub head_repo_full_name: Option<String>,
}

/// Request to open a pull request.
#[derive(Debug, Clone)]
pub struct CreatePullRequest {
    /// Repository the PR is opened against
    pub base_repository: RepositoryRef,
    /// Branch to merge into
    pub base: String,
    /// Head in `user:branch` form
    pub head: String,
    /// Full name of the head repository
    pub head_repo: String,
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Let base maintainers push to the head branch
    pub maintainer_can_modify: bool,
}

/// The Forge trait for the remote hosting service.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one forge is shared by every
/// concurrent submission.
///
/// # Error Handling
///
/// - `NotFound`: the resource does not exist (yet)
/// - `Api`: any other non-success status, with its body
/// - `Network` / `Decode`: transport or payload problems
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github", "mock").
    fn name(&self) -> &'static str;

    /// Request a fork of `request.source` into the authenticated account.
    ///
    /// Forking is asynchronous on the remote side: the returned repository
    /// may not be readable yet.
    async fn create_fork(&self, request: CreateForkRequest) -> Result<RemoteRepository, ForgeError>;

    /// Fetch a repository by full name.
    ///
    /// # Errors
    ///
    /// `ForgeError::NotFound` if the repository does not exist (yet).
    async fn get_repository(&self, full_name: &str) -> Result<RemoteRepository, ForgeError>;

    /// Read a file on a branch. Returns `Ok(None)` if the file does not exist.
    async fn get_file(
        &self,
        repository: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<ExistingFile>, ForgeError>;

    /// Create or replace a file. Returns the revision of the written content.
    async fn put_file(&self, request: PutFileRequest) -> Result<FileRevision, ForgeError>;

    /// List one page of open pull requests on `base`.
    async fn list_open_pulls(
        &self,
        base: &RepositoryRef,
        opts: ListPullsOpts,
    ) -> Result<Vec<PullRequestSummary>, ForgeError>;

    /// Open a pull request.
    async fn create_pull(&self, request: CreatePullRequest) -> Result<PullRequestRef, ForgeError>;
}
