//! submit
//!
//! The submission workflow: metadata document in, pull request URL out.
//!
//! # Steps
//!
//! ```text
//! MetadataDocument ─► RepositoryRef ─► ForkHandle ─► UpsertOutcome ─► PullRequestOutcome
//!   (metadata)          (resolver)      (fork)         (content)         (pulls)
//! ```
//!
//! Steps run strictly in sequence and each remote failure aborts the rest.
//! Input problems surface as [`SubmissionError::Metadata`]; every remote step
//! failure is wrapped in [`SubmissionError::SubmissionFailed`].
//!
//! # Modules
//!
//! - [`fork`]: Fork creation and readiness polling
//! - [`content`]: Create-or-update of the metadata file
//! - [`pulls`]: Find-or-create of the pull request
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use smp_submitter::forge::mock::MockForge;
//! use smp_submitter::submit::content::Committer;
//! use smp_submitter::submit::fork::ForkPolicy;
//! use smp_submitter::submit::{Submitter, SubmitterConfig};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let mut config = SubmitterConfig::new(Committer {
//!     name: "SMP Bot".to_string(),
//!     email: "bot@example.org".to_string(),
//! });
//! config.fork_policy = ForkPolicy {
//!     initial_delay: Duration::ZERO,
//!     ..ForkPolicy::default()
//! };
//!
//! let submitter = Submitter::new(Arc::new(MockForge::new()), config);
//! let url = submitter
//!     .submit(
//!         br#"{"@context": {"schema": "https://schema.org/"},
//!              "schema:codeRepository": "https://github.com/acme/widgets"}"#,
//!         "application/ld+json",
//!     )
//!     .await
//!     .unwrap();
//! assert_eq!(url, "https://github.com/acme/widgets/pull/1");
//! # });
//! ```

pub mod content;
pub mod fork;
pub mod pulls;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};

use crate::core::config::{
    DEFAULT_COMMIT_MESSAGE, DEFAULT_FILE_PATH, DEFAULT_MAX_PULL_PAGES, DEFAULT_PR_BODY,
};
use crate::core::types::{ForkHandle, RepositoryRef};
use crate::forge::{Forge, ForgeError};
use crate::metadata::{MediaTypePolicy, MetadataDocument, MetadataError};

use content::{Committer, ContentUpsert, LookupPolicy, UpsertOutcome};
use fork::{ForkOrchestrator, ForkPolicy};
use pulls::{PullReconciler, PullRequestOutcome};

/// Process-wide settings injected into every submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterConfig {
    /// Identity recorded on content commits
    pub committer: Committer,
    /// Path of the metadata file in the fork
    pub file_path: String,
    /// Commit message for content writes
    pub commit_message: String,
    /// Title of new pull requests
    pub pr_title: String,
    /// Body of new pull requests
    pub pr_body: String,
    /// Handling of unrecognized media types
    pub media_type_policy: MediaTypePolicy,
    /// Handling of failed file lookups
    pub lookup_policy: LookupPolicy,
    /// Readiness polling bounds
    pub fork_policy: ForkPolicy,
    /// Upper bound on PR list pages scanned
    pub max_pull_pages: u32,
}

impl SubmitterConfig {
    /// Settings with every default except the committer.
    pub fn new(committer: Committer) -> Self {
        Self {
            committer,
            file_path: DEFAULT_FILE_PATH.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            pr_title: DEFAULT_COMMIT_MESSAGE.to_string(),
            pr_body: DEFAULT_PR_BODY.to_string(),
            media_type_policy: MediaTypePolicy::default(),
            lookup_policy: LookupPolicy::default(),
            fork_policy: ForkPolicy::default(),
            max_pull_pages: DEFAULT_MAX_PULL_PAGES,
        }
    }
}

/// Failure of a remote step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StepError {
    #[error("failed to fork {source_repo}: {error}")]
    ForkCreation {
        source_repo: String,
        #[source]
        error: ForgeError,
    },

    #[error("failed to check readiness of fork {fork}: {error}")]
    ForkReadiness {
        fork: String,
        #[source]
        error: ForgeError,
    },

    #[error("fork {fork} was not ready after {attempts} attempts ({waited:?})")]
    ForkTimeout {
        fork: String,
        attempts: u32,
        waited: Duration,
    },

    #[error("failed to write {path}: {error}")]
    ContentWrite {
        path: String,
        #[source]
        error: ForgeError,
    },

    #[error("failed to find or open pull request on {base}: {error}")]
    PullRequest {
        base: String,
        #[source]
        error: ForgeError,
    },

    #[error("submission cancelled")]
    Cancelled,
}

impl StepError {
    /// The forge error behind this failure, if any.
    pub fn forge_error(&self) -> Option<&ForgeError> {
        match self {
            StepError::ForkCreation { error, .. }
            | StepError::ForkReadiness { error, .. }
            | StepError::ContentWrite { error, .. }
            | StepError::PullRequest { error, .. } => Some(error),
            StepError::ForkTimeout { .. } | StepError::Cancelled => None,
        }
    }
}

/// Coarse classification used by transports to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The document was rejected
    BadInput,
    /// The remote rejected our credential
    Unauthorized,
    /// Any other remote or workflow failure
    Upstream,
}

/// Error returned by a submission.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("failed to create a fork and submit PR: {0}")]
    SubmissionFailed(#[from] StepError),
}

impl SubmissionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SubmissionError::Metadata(_) => FailureKind::BadInput,
            SubmissionError::SubmissionFailed(step) => match step.forge_error() {
                Some(error) if error.is_unauthorized() => FailureKind::Unauthorized,
                _ => FailureKind::Upstream,
            },
        }
    }
}

/// Everything a successful submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub repository: RepositoryRef,
    pub fork: ForkHandle,
    pub upsert: UpsertOutcome,
    pub pull_request: PullRequestOutcome,
}

impl SubmissionReceipt {
    pub fn pull_request_url(&self) -> &str {
        self.pull_request.url()
    }
}

/// Runs submissions against a forge.
///
/// Cheap to share: holds the forge behind an `Arc` and no per-request state.
#[derive(Clone)]
pub struct Submitter {
    forge: Arc<dyn Forge>,
    config: SubmitterConfig,
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("forge", &self.forge.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Submitter {
    pub fn new(forge: Arc<dyn Forge>, config: SubmitterConfig) -> Self {
        Self { forge, config }
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    /// Resolve the target repository without touching the forge.
    pub fn resolve(
        &self,
        content: &[u8],
        content_type: &str,
    ) -> Result<RepositoryRef, MetadataError> {
        MetadataDocument::from_bytes(content, content_type)?
            .resolve_repository(self.config.media_type_policy)
    }

    /// Submit a metadata document and return the pull request URL.
    pub async fn submit(
        &self,
        content: &[u8],
        content_type: &str,
    ) -> Result<String, SubmissionError> {
        let receipt = self
            .submit_with_cancel(content, content_type, &CancellationToken::new())
            .await?;
        Ok(receipt.pull_request.url().to_string())
    }

    /// Submit a metadata document; `cancel` aborts the readiness wait.
    pub async fn submit_with_cancel(
        &self,
        content: &[u8],
        content_type: &str,
        cancel: &CancellationToken,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let repository = self.resolve(content, content_type)?;
        let span = info_span!("submission", repository = %repository);

        async {
            info!("starting submission");
            let forge = self.forge.as_ref();

            let fork = ForkOrchestrator::new(forge, &self.config.fork_policy)
                .fork_and_wait(&repository, cancel)
                .await?;

            let upsert = ContentUpsert::new(forge, &self.config)
                .upsert(&fork, content)
                .await?;

            let pull_request = PullReconciler::new(forge, &self.config)
                .reconcile(&repository, &fork)
                .await?;

            info!(pr = %pull_request.url(), "submission complete");
            Ok::<_, StepError>(SubmissionReceipt {
                repository: repository.clone(),
                fork,
                upsert,
                pull_request,
            })
        }
        .instrument(span)
        .await
        .map_err(SubmissionError::SubmissionFailed)
    }
}
