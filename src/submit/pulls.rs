//! submit::pulls
//!
//! Find-or-create of the pull request from the fork into the base repository.
//!
//! Open pull requests on the base repository are listed page by page; the
//! first one whose head lives in the fork is reused. Otherwise a new one is
//! opened from `<fork owner>:<default branch>`.

use tracing::{debug, info, warn};

use super::{StepError, SubmitterConfig};
use crate::core::types::{ForkHandle, PullRequestRef, RepositoryRef};
use crate::forge::{CreatePullRequest, Forge, ForgeError, ListPullsOpts};

/// Page size for listing (GitHub's maximum).
pub const PER_PAGE: u32 = 100;

/// Result of reconciling the pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestOutcome {
    /// An open PR from the fork already existed.
    Reused(PullRequestRef),
    /// A new PR was opened.
    Created(PullRequestRef),
}

impl PullRequestOutcome {
    pub fn pull_request(&self) -> &PullRequestRef {
        match self {
            PullRequestOutcome::Reused(pr) | PullRequestOutcome::Created(pr) => pr,
        }
    }

    pub fn url(&self) -> &str {
        &self.pull_request().url
    }
}

/// Reuses or opens the pull request for a fork.
pub struct PullReconciler<'a> {
    forge: &'a dyn Forge,
    config: &'a SubmitterConfig,
}

impl<'a> PullReconciler<'a> {
    pub fn new(forge: &'a dyn Forge, config: &'a SubmitterConfig) -> Self {
        Self { forge, config }
    }

    /// Return the open PR from `fork` into `base`, opening one if needed.
    pub async fn reconcile(
        &self,
        base: &RepositoryRef,
        fork: &ForkHandle,
    ) -> Result<PullRequestOutcome, StepError> {
        if let Some(existing) = self.find_existing(base, fork).await? {
            info!(pr = %existing.url, "reusing open pull request");
            return Ok(PullRequestOutcome::Reused(existing));
        }

        let created = self
            .forge
            .create_pull(CreatePullRequest {
                base_repository: base.clone(),
                base: fork.default_branch.clone(),
                head: format!("{}:{}", fork.owner_login, fork.default_branch),
                head_repo: fork.full_name.clone(),
                title: self.config.pr_title.clone(),
                body: self.config.pr_body.clone(),
                maintainer_can_modify: true,
            })
            .await
            .map_err(|error| self.failed(base, error))?;

        info!(pr = %created.url, "opened pull request");
        Ok(PullRequestOutcome::Created(created))
    }

    /// Scan open PRs on `base` for one whose head repository is `fork`.
    pub async fn find_existing(
        &self,
        base: &RepositoryRef,
        fork: &ForkHandle,
    ) -> Result<Option<PullRequestRef>, StepError> {
        for page in 1..=self.config.max_pull_pages {
            let pulls = self
                .forge
                .list_open_pulls(
                    base,
                    ListPullsOpts {
                        base_branch: fork.default_branch.clone(),
                        page,
                        per_page: PER_PAGE,
                    },
                )
                .await
                .map_err(|error| self.failed(base, error))?;

            debug!(base = %base, page, count = pulls.len(), "listed open pull requests");

            let found = pulls.iter().find(|pr| {
                pr.head_repo_full_name
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(&fork.full_name))
            });
            if let Some(pr) = found {
                return Ok(Some(PullRequestRef {
                    number: pr.number,
                    url: pr.url.clone(),
                    head_repo_full_name: fork.full_name.clone(),
                }));
            }

            if pulls.len() < PER_PAGE as usize {
                return Ok(None);
            }
        }

        warn!(
            base = %base,
            max_pages = self.config.max_pull_pages,
            "stopped listing pull requests at the page limit"
        );
        Ok(None)
    }

    fn failed(&self, base: &RepositoryRef, error: ForgeError) -> StepError {
        StepError::PullRequest {
            base: base.full_name(),
            error,
        }
    }
}
