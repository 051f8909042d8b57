//! submit::fork
//!
//! Fork creation and readiness polling.
//!
//! # State Machine
//!
//! ```text
//! Created ──► Polling ──► Ready
//!    │           │
//!    └───────────┴──► Failed (creation error, readiness error, timeout, cancel)
//! ```
//!
//! GitHub creates forks asynchronously: the create call answers immediately
//! but the fork returns 404 until it has been copied. [`ForkOrchestrator`]
//! waits an initial delay, then probes at a fixed interval. Each probe yields
//! a [`ReadinessProbe`]; only 404 counts as "not yet". The loop is bounded
//! by elapsed time and attempt count and stops promptly on cancellation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::StepError;
use crate::core::types::{ForkHandle, RepositoryRef};
use crate::forge::{CreateForkRequest, Forge, ForgeError, RemoteRepository};

/// Timing bounds for readiness polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkPolicy {
    /// Wait before the first probe
    pub initial_delay: Duration,
    /// Wait between probes
    pub poll_interval: Duration,
    /// Give up once this much time has passed since polling started
    pub max_wait: Duration,
    /// Give up after this many probes
    pub max_attempts: u32,
}

impl Default for ForkPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(120),
            max_attempts: 30,
        }
    }
}

/// Outcome of a single readiness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessProbe {
    /// The fork answers queries.
    Ready(ForkHandle),
    /// The fork does not exist yet (404).
    Pending,
}

/// Name for a new fork: `<owner>-<name>-<YYYYMMDD-HHMMSS>` in UTC.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use smp_submitter::core::types::RepositoryRef;
/// use smp_submitter::submit::fork::fork_name;
///
/// let repo = RepositoryRef::new("acme", "widgets").unwrap();
/// let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
/// assert_eq!(fork_name(&repo, at), "acme-widgets-20240309-070501");
/// ```
pub fn fork_name(source: &RepositoryRef, at: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}",
        source.owner(),
        source.name(),
        at.format("%Y%m%d-%H%M%S")
    )
}

fn handle_from(repo: RemoteRepository) -> ForkHandle {
    ForkHandle {
        full_name: repo.full_name,
        owner_login: repo.owner_login,
        default_branch: repo.default_branch,
    }
}

/// Creates forks and waits for them to become usable.
pub struct ForkOrchestrator<'a> {
    forge: &'a dyn Forge,
    policy: &'a ForkPolicy,
}

impl<'a> ForkOrchestrator<'a> {
    pub fn new(forge: &'a dyn Forge, policy: &'a ForkPolicy) -> Self {
        Self { forge, policy }
    }

    /// Request a fork of `source`, restricted to its default branch.
    ///
    /// The returned handle is not usable until [`wait_until_ready`] succeeds.
    ///
    /// [`wait_until_ready`]: ForkOrchestrator::wait_until_ready
    pub async fn create(&self, source: &RepositoryRef) -> Result<ForkHandle, StepError> {
        let name = fork_name(source, Utc::now());
        let repo = self
            .forge
            .create_fork(CreateForkRequest {
                source: source.clone(),
                name: name.clone(),
                default_branch_only: true,
            })
            .await
            .map_err(|error| StepError::ForkCreation {
                source_repo: source.full_name(),
                error,
            })?;

        info!(
            source = %source,
            requested = %name,
            fork = %repo.full_name,
            "fork requested"
        );
        Ok(handle_from(repo))
    }

    /// Probe the fork once.
    pub async fn probe(&self, fork: &ForkHandle) -> Result<ReadinessProbe, StepError> {
        match self.forge.get_repository(&fork.full_name).await {
            Ok(repo) => Ok(ReadinessProbe::Ready(handle_from(repo))),
            Err(ForgeError::NotFound(_)) => Ok(ReadinessProbe::Pending),
            Err(error) => Err(StepError::ForkReadiness {
                fork: fork.full_name.clone(),
                error,
            }),
        }
    }

    /// Poll until the fork answers, the bounds are exceeded, or `cancel` fires.
    pub async fn wait_until_ready(
        &self,
        fork: &ForkHandle,
        cancel: &CancellationToken,
    ) -> Result<ForkHandle, StepError> {
        let started = Instant::now();
        pause(self.policy.initial_delay, cancel).await?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.probe(fork).await? {
                ReadinessProbe::Ready(ready) => {
                    info!(fork = %ready.full_name, attempts, "fork is ready");
                    return Ok(ready);
                }
                ReadinessProbe::Pending => {
                    debug!(fork = %fork.full_name, attempts, "fork not ready yet");
                }
            }

            let waited = started.elapsed();
            if attempts >= self.policy.max_attempts
                || waited + self.policy.poll_interval > self.policy.max_wait
            {
                return Err(StepError::ForkTimeout {
                    fork: fork.full_name.clone(),
                    attempts,
                    waited,
                });
            }

            pause(self.policy.poll_interval, cancel).await?;
        }
    }

    /// Create a fork of `source` and wait for it to become ready.
    pub async fn fork_and_wait(
        &self,
        source: &RepositoryRef,
        cancel: &CancellationToken,
    ) -> Result<ForkHandle, StepError> {
        let created = self.create(source).await?;
        self.wait_until_ready(&created, cancel).await
    }
}

/// Sleep for `duration` unless cancelled first.
async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<(), StepError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StepError::Cancelled),
        _ = sleep(duration) => Ok(()),
    }
}
