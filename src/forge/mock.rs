//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge keeps repositories, files and pull requests in memory and
//! imitates the GitHub behaviors a submission relies on:
//!
//! - Forking a repository the user already forked returns the existing fork.
//! - A fresh fork answers 404 until its readiness script says otherwise.
//! - Replacing a file requires the current revision (409 if stale, 422 if
//!   missing), and revisions are content-addressed.
//! - Opening a second open PR for the same head and base fails with 422.
//!
//! Every call is recorded, and any operation can be configured to fail.
//!
//! # Example
//!
//! ```
//! use smp_submitter::core::types::RepositoryRef;
//! use smp_submitter::forge::mock::MockForge;
//! use smp_submitter::forge::{CreateForkRequest, Forge};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new().with_readiness(vec![404, 200]);
//!
//! let fork = forge.create_fork(CreateForkRequest {
//!     source: RepositoryRef::new("acme", "widgets").unwrap(),
//!     name: "acme-widgets-20240101-000000".to_string(),
//!     default_branch_only: true,
//! }).await.unwrap();
//!
//! assert!(forge.get_repository(&fork.full_name).await.is_err());
//! assert!(forge.get_repository(&fork.full_name).await.is_ok());
//! # });
//! ```

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::traits::{
    CreateForkRequest, CreatePullRequest, ExistingFile, Forge, ForgeError, ListPullsOpts,
    PullRequestSummary, PutFileRequest, RemoteRepository,
};
use crate::core::types::{FileRevision, PullRequestRef, RepositoryRef};

/// Login of the authenticated user unless configured otherwise.
pub const DEFAULT_LOGIN: &str = "smp-bot";

/// Default branch of every mock repository.
pub const DEFAULT_BRANCH: &str = "main";

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// Login of the authenticated user.
    login: String,
    /// Forks by lowercase source full name.
    forks: HashMap<String, RemoteRepository>,
    /// Statuses returned by successive fork lookups; empty means ready.
    readiness: VecDeque<u16>,
    /// Forks never become ready.
    never_ready: bool,
    /// File contents by (repository, branch, path).
    files: HashMap<(String, String, String), Vec<u8>>,
    /// Pull requests in creation order.
    pulls: Vec<MockPull>,
    /// Next PR number to assign.
    next_pull_number: u64,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// A pull request stored by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPull {
    pub number: u64,
    pub url: String,
    pub base_repository: String,
    pub base: String,
    pub head: String,
    pub head_repo_full_name: Option<String>,
    pub title: String,
    pub body: String,
    pub open: bool,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    CreateFork(ForgeError),
    GetRepository(ForgeError),
    GetFile(ForgeError),
    PutFile(ForgeError),
    ListPulls(ForgeError),
    CreatePull(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    CreateFork {
        source: String,
        name: String,
        default_branch_only: bool,
    },
    GetRepository {
        full_name: String,
    },
    GetFile {
        repository: String,
        path: String,
        branch: String,
    },
    PutFile {
        repository: String,
        path: String,
        branch: String,
        revision: Option<String>,
        content: Vec<u8>,
    },
    ListPulls {
        base: String,
        base_branch: String,
        page: u32,
    },
    CreatePull {
        base: String,
        head: String,
        head_repo: String,
        title: String,
        maintainer_can_modify: bool,
    },
}

impl MockForge {
    /// Create a new empty mock forge whose forks are ready immediately.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner {
                login: DEFAULT_LOGIN.to_string(),
                forks: HashMap::new(),
                readiness: VecDeque::new(),
                never_ready: false,
                files: HashMap::new(),
                pulls: Vec::new(),
                next_pull_number: 1,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Use a different authenticated login.
    pub fn with_login(self, login: impl Into<String>) -> Self {
        self.inner.lock().unwrap().login = login.into();
        self
    }

    /// Script the statuses returned by fork lookups, one per call.
    ///
    /// Once the script is exhausted lookups succeed.
    pub fn with_readiness(self, statuses: Vec<u16>) -> Self {
        self.inner.lock().unwrap().readiness = statuses.into();
        self
    }

    /// Make forks answer 404 forever.
    pub fn never_ready(self) -> Self {
        self.inner.lock().unwrap().never_ready = true;
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use smp_submitter::forge::mock::{FailOn, MockForge};
    /// use smp_submitter::forge::ForgeError;
    ///
    /// let forge = MockForge::new().fail_on(FailOn::CreateFork(ForgeError::Api {
    ///     status: 403,
    ///     body: "Resource not accessible by integration".to_string(),
    /// }));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.inner.lock().unwrap().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.inner.lock().unwrap().fail_on = None;
    }

    /// Store a file directly (as if committed out of band).
    pub fn seed_file(&self, repository: &str, branch: &str, path: &str, content: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.files.insert(
            (repository.to_string(), branch.to_string(), path.to_string()),
            content.to_vec(),
        );
    }

    /// Store an open pull request directly. Returns its number.
    pub fn seed_pull(
        &self,
        base: &RepositoryRef,
        base_branch: &str,
        head: &str,
        head_repo_full_name: Option<&str>,
    ) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        let number = inner.next_pull_number;
        inner.next_pull_number += 1;
        inner.pulls.push(MockPull {
            number,
            url: pull_url(base, number),
            base_repository: base.full_name(),
            base: base_branch.to_string(),
            head: head.to_string(),
            head_repo_full_name: head_repo_full_name.map(str::to_string),
            title: "Seeded PR".to_string(),
            body: String::new(),
            open: true,
        });
        number
    }

    /// Get a file's content (for test verification).
    pub fn file(&self, repository: &str, branch: &str, path: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner
            .files
            .get(&(repository.to_string(), branch.to_string(), path.to_string()))
            .cloned()
    }

    /// Get all pull requests (for test verification).
    pub fn pulls(&self) -> Vec<MockPull> {
        self.inner.lock().unwrap().pulls.clone()
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Count recorded operations matching a predicate.
    pub fn count(&self, predicate: impl Fn(&MockOperation) -> bool) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.operations.iter().filter(|op| predicate(op)).count()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.inner.lock().unwrap().operations.clear();
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        self.inner.lock().unwrap().operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Option<ForgeError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::CreateFork(e)) if expected == "create_fork" => Some(e.clone()),
            Some(FailOn::GetRepository(e)) if expected == "get_repository" => Some(e.clone()),
            Some(FailOn::GetFile(e)) if expected == "get_file" => Some(e.clone()),
            Some(FailOn::PutFile(e)) if expected == "put_file" => Some(e.clone()),
            Some(FailOn::ListPulls(e)) if expected == "list_open_pulls" => Some(e.clone()),
            Some(FailOn::CreatePull(e)) if expected == "create_pull" => Some(e.clone()),
            _ => None,
        }
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

/// Content-addressed revision, like a git blob id.
pub fn blob_revision(content: &[u8]) -> FileRevision {
    let mut hasher = Sha256::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content);
    FileRevision::new(hex::encode(hasher.finalize()))
}

fn pull_url(base: &RepositoryRef, number: u64) -> String {
    format!("https://github.com/{}/pull/{}", base.full_name(), number)
}

fn conflict(status: u16, message: &str) -> ForgeError {
    ForgeError::Api {
        status,
        body: format!(r#"{{"message":"{}"}}"#, message),
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_fork(&self, request: CreateForkRequest) -> Result<RemoteRepository, ForgeError> {
        self.record(MockOperation::CreateFork {
            source: request.source.full_name(),
            name: request.name.clone(),
            default_branch_only: request.default_branch_only,
        });

        if let Some(e) = self.check_fail("create_fork") {
            return Err(e);
        }

        let mut inner = self.inner.lock().unwrap();
        let key = request.source.full_name().to_lowercase();
        if let Some(existing) = inner.forks.get(&key) {
            return Ok(existing.clone());
        }

        let fork = RemoteRepository {
            full_name: format!("{}/{}", inner.login, request.name),
            owner_login: inner.login.clone(),
            default_branch: DEFAULT_BRANCH.to_string(),
        };
        inner.forks.insert(key, fork.clone());
        Ok(fork)
    }

    async fn get_repository(&self, full_name: &str) -> Result<RemoteRepository, ForgeError> {
        self.record(MockOperation::GetRepository {
            full_name: full_name.to_string(),
        });

        if let Some(e) = self.check_fail("get_repository") {
            return Err(e);
        }

        let mut inner = self.inner.lock().unwrap();
        let repo = inner
            .forks
            .values()
            .find(|f| f.full_name.eq_ignore_ascii_case(full_name))
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(r#"{"message":"Not Found"}"#.into()))?;

        if inner.never_ready {
            return Err(ForgeError::NotFound(r#"{"message":"Not Found"}"#.into()));
        }

        match inner.readiness.pop_front() {
            None | Some(200) => Ok(repo),
            Some(404) => Err(ForgeError::NotFound(r#"{"message":"Not Found"}"#.into())),
            Some(status) => Err(conflict(status, "scripted failure")),
        }
    }

    async fn get_file(
        &self,
        repository: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<ExistingFile>, ForgeError> {
        self.record(MockOperation::GetFile {
            repository: repository.to_string(),
            path: path.to_string(),
            branch: branch.to_string(),
        });

        if let Some(e) = self.check_fail("get_file") {
            return Err(e);
        }

        Ok(self.file(repository, branch, path).map(|content| ExistingFile {
            revision: blob_revision(&content),
            content,
        }))
    }

    async fn put_file(&self, request: PutFileRequest) -> Result<FileRevision, ForgeError> {
        self.record(MockOperation::PutFile {
            repository: request.repository.clone(),
            path: request.path.clone(),
            branch: request.branch.clone(),
            revision: request.revision.as_ref().map(|r| r.as_str().to_string()),
            content: request.content.clone(),
        });

        if let Some(e) = self.check_fail("put_file") {
            return Err(e);
        }

        let mut inner = self.inner.lock().unwrap();
        let key = (request.repository, request.branch, request.path);
        if let Some(current) = inner.files.get(&key) {
            match &request.revision {
                None => return Err(conflict(422, "\\\"sha\\\" wasn't supplied.")),
                Some(rev) if *rev != blob_revision(current) => {
                    return Err(conflict(409, "is at a different revision"))
                }
                Some(_) => {}
            }
        }

        let revision = blob_revision(&request.content);
        inner.files.insert(key, request.content);
        Ok(revision)
    }

    async fn list_open_pulls(
        &self,
        base: &RepositoryRef,
        opts: ListPullsOpts,
    ) -> Result<Vec<PullRequestSummary>, ForgeError> {
        self.record(MockOperation::ListPulls {
            base: base.full_name(),
            base_branch: opts.base_branch.clone(),
            page: opts.page,
        });

        if let Some(e) = self.check_fail("list_open_pulls") {
            return Err(e);
        }

        let inner = self.inner.lock().unwrap();
        let base_name = base.full_name();
        let skip = (opts.page.saturating_sub(1) as usize) * opts.per_page as usize;

        Ok(inner
            .pulls
            .iter()
            .filter(|p| p.open && p.base_repository == base_name && p.base == opts.base_branch)
            .skip(skip)
            .take(opts.per_page as usize)
            .map(|p| PullRequestSummary {
                number: p.number,
                url: p.url.clone(),
                head_ref: p
                    .head
                    .split_once(':')
                    .map(|(_, branch)| branch)
                    .unwrap_or(p.head.as_str())
                    .to_string(),
                head_repo_full_name: p.head_repo_full_name.clone(),
            })
            .collect())
    }

    async fn create_pull(&self, request: CreatePullRequest) -> Result<PullRequestRef, ForgeError> {
        self.record(MockOperation::CreatePull {
            base: request.base_repository.full_name(),
            head: request.head.clone(),
            head_repo: request.head_repo.clone(),
            title: request.title.clone(),
            maintainer_can_modify: request.maintainer_can_modify,
        });

        if let Some(e) = self.check_fail("create_pull") {
            return Err(e);
        }

        let mut inner = self.inner.lock().unwrap();
        let base_name = request.base_repository.full_name();
        let duplicate = inner
            .pulls
            .iter()
            .any(|p| p.open && p.base_repository == base_name && p.head == request.head);
        if duplicate {
            return Err(conflict(422, "A pull request already exists"));
        }

        let number = inner.next_pull_number;
        inner.next_pull_number += 1;
        let url = pull_url(&request.base_repository, number);
        inner.pulls.push(MockPull {
            number,
            url: url.clone(),
            base_repository: base_name,
            base: request.base,
            head: request.head,
            head_repo_full_name: Some(request.head_repo.clone()),
            title: request.title,
            body: request.body,
            open: true,
        });

        Ok(PullRequestRef {
            number,
            url,
            head_repo_full_name: request.head_repo,
        })
    }
}
