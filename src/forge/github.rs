//! forge::github
//!
//! GitHub forge implementation using the REST API.
//!
//! # Design
//!
//! One [`GitHubForge`] owns a `reqwest::Client` connection pool configured
//! with the default headers every call needs (bearer token, GitHub media
//! type, API version, user agent) and explicit timeouts. The forge holds no
//! per-request state, so a single instance serves concurrent submissions.
//!
//! Non-success responses are logged with their status and body, then mapped:
//! 404 becomes [`ForgeError::NotFound`], anything else [`ForgeError::Api`].
//!
//! # Example
//!
//! ```ignore
//! use smp_submitter::forge::github::GitHubForge;
//! use smp_submitter::forge::Forge;
//! use std::time::Duration;
//!
//! let forge = GitHubForge::new("ghp_xxx", "https://api.github.com", Duration::from_secs(20))?;
//! let file = forge.get_file("octocat/hello-world", "metadata.json", "main").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::traits::{
    Committer, CreateForkRequest, CreatePullRequest, ExistingFile, Forge, ForgeError,
    ListPullsOpts, PullRequestSummary, PutFileRequest, RemoteRepository,
};
use crate::core::types::{FileRevision, PullRequestRef, RepositoryRef};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("smp-submitter/", env!("CARGO_PKG_VERSION"));

/// REST API version pinned for every call.
const API_VERSION: &str = "2022-11-28";

/// Connect timeout for every call.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// GitHub forge implementation.
pub struct GitHubForge {
    /// HTTP client with auth and GitHub headers preset
    client: Client,
    /// API base URL without trailing slash
    api_base: String,
}

// Custom Debug so the token never reaches logs
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl GitHubForge {
    /// Create a GitHub forge authenticated with `token`.
    ///
    /// # Arguments
    ///
    /// * `token` - Personal access token or GitHub App token
    /// * `api_base` - API root, e.g. `https://api.github.com` or a GitHub
    ///   Enterprise `https://github.example.com/api/v3`
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `ForgeError::Setup` if the token cannot be sent as a header
    /// or the client cannot be built.
    pub fn new(
        token: impl AsRef<str>,
        api_base: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<Self, ForgeError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.as_ref()))
            .map_err(|_| ForgeError::Setup("token contains invalid header characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT_VALUE)
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ForgeError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.as_ref().trim_end_matches('/').to_string(),
        })
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, full_name: &str, path: &str) -> String {
        if path.is_empty() {
            format!("{}/repos/{}", self.api_base, full_name)
        } else {
            format!("{}/repos/{}/{}", self.api_base, full_name, path)
        }
    }

    /// Send a request, mapping transport failures and non-success statuses.
    async fn send(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<Response, ForgeError> {
        let response = request.send().await.map_err(|e| {
            warn!(operation, error = %e, "GitHub request did not complete");
            ForgeError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(operation, status = status.as_u16(), "GitHub request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            // Expected while polling a fresh fork or probing for a file
            debug!(operation, status = status.as_u16(), body = %body, "GitHub resource not found");
            return Err(ForgeError::NotFound(body));
        }

        warn!(operation, status = status.as_u16(), body = %body, "GitHub API returned an error");
        Err(ForgeError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// Decode a success response body.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ForgeError> {
        response
            .json()
            .await
            .map_err(|e| ForgeError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn create_fork(&self, request: CreateForkRequest) -> Result<RemoteRepository, ForgeError> {
        let url = self.repo_url(&request.source.full_name(), "forks");
        let body = CreateForkBody {
            name: &request.name,
            default_branch_only: request.default_branch_only,
        };

        let response = self
            .send(self.client.post(&url).json(&body), "create_fork")
            .await?;
        let repo: GitHubRepository = Self::decode(response).await?;
        Ok(repo.into())
    }

    async fn get_repository(&self, full_name: &str) -> Result<RemoteRepository, ForgeError> {
        let url = self.repo_url(full_name, "");
        let response = self.send(self.client.get(&url), "get_repository").await?;
        let repo: GitHubRepository = Self::decode(response).await?;
        Ok(repo.into())
    }

    async fn get_file(
        &self,
        repository: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<ExistingFile>, ForgeError> {
        let url = self.repo_url(repository, &format!("contents/{}", path));
        let request = self.client.get(&url).query(&[("ref", branch)]);

        let response = match self.send(request, "get_file").await {
            Ok(response) => response,
            Err(ForgeError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let file: GitHubContent = Self::decode(response).await?;
        let content = decode_content(file.content.as_deref().unwrap_or_default())?;
        Ok(Some(ExistingFile {
            revision: FileRevision::new(file.sha),
            content,
        }))
    }

    async fn put_file(&self, request: PutFileRequest) -> Result<FileRevision, ForgeError> {
        let url = self.repo_url(&request.repository, &format!("contents/{}", request.path));
        let body = PutContentBody {
            message: &request.message,
            content: STANDARD.encode(&request.content),
            committer: &request.committer,
            branch: &request.branch,
            sha: request.revision.as_ref().map(FileRevision::as_str),
        };

        let response = self
            .send(self.client.put(&url).json(&body), "put_file")
            .await?;
        let written: GitHubPutContentResponse = Self::decode(response).await?;
        Ok(FileRevision::new(written.content.sha))
    }

    async fn list_open_pulls(
        &self,
        base: &RepositoryRef,
        opts: ListPullsOpts,
    ) -> Result<Vec<PullRequestSummary>, ForgeError> {
        let url = self.repo_url(&base.full_name(), "pulls");
        let per_page = opts.per_page.to_string();
        let page = opts.page.to_string();
        let request = self.client.get(&url).query(&[
            ("base", opts.base_branch.as_str()),
            ("state", "open"),
            ("per_page", per_page.as_str()),
            ("page", page.as_str()),
        ]);

        let response = self.send(request, "list_open_pulls").await?;
        let pulls: Vec<GitHubPullRequest> = Self::decode(response).await?;
        Ok(pulls.into_iter().map(Into::into).collect())
    }

    async fn create_pull(&self, request: CreatePullRequest) -> Result<PullRequestRef, ForgeError> {
        let url = self.repo_url(&request.base_repository.full_name(), "pulls");
        let body = CreatePullBody {
            title: &request.title,
            body: &request.body,
            head: &request.head,
            head_repo: &request.head_repo,
            base: &request.base,
            maintainer_can_modify: request.maintainer_can_modify,
        };

        let response = self
            .send(self.client.post(&url).json(&body), "create_pull")
            .await?;
        let pr: GitHubPullRequest = Self::decode(response).await?;

        Ok(PullRequestRef {
            number: pr.number,
            url: pr.html_url,
            head_repo_full_name: pr
                .head
                .repo
                .map(|r| r.full_name)
                .unwrap_or(request.head_repo),
        })
    }
}

/// Decode the base64 `content` field of a contents response.
///
/// GitHub wraps the encoded text at 60 columns, so whitespace is removed
/// before decoding.
fn decode_content(encoded: &str) -> Result<Vec<u8>, ForgeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| ForgeError::Decode(format!("file content is not valid base64: {}", e)))
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a fork.
#[derive(Serialize)]
struct CreateForkBody<'a> {
    name: &'a str,
    default_branch_only: bool,
}

/// Request body for creating or updating a file.
#[derive(Serialize)]
struct PutContentBody<'a> {
    message: &'a str,
    content: String,
    committer: &'a Committer,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// Request body for creating a PR.
#[derive(Serialize)]
struct CreatePullBody<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    head_repo: &'a str,
    base: &'a str,
    maintainer_can_modify: bool,
}

/// GitHub repository response (subset).
#[derive(Deserialize)]
struct GitHubRepository {
    full_name: String,
    owner: GitHubOwner,
    default_branch: String,
}

#[derive(Deserialize)]
struct GitHubOwner {
    login: String,
}

impl From<GitHubRepository> for RemoteRepository {
    fn from(repo: GitHubRepository) -> Self {
        RemoteRepository {
            full_name: repo.full_name,
            owner_login: repo.owner.login,
            default_branch: repo.default_branch,
        }
    }
}

/// GitHub contents response for a single file.
#[derive(Deserialize)]
struct GitHubContent {
    sha: String,
    /// Base64, absent or empty for files over 1 MB
    content: Option<String>,
}

/// GitHub response to a contents write.
#[derive(Deserialize)]
struct GitHubPutContentResponse {
    content: GitHubContentSha,
}

#[derive(Deserialize)]
struct GitHubContentSha {
    sha: String,
}

/// GitHub PR response (subset shared by list and create).
#[derive(Deserialize)]
struct GitHubPullRequest {
    number: u64,
    html_url: String,
    head: GitHubHead,
}

/// GitHub head ref with repository info.
#[derive(Deserialize)]
struct GitHubHead {
    #[serde(rename = "ref")]
    ref_name: String,
    /// Repository info (None for deleted forks)
    repo: Option<GitHubHeadRepo>,
}

#[derive(Deserialize)]
struct GitHubHeadRepo {
    full_name: String,
}

impl From<GitHubPullRequest> for PullRequestSummary {
    fn from(pr: GitHubPullRequest) -> Self {
        PullRequestSummary {
            number: pr.number,
            url: pr.html_url,
            head_ref: pr.head.ref_name,
            head_repo_full_name: pr.head.repo.map(|r| r.full_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forge() -> GitHubForge {
        GitHubForge::new("secret_token_abc123", DEFAULT_API_BASE, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn repo_url_format() {
        let forge = forge();
        assert_eq!(
            forge.repo_url("octocat/hello-world", ""),
            "https://api.github.com/repos/octocat/hello-world"
        );
        assert_eq!(
            forge.repo_url("octocat/hello-world", "contents/metadata.json"),
            "https://api.github.com/repos/octocat/hello-world/contents/metadata.json"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let forge =
            GitHubForge::new("t", "https://github.example.com/api/v3/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(forge.api_base(), "https://github.example.com/api/v3");
    }

    #[test]
    fn debug_redacts_token() {
        let debug_output = format!("{:?}", forge());
        assert!(!debug_output.contains("secret_token_abc123"));
        assert!(debug_output.contains("api_base"));
    }

    #[test]
    fn invalid_token_is_a_setup_error() {
        let result = GitHubForge::new("bad\ntoken", DEFAULT_API_BASE, Duration::from_secs(5));
        assert!(matches!(result, Err(ForgeError::Setup(_))));
    }

    #[test]
    fn forge_name() {
        assert_eq!(forge().name(), "github");
    }

    #[test]
    fn wrapped_content_decodes() {
        let encoded = STANDARD.encode(b"{\"hello\": \"world\"}");
        let (a, b) = encoded.split_at(8);
        let wrapped = format!("{}\n{}\n", a, b);
        assert_eq!(decode_content(&wrapped).unwrap(), b"{\"hello\": \"world\"}");
        assert!(decode_content("").unwrap().is_empty());
        assert!(matches!(
            decode_content("not base64!"),
            Err(ForgeError::Decode(_))
        ));
    }

    #[test]
    fn pull_summary_from_list_item() {
        let item: GitHubPullRequest = serde_json::from_str(
            r#"{
                "number": 7,
                "html_url": "https://github.com/acme/widgets/pull/7",
                "head": {"ref": "main", "repo": {"full_name": "bot/acme-widgets"}}
            }"#,
        )
        .unwrap();
        let summary: PullRequestSummary = item.into();
        assert_eq!(summary.number, 7);
        assert_eq!(summary.head_ref, "main");
        assert_eq!(summary.head_repo_full_name.as_deref(), Some("bot/acme-widgets"));

        let deleted: GitHubPullRequest = serde_json::from_str(
            r#"{"number": 8, "html_url": "u", "head": {"ref": "main", "repo": null}}"#,
        )
        .unwrap();
        assert_eq!(PullRequestSummary::from(deleted).head_repo_full_name, None);
    }

    #[test]
    fn put_body_omits_missing_sha() {
        let committer = Committer {
            name: "Bot".into(),
            email: "bot@example.org".into(),
        };
        let body = PutContentBody {
            message: "m",
            content: STANDARD.encode(b"x"),
            committer: &committer,
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["committer"]["email"], "bot@example.org");
        assert_eq!(json["content"], "eA==");
    }
}
