//! core::config::schema
//!
//! Configuration schema types.
//!
//! # File Format
//!
//! The config file is TOML. Every section and every key is optional; missing
//! values fall back to defaults (see the accessors on [`super::Config`]).
//!
//! ```toml
//! [github]
//! token = "ghp_..."
//!
//! [committer]
//! name = "SMP Bot"
//! email = "smp-bot@example.org"
//!
//! [fork]
//! max_wait_secs = 120
//!
//! [server]
//! listen = "0.0.0.0:8080"
//! api_token = "secret"
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing and after environment overrides are
//! applied, so a bad value is reported no matter where it came from.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// The whole config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// GitHub API access
    pub github: Option<GitHubSection>,

    /// Identity used for commits
    pub committer: Option<CommitterSection>,

    /// File, commit and PR text
    pub submission: Option<SubmissionSection>,

    /// Metadata parsing behavior
    pub metadata: Option<MetadataSection>,

    /// Content upsert behavior
    pub content: Option<ContentSection>,

    /// Fork readiness polling
    pub fork: Option<ForkSection>,

    /// Open PR listing
    pub pulls: Option<PullsSection>,

    /// HTTP server settings
    pub server: Option<ServerSection>,

    /// Logging settings
    pub log: Option<LogSection>,
}

impl FileConfig {
    /// Validate the configuration values that are present.
    ///
    /// Required values (token, committer) are checked separately when a
    /// command actually needs them.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(github) = &self.github {
            github.validate()?;
        }
        if let Some(committer) = &self.committer {
            committer.validate()?;
        }
        if let Some(submission) = &self.submission {
            submission.validate()?;
        }
        if let Some(fork) = &self.fork {
            fork.validate()?;
        }
        if let Some(pulls) = &self.pulls {
            pulls.validate()?;
        }
        if let Some(server) = &self.server {
            server.validate()?;
        }
        if let Some(log) = &self.log {
            log.validate()?;
        }
        Ok(())
    }
}

/// GitHub API access.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubSection {
    /// API base URL (default: `https://api.github.com`)
    pub api_base: Option<String>,

    /// Bearer token with fork, contents and pull request access
    pub token: Option<String>,

    /// Per-request timeout in seconds (default: 20)
    pub timeout_secs: Option<u64>,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSection")
            .field("api_base", &self.api_base)
            .field("has_token", &self.token.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GitHubSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.api_base {
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "github.api_base must be an http(s) URL, got '{}'",
                    base
                )));
            }
        }
        if let Some(token) = &self.token {
            if token.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "github.token cannot be empty".into(),
                ));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "github.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Identity used for commits.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CommitterSection {
    /// Committer name
    pub name: Option<String>,

    /// Committer email
    pub email: Option<String>,
}

impl CommitterSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "committer.name cannot be empty".into(),
                ));
            }
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(ConfigError::InvalidValue(format!(
                    "committer.email is not an email address: '{}'",
                    email
                )));
            }
        }
        Ok(())
    }
}

/// File, commit and PR text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SubmissionSection {
    /// Path of the metadata file inside the fork (default: `metadata.json`)
    pub file_path: Option<String>,

    /// Commit message for the file write
    pub commit_message: Option<String>,

    /// Title of created pull requests
    pub pr_title: Option<String>,

    /// Body of created pull requests
    pub pr_body: Option<String>,
}

impl SubmissionSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.file_path {
            if path.is_empty() || path.starts_with('/') || path.ends_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "submission.file_path must be a relative file path, got '{}'",
                    path
                )));
            }
        }
        Ok(())
    }
}

/// Metadata parsing behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataSection {
    /// Reject unrecognized media types instead of parsing them as JSON-LD
    pub strict_media_type: Option<bool>,
}

/// Content upsert behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ContentSection {
    /// Fail when the existing-file lookup returns an unexpected status
    pub strict_lookup: Option<bool>,
}

/// Fork readiness polling.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForkSection {
    /// Delay before the first readiness probe (default: 2)
    pub initial_delay_secs: Option<u64>,

    /// Delay between readiness probes (default: 5)
    pub poll_interval_secs: Option<u64>,

    /// Upper bound on time spent waiting for the fork (default: 120)
    pub max_wait_secs: Option<u64>,

    /// Upper bound on readiness probes (default: 30)
    pub max_attempts: Option<u32>,
}

impl ForkSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "fork.poll_interval_secs must be greater than 0".into(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::InvalidValue(
                "fork.max_attempts must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Open PR listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PullsSection {
    /// Maximum pages of open PRs to scan (default: 10)
    pub max_pages: Option<u32>,
}

impl PullsSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == Some(0) {
            return Err(ConfigError::InvalidValue(
                "pulls.max_pages must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// HTTP server settings.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Listen address (default: `127.0.0.1:8080`)
    pub listen: Option<String>,

    /// Bearer token required on `/submit` (unset disables the check)
    pub api_token: Option<String>,

    /// Overall deadline for one submission request (default: 300)
    pub request_timeout_secs: Option<u64>,
}

// Custom Debug to avoid exposing api_token
impl std::fmt::Debug for ServerSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSection")
            .field("listen", &self.listen)
            .field("has_api_token", &self.api_token.is_some())
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ServerSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(listen) = &self.listen {
            listen.parse::<SocketAddr>().map_err(|_| {
                ConfigError::InvalidValue(format!(
                    "server.listen is not a socket address: '{}'",
                    listen
                ))
            })?;
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "server.request_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    /// Level filter directive (default: `info`)
    pub level: Option<String>,

    /// Output format: `text` or `json` (default: `text`)
    pub format: Option<String>,
}

impl LogSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(format) = &self.format {
            LogFormat::parse(format)?;
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse a format name (case-insensitive).
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue(format!(
                "invalid log format '{}', must be one of: text, json",
                other
            ))),
        }
    }
}
