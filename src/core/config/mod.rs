//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! The submitter is configured process-wide: the GitHub credential, the
//! committer identity and the tuning knobs for each submission step. The
//! result is injected into the [`Submitter`](crate::submit::Submitter) and the
//! server at construction time; nothing reads configuration ambiently.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file (`--config <path>` or `$SMP_SUBMITTER_CONFIG`)
//! 3. Environment variables
//! 4. CLI flags (not handled here)
//!
//! # Environment Variables
//!
//! | Variable          | Key                  |
//! |-------------------|----------------------|
//! | `GITHUB_TOKEN`    | `github.token`       |
//! | `GITHUB_API_URL`  | `github.api_base`    |
//! | `GITHUB_NAME`     | `committer.name`     |
//! | `GITHUB_EMAIL`    | `committer.email`    |
//! | `API_TOKEN`       | `server.api_token`   |
//! | `SMP_LISTEN_ADDR` | `server.listen`      |
//! | `LOG_LEVEL`       | `log.level`          |
//! | `LOG_FORMAT`      | `log.format`         |
//!
//! # Example
//!
//! ```no_run
//! use smp_submitter::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! let submitter_config = config.submitter_config().unwrap();
//! println!("Writing {}", submitter_config.file_path);
//! ```

pub mod schema;

pub use schema::{FileConfig, LogFormat};

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::metadata::MediaTypePolicy;
use crate::submit::content::{Committer, LookupPolicy};
use crate::submit::fork::ForkPolicy;
use crate::submit::SubmitterConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SMP_SUBMITTER_CONFIG";

/// Default GitHub API base URL.
pub use crate::forge::github::DEFAULT_API_BASE;

/// Default path of the metadata file inside the fork.
pub const DEFAULT_FILE_PATH: &str = "metadata.json";

/// Default commit message and PR title.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update metadata from maSMP";

/// Default PR body.
pub const DEFAULT_PR_BODY: &str =
    "Hey! This metadata has been submitted from the Software Management Wizard via maSMP.";

const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Default number of PR list pages scanned.
pub const DEFAULT_MAX_PULL_PAGES: u32 = 10;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: '{0}'")]
    NotFound(PathBuf),

    #[error("missing required setting '{key}' (set it in the config file or via ${env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration.
///
/// Accessor methods apply defaults, so callers never see an unset value
/// for anything that has one.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Merged file + environment values
    pub file: FileConfig,
    /// Path to the config file (if loaded)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the given file (or `$SMP_SUBMITTER_CONFIG`)
    /// and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing or cannot be
    /// parsed, or if any value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load configuration using a custom environment lookup.
    ///
    /// The lookup is consulted both for `$SMP_SUBMITTER_CONFIG` and for the
    /// value overrides. Empty values are treated as unset.
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => env(CONFIG_ENV).map(PathBuf::from),
        };

        let mut file = match &path {
            Some(p) => Self::read_file(p)?,
            None => FileConfig::default(),
        };

        Self::apply_env(&mut file, env);
        file.validate()?;

        Ok(Self { file, path })
    }

    /// Build a config directly from a parsed file (no environment).
    pub fn from_file_config(file: FileConfig) -> Result<Self, ConfigError> {
        file.validate()?;
        Ok(Self { file, path: None })
    }

    /// Read and parse a config file.
    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Overlay environment variables onto the file values.
    fn apply_env<F>(file: &mut FileConfig, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env("GITHUB_TOKEN") {
            file.github.get_or_insert_with(Default::default).token = Some(v);
        }
        if let Some(v) = env("GITHUB_API_URL") {
            file.github.get_or_insert_with(Default::default).api_base = Some(v);
        }
        if let Some(v) = env("GITHUB_NAME") {
            file.committer.get_or_insert_with(Default::default).name = Some(v);
        }
        if let Some(v) = env("GITHUB_EMAIL") {
            file.committer.get_or_insert_with(Default::default).email = Some(v);
        }
        if let Some(v) = env("API_TOKEN") {
            file.server.get_or_insert_with(Default::default).api_token = Some(v);
        }
        if let Some(v) = env("SMP_LISTEN_ADDR") {
            file.server.get_or_insert_with(Default::default).listen = Some(v);
        }
        if let Some(v) = env("LOG_LEVEL") {
            file.log.get_or_insert_with(Default::default).level = Some(v);
        }
        if let Some(v) = env("LOG_FORMAT") {
            file.log.get_or_insert_with(Default::default).format = Some(v);
        }
    }

    /// Path of the loaded config file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Get the GitHub API base URL.
    ///
    /// Defaults to `https://api.github.com`.
    pub fn github_api_base(&self) -> &str {
        self.file
            .github
            .as_ref()
            .and_then(|g| g.api_base.as_deref())
            .map(|b| b.trim_end_matches('/'))
            .unwrap_or(DEFAULT_API_BASE)
    }

    /// Get the GitHub token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no token is configured.
    pub fn github_token(&self) -> Result<&str, ConfigError> {
        self.file
            .github
            .as_ref()
            .and_then(|g| g.token.as_deref())
            .ok_or(ConfigError::Missing {
                key: "github.token",
                env: "GITHUB_TOKEN",
            })
    }

    /// Get the per-request GitHub timeout.
    ///
    /// Defaults to 20 seconds.
    pub fn github_timeout(&self) -> Duration {
        let secs = self
            .file
            .github
            .as_ref()
            .and_then(|g| g.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Get the committer identity.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if name or email is not configured.
    pub fn committer(&self) -> Result<Committer, ConfigError> {
        let section = self.file.committer.as_ref();
        let name = section
            .and_then(|c| c.name.clone())
            .ok_or(ConfigError::Missing {
                key: "committer.name",
                env: "GITHUB_NAME",
            })?;
        let email = section
            .and_then(|c| c.email.clone())
            .ok_or(ConfigError::Missing {
                key: "committer.email",
                env: "GITHUB_EMAIL",
            })?;
        Ok(Committer { name, email })
    }

    /// Get the media type policy.
    ///
    /// Defaults to parsing unrecognized types as JSON-LD.
    pub fn media_type_policy(&self) -> MediaTypePolicy {
        let strict = self
            .file
            .metadata
            .as_ref()
            .and_then(|m| m.strict_media_type)
            .unwrap_or(false);
        if strict {
            MediaTypePolicy::Strict
        } else {
            MediaTypePolicy::Fallback
        }
    }

    /// Get the existing-file lookup policy.
    ///
    /// Defaults to lenient.
    pub fn lookup_policy(&self) -> LookupPolicy {
        let strict = self
            .file
            .content
            .as_ref()
            .and_then(|c| c.strict_lookup)
            .unwrap_or(false);
        if strict {
            LookupPolicy::Strict
        } else {
            LookupPolicy::Lenient
        }
    }

    /// Get the fork readiness polling policy.
    pub fn fork_policy(&self) -> ForkPolicy {
        let defaults = ForkPolicy::default();
        let Some(fork) = self.file.fork.as_ref() else {
            return defaults;
        };
        ForkPolicy {
            initial_delay: fork
                .initial_delay_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.initial_delay),
            poll_interval: fork
                .poll_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            max_wait: fork
                .max_wait_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_wait),
            max_attempts: fork.max_attempts.unwrap_or(defaults.max_attempts),
        }
    }

    /// Get the maximum number of open-PR pages to scan.
    ///
    /// Defaults to 10.
    pub fn max_pull_pages(&self) -> u32 {
        self.file
            .pulls
            .as_ref()
            .and_then(|p| p.max_pages)
            .unwrap_or(DEFAULT_MAX_PULL_PAGES)
    }

    /// Build the injected submitter configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the committer identity is incomplete.
    pub fn submitter_config(&self) -> Result<SubmitterConfig, ConfigError> {
        let submission = self.file.submission.clone().unwrap_or_default();
        let commit_message = submission
            .commit_message
            .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string());

        Ok(SubmitterConfig {
            committer: self.committer()?,
            file_path: submission
                .file_path
                .unwrap_or_else(|| DEFAULT_FILE_PATH.to_string()),
            pr_title: submission
                .pr_title
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
            pr_body: submission
                .pr_body
                .unwrap_or_else(|| DEFAULT_PR_BODY.to_string()),
            commit_message,
            media_type_policy: self.media_type_policy(),
            lookup_policy: self.lookup_policy(),
            fork_policy: self.fork_policy(),
            max_pull_pages: self.max_pull_pages(),
        })
    }

    /// Get the server listen address.
    ///
    /// Defaults to `127.0.0.1:8080`.
    pub fn server_listen(&self) -> Result<SocketAddr, ConfigError> {
        let listen = self
            .file
            .server
            .as_ref()
            .and_then(|s| s.listen.as_deref())
            .unwrap_or(DEFAULT_LISTEN);
        listen.parse().map_err(|_| {
            ConfigError::InvalidValue(format!("server.listen is not a socket address: '{}'", listen))
        })
    }

    /// Get the inbound API token, if inbound auth is enabled.
    pub fn server_api_token(&self) -> Option<&str> {
        self.file.server.as_ref().and_then(|s| s.api_token.as_deref())
    }

    /// Get the per-request submission deadline.
    ///
    /// Defaults to 300 seconds.
    pub fn server_request_timeout(&self) -> Duration {
        let secs = self
            .file
            .server
            .as_ref()
            .and_then(|s| s.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Get the log level directive.
    ///
    /// Defaults to `info`.
    pub fn log_level(&self) -> &str {
        self.file
            .log
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    /// Get the log output format.
    ///
    /// Defaults to text.
    pub fn log_format(&self) -> LogFormat {
        self.file
            .log
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .and_then(|f| LogFormat::parse(f).ok())
            .unwrap_or_default()
    }
}
