//! telemetry
//!
//! Structured logging setup.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! The filter is taken from `RUST_LOG` when set, otherwise from the
//! configured level; `--debug` and `--quiet` override both.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::LogFormat;

/// Verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Normal,
    Debug,
    Quiet,
}

/// Logging settings resolved from config and flags.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
    pub verbosity: Verbosity,
}

impl LogSettings {
    /// Filter directive after applying the verbosity override.
    pub fn directive(&self) -> String {
        match self.verbosity {
            Verbosity::Debug => "debug".to_string(),
            Verbosity::Quiet => "warn".to_string(),
            Verbosity::Normal => self.level.clone(),
        }
    }

    fn filter(&self) -> anyhow::Result<EnvFilter> {
        self.filter_with(EnvFilter::try_from_default_env().ok())
    }

    fn filter_with(&self, from_env: Option<EnvFilter>) -> anyhow::Result<EnvFilter> {
        if self.verbosity == Verbosity::Normal {
            if let Some(filter) = from_env {
                return Ok(filter);
            }
        }
        let directive = self.directive();
        EnvFilter::try_new(&directive)
            .map_err(|e| anyhow::anyhow!("invalid log level '{}': {}", directive, e))
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the level directive is invalid or a subscriber is already set.
pub fn init(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = settings.filter()?;

    let registry = tracing_subscriber::registry().with(filter);
    match settings.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(level: &str, verbosity: Verbosity) -> LogSettings {
        LogSettings {
            level: level.to_string(),
            format: LogFormat::Text,
            verbosity,
        }
    }

    #[test]
    fn verbosity_overrides_level() {
        assert_eq!(settings("info", Verbosity::Normal).directive(), "info");
        assert_eq!(settings("info", Verbosity::Debug).directive(), "debug");
        assert_eq!(settings("trace", Verbosity::Quiet).directive(), "warn");
    }

    #[test]
    fn module_directives_are_accepted() {
        let s = settings("smp_submitter=debug,reqwest=warn", Verbosity::Normal);
        assert!(s.filter_with(None).is_ok());
    }

    #[test]
    fn verbosity_flags_ignore_environment() {
        let from_env = EnvFilter::new("trace");
        let s = settings("info", Verbosity::Quiet);
        assert_eq!(s.filter_with(Some(from_env)).unwrap().to_string(), "warn");
    }

    #[test]
    fn invalid_level_is_rejected() {
        let err = settings("smp_submitter=loud", Verbosity::Normal)
            .filter_with(None)
            .unwrap_err();
        assert!(err.to_string().contains("smp_submitter=loud"));
    }
}
