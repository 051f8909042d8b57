//! metadata
//!
//! Loading software metadata documents and resolving their target repository.
//!
//! # Pipeline
//!
//! ```text
//! bytes + Content-Type ──► MetadataDocument ──► TripleStore ──► RepositoryRef
//!                          (media type)        (loader)        (resolver)
//! ```
//!
//! # Modules
//!
//! - [`loader`]: JSON-LD expansion into triples
//! - [`store`]: In-memory, insertion-ordered triple store
//! - [`resolver`]: `schema:codeRepository` → `owner/repo`
//!
//! # Media Types
//!
//! JSON-LD is the only supported serialization. Documents declared with an
//! unrecognized media type are still parsed as JSON-LD under
//! [`MediaTypePolicy::Fallback`] (the long-standing behavior); use
//! [`MediaTypePolicy::Strict`] to reject them instead.
//!
//! # Example
//!
//! ```
//! use smp_submitter::metadata::{MediaTypePolicy, MetadataDocument};
//!
//! let doc = MetadataDocument::new(
//!     r#"{"@context": {"schema": "https://schema.org/"},
//!         "schema:codeRepository": "https://github.com/acme/widgets"}"#,
//!     "application/ld+json",
//! );
//! let repo = doc.resolve_repository(MediaTypePolicy::Fallback).unwrap();
//! assert_eq!(repo.full_name(), "acme/widgets");
//! ```

pub mod loader;
pub mod resolver;
pub mod store;

pub use resolver::{parse_github_repository_url, resolve_repository, CODE_REPOSITORY};
pub use store::TripleStore;

use thiserror::Error;
use tracing::warn;

use crate::core::types::RepositoryRef;

/// Errors from loading and resolving metadata. All of them mean bad input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    /// The document is not valid linked data.
    #[error("failed to parse metadata as JSON-LD: {0}")]
    Parse(String),

    /// The declared media type is not supported (strict policy only).
    #[error("unsupported media type '{0}', expected application/ld+json")]
    UnsupportedMediaType(String),

    /// No `schema:codeRepository` value names a GitHub repository.
    #[error("no valid GitHub repository found as schema:codeRepository")]
    NoRepositoryFound,
}

/// What to do with an unrecognized declared media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaTypePolicy {
    /// Parse as JSON-LD anyway (and log a warning)
    #[default]
    Fallback,
    /// Fail with [`MetadataError::UnsupportedMediaType`]
    Strict,
}

/// Declared media type of a metadata document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    /// `application/ld+json`
    JsonLd,
    /// `application/json` (JSON-LD served as plain JSON)
    Json,
    /// Anything else, normalised
    Other(String),
}

impl MediaType {
    /// Parse a `Content-Type` value, ignoring parameters such as `charset`.
    ///
    /// # Example
    ///
    /// ```
    /// use smp_submitter::metadata::MediaType;
    ///
    /// assert_eq!(
    ///     MediaType::from_content_type("Application/LD+JSON; charset=utf-8"),
    ///     MediaType::JsonLd
    /// );
    /// ```
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/ld+json" => MediaType::JsonLd,
            "application/json" => MediaType::Json,
            _ => MediaType::Other(essence),
        }
    }

    /// Check whether this type names a JSON-LD serialization.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, MediaType::Other(_))
    }

    /// Get the normalised media type string.
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::JsonLd => "application/ld+json",
            MediaType::Json => "application/json",
            MediaType::Other(s) => s,
        }
    }
}

/// A metadata document as received: text plus declared media type.
#[derive(Debug, Clone)]
pub struct MetadataDocument {
    text: String,
    media_type: MediaType,
}

impl MetadataDocument {
    /// Create a document from text and a `Content-Type` value.
    pub fn new(text: impl Into<String>, content_type: &str) -> Self {
        Self {
            text: text.into(),
            media_type: MediaType::from_content_type(content_type),
        }
    }

    /// Create a document from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Parse`] if the bytes are not UTF-8.
    pub fn from_bytes(bytes: &[u8], content_type: &str) -> Result<Self, MetadataError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| MetadataError::Parse(format!("document is not valid UTF-8: {}", e)))?;
        Ok(Self::new(text, content_type))
    }

    /// Get the document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the declared media type.
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /// Parse the document into a triple store.
    ///
    /// # Errors
    ///
    /// - [`MetadataError::UnsupportedMediaType`] under the strict policy
    /// - [`MetadataError::Parse`] if the document is not valid JSON-LD
    pub fn load(&self, policy: MediaTypePolicy) -> Result<TripleStore, MetadataError> {
        if !self.media_type.is_recognized() {
            match policy {
                MediaTypePolicy::Strict => {
                    return Err(MetadataError::UnsupportedMediaType(
                        self.media_type.as_str().to_string(),
                    ));
                }
                MediaTypePolicy::Fallback => {
                    warn!(
                        media_type = self.media_type.as_str(),
                        "unrecognized media type, parsing as JSON-LD"
                    );
                }
            }
        }

        loader::parse_json_ld(&self.text)
    }

    /// Parse the document and resolve its target repository.
    pub fn resolve_repository(
        &self,
        policy: MediaTypePolicy,
    ) -> Result<RepositoryRef, MetadataError> {
        let store = self.load(policy)?;
        resolve_repository(&store)
    }
}
