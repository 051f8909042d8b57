//! metadata::resolver
//!
//! Finds the GitHub repository a metadata document describes.
//!
//! The target is the first `schema:codeRepository` value of the form
//! `https://github.com/<owner>/<repo>`. Literal and IRI values are both
//! considered; blank nodes are skipped.

use oxrdf::{NamedNodeRef, Term};
use tracing::debug;

use super::store::TripleStore;
use super::MetadataError;
use crate::core::types::RepositoryRef;

/// Predicate naming a software project's source repository.
pub const CODE_REPOSITORY: &str = "https://schema.org/codeRepository";

/// Prefix every accepted repository URL starts with.
pub const GITHUB_PREFIX: &str = "https://github.com/";

/// Resolve the target repository from a triple store.
///
/// # Errors
///
/// Returns [`MetadataError::NoRepositoryFound`] when no value qualifies.
pub fn resolve_repository(store: &TripleStore) -> Result<RepositoryRef, MetadataError> {
    let predicate = NamedNodeRef::new_unchecked(CODE_REPOSITORY);

    for object in store.objects_for_predicate(predicate) {
        let value = match object {
            Term::Literal(literal) => literal.value(),
            Term::NamedNode(node) => node.as_str(),
            _ => continue,
        };

        match parse_github_repository_url(value) {
            Some(repo) => {
                debug!(candidate = value, repository = %repo, "resolved target repository");
                return Ok(repo);
            }
            None => debug!(candidate = value, "skipping codeRepository value"),
        }
    }

    Err(MetadataError::NoRepositoryFound)
}

/// Parse `https://github.com/<owner>/<repo>` into a repository reference.
///
/// The remainder after the prefix must contain exactly one `/` with
/// non-empty segments on both sides. No other normalisation is applied.
///
/// # Example
///
/// ```
/// use smp_submitter::metadata::parse_github_repository_url;
///
/// let repo = parse_github_repository_url("https://github.com/acme/widgets").unwrap();
/// assert_eq!(repo.owner(), "acme");
/// assert!(parse_github_repository_url("https://github.com/acme/widgets/").is_none());
/// assert!(parse_github_repository_url("https://gitlab.com/acme/widgets").is_none());
/// ```
pub fn parse_github_repository_url(url: &str) -> Option<RepositoryRef> {
    let rest = url.strip_prefix(GITHUB_PREFIX)?;
    let (owner, name) = rest.split_once('/')?;
    if name.contains('/') {
        return None;
    }
    RepositoryRef::new(owner, name).ok()
}
