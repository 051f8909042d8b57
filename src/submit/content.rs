//! submit::content
//!
//! Create-or-update of the metadata file on the fork's default branch.
//!
//! The current revision of the file is looked up first so the write can
//! replace it. A lookup that fails with anything other than 404 is tolerated
//! under [`LookupPolicy::Lenient`]: the write proceeds without a revision and
//! the remote decides. Identical content is never written twice.

use tracing::{info, warn};

use super::{StepError, SubmitterConfig};
use crate::core::types::{FileRevision, ForkHandle};
use crate::forge::{ExistingFile, Forge, PutFileRequest};

pub use crate::forge::Committer;

/// How to treat a failed lookup of the current file revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPolicy {
    /// Log and write without a revision
    #[default]
    Lenient,
    /// Fail the step
    Strict,
}

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The file did not exist and was created.
    Created(FileRevision),
    /// The file existed and now holds the new content.
    Updated(FileRevision),
    /// The file already held exactly this content; nothing was written.
    Unchanged(FileRevision),
}

impl UpsertOutcome {
    /// Revision of the file after the upsert.
    pub fn revision(&self) -> &FileRevision {
        match self {
            UpsertOutcome::Created(r) | UpsertOutcome::Updated(r) | UpsertOutcome::Unchanged(r) => r,
        }
    }

    /// Check whether a write was made.
    pub fn wrote(&self) -> bool {
        !matches!(self, UpsertOutcome::Unchanged(_))
    }
}

/// Writes the metadata file into a fork.
pub struct ContentUpsert<'a> {
    forge: &'a dyn Forge,
    config: &'a SubmitterConfig,
}

impl<'a> ContentUpsert<'a> {
    pub fn new(forge: &'a dyn Forge, config: &'a SubmitterConfig) -> Self {
        Self { forge, config }
    }

    /// Write `content` to the configured path on the fork's default branch.
    pub async fn upsert(&self, fork: &ForkHandle, content: &[u8]) -> Result<UpsertOutcome, StepError> {
        let path = &self.config.file_path;
        let existing = self.lookup(fork).await?;

        if let Some(file) = &existing {
            if file.content == content {
                info!(fork = %fork.full_name, path = %path, "file content unchanged, skipping write");
                return Ok(UpsertOutcome::Unchanged(file.revision.clone()));
            }
        }

        let revision = existing.map(|f| f.revision);
        let replacing = revision.is_some();

        let written = self
            .forge
            .put_file(PutFileRequest {
                repository: fork.full_name.clone(),
                path: path.clone(),
                branch: fork.default_branch.clone(),
                message: self.config.commit_message.clone(),
                content: content.to_vec(),
                committer: self.config.committer.clone(),
                revision,
            })
            .await
            .map_err(|error| StepError::ContentWrite {
                path: path.clone(),
                error,
            })?;

        info!(fork = %fork.full_name, path = %path, revision = %written, replacing, "file written");
        Ok(if replacing {
            UpsertOutcome::Updated(written)
        } else {
            UpsertOutcome::Created(written)
        })
    }

    /// Fetch the current file, applying the lookup policy to failures.
    async fn lookup(&self, fork: &ForkHandle) -> Result<Option<ExistingFile>, StepError> {
        let path = &self.config.file_path;
        match self
            .forge
            .get_file(&fork.full_name, path, &fork.default_branch)
            .await
        {
            Ok(found) => Ok(found),
            Err(error) => match self.config.lookup_policy {
                LookupPolicy::Strict => Err(StepError::ContentWrite {
                    path: path.clone(),
                    error,
                }),
                LookupPolicy::Lenient => {
                    warn!(
                        fork = %fork.full_name,
                        path = %path,
                        error = %error,
                        "could not look up current file revision, writing without one"
                    );
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{blob_revision, FailOn, MockForge, MockOperation};
    use crate::forge::ForgeError;

    fn fork() -> ForkHandle {
        ForkHandle {
            full_name: "smp-bot/acme-widgets".into(),
            owner_login: "smp-bot".into(),
            default_branch: "main".into(),
        }
    }

    fn config() -> SubmitterConfig {
        SubmitterConfig::new(Committer {
            name: "SMP Bot".into(),
            email: "bot@example.org".into(),
        })
    }

    fn writes(forge: &MockForge) -> Vec<Option<String>> {
        forge
            .operations()
            .into_iter()
            .filter_map(|op| match op {
                MockOperation::PutFile { revision, .. } => Some(revision),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn first_write_has_no_revision_second_uses_captured_one() {
        let forge = MockForge::new();
        let config = config();
        let upsert = ContentUpsert::new(&forge, &config);

        let first = upsert.upsert(&fork(), b"one").await.unwrap();
        assert_eq!(first, UpsertOutcome::Created(blob_revision(b"one")));

        let second = upsert.upsert(&fork(), b"two").await.unwrap();
        assert_eq!(second, UpsertOutcome::Updated(blob_revision(b"two")));

        assert_eq!(
            writes(&forge),
            vec![None, Some(blob_revision(b"one").as_str().to_string())]
        );
        assert_eq!(
            forge.file("smp-bot/acme-widgets", "main", "metadata.json").unwrap(),
            b"two"
        );
    }

    #[tokio::test]
    async fn identical_content_is_not_rewritten() {
        let forge = MockForge::new();
        let config = config();
        let upsert = ContentUpsert::new(&forge, &config);

        upsert.upsert(&fork(), b"same").await.unwrap();
        let again = upsert.upsert(&fork(), b"same").await.unwrap();

        assert!(!again.wrote());
        assert_eq!(again.revision(), &blob_revision(b"same"));
        assert_eq!(writes(&forge).len(), 1);
    }

    #[tokio::test]
    async fn write_uses_committer_message_and_branch() {
        let forge = MockForge::new();
        let mut config = config();
        config.file_path = "codemeta.json".into();
        ContentUpsert::new(&forge, &config)
            .upsert(&fork(), b"{}")
            .await
            .unwrap();

        assert!(forge.operations().iter().any(|op| matches!(
            op,
            MockOperation::PutFile { path, branch, .. } if path == "codemeta.json" && branch == "main"
        )));
    }

    #[tokio::test]
    async fn lenient_lookup_failure_still_writes() {
        let forge = MockForge::new().fail_on(FailOn::GetFile(ForgeError::Api {
            status: 500,
            body: "boom".into(),
        }));
        let config = config();

        let outcome = ContentUpsert::new(&forge, &config)
            .upsert(&fork(), b"x")
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Created(blob_revision(b"x")));
        assert_eq!(writes(&forge), vec![None]);
    }

    #[tokio::test]
    async fn strict_lookup_failure_fails_closed() {
        let forge = MockForge::new().fail_on(FailOn::GetFile(ForgeError::Api {
            status: 500,
            body: "boom".into(),
        }));
        let mut config = config();
        config.lookup_policy = LookupPolicy::Strict;

        let err = ContentUpsert::new(&forge, &config)
            .upsert(&fork(), b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, StepError::ContentWrite { .. }));
        assert!(writes(&forge).is_empty());
    }

    #[tokio::test]
    async fn conflict_is_surfaced_not_retried() {
        let forge = MockForge::new().fail_on(FailOn::GetFile(ForgeError::Api {
            status: 502,
            body: "bad gateway".into(),
        }));
        forge.seed_file("smp-bot/acme-widgets", "main", "metadata.json", b"old");
        let config = config();

        let err = ContentUpsert::new(&forge, &config)
            .upsert(&fork(), b"new")
            .await
            .unwrap_err();
        assert_eq!(err.forge_error().and_then(ForgeError::status), Some(422));
        assert_eq!(writes(&forge).len(), 1);
    }
}
