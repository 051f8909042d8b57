//! submit command - Submit one document from the command line

use std::path::Path;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::{github_submitter, read_document};
use crate::cli::Context;
use crate::submit::content::UpsertOutcome;

/// Submit a document and print the pull request URL.
///
/// Ctrl-C cancels the wait for the fork.
pub fn submit(ctx: &Context, file: &Path, content_type: &str) -> Result<()> {
    let content = read_document(file)?;
    let submitter = github_submitter(ctx)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling submission");
                trigger.cancel();
            }
        });

        let receipt = submitter
            .submit_with_cancel(&content, content_type, &cancel)
            .await?;

        if !ctx.quiet {
            let outcome = match receipt.upsert {
                UpsertOutcome::Created(_) => "created",
                UpsertOutcome::Updated(_) => "updated",
                UpsertOutcome::Unchanged(_) => "unchanged",
            };
            eprintln!(
                "Submitted to {} via fork {} (file {})",
                receipt.repository, receipt.fork.full_name, outcome
            );
        }
        println!("{}", receipt.pull_request_url());
        Ok::<_, anyhow::Error>(())
    })
}
