//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Async Commands
//!
//! `serve` and `submit` talk to GitHub and run on a tokio runtime created
//! inside the handler; `resolve` is synchronous and needs no credentials.

mod resolve;
mod serve;
mod submit;

pub use resolve::resolve;
pub use serve::serve;
pub use submit::submit;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::args::Command;
use super::Context;
use crate::forge::github::GitHubForge;
use crate::submit::Submitter;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Serve { listen } => serve(ctx, listen),
        Command::Submit { file, content_type } => submit(ctx, &file, &content_type),
        Command::Resolve { file, content_type } => resolve(ctx, &file, &content_type),
    }
}

/// Read a document from `path`, or from stdin when `path` is `-`.
pub(crate) fn read_document(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read document from stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))
}

/// Build a submitter backed by the GitHub API from the loaded config.
pub(crate) fn github_submitter(ctx: &Context) -> Result<Submitter> {
    let config = &ctx.config;
    let submitter_config = config.submitter_config()?;
    let forge = GitHubForge::new(
        config.github_token()?,
        config.github_api_base(),
        config.github_timeout(),
    )?;
    Ok(Submitter::new(Arc::new(forge), submitter_config))
}
