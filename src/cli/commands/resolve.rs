//! resolve command - Print the target repository of a document

use std::path::Path;

use anyhow::Result;

use super::read_document;
use crate::cli::Context;
use crate::metadata::MetadataDocument;

/// Parse a document and print `owner/name` of its code repository.
pub fn resolve(ctx: &Context, file: &Path, content_type: &str) -> Result<()> {
    let bytes = read_document(file)?;
    let repository = MetadataDocument::from_bytes(&bytes, content_type)?
        .resolve_repository(ctx.config.media_type_policy())?;

    println!("{}", repository);
    Ok(())
}
