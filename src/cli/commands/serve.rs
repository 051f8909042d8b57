//! serve command - Run the HTTP service

use std::net::SocketAddr;

use anyhow::Result;

use super::github_submitter;
use crate::cli::Context;
use crate::server::{self, AppState};

/// Serve submissions until Ctrl-C.
pub fn serve(ctx: &Context, listen: Option<SocketAddr>) -> Result<()> {
    let config = &ctx.config;
    let addr = match listen {
        Some(addr) => addr,
        None => config.server_listen()?,
    };

    let state = AppState {
        submitter: github_submitter(ctx)?,
        api_token: config.server_api_token().map(String::from),
        request_timeout: config.server_request_timeout(),
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(server::serve(addr, state))
}
