//! server
//!
//! HTTP front end for the submitter.
//!
//! # Routes
//!
//! | Method | Path      | Handler                    |
//! |--------|-----------|----------------------------|
//! | GET    | `/`       | [`handlers::build_info`]   |
//! | POST   | `/submit` | [`handlers::submit`]       |
//!
//! The [`Submitter`] is shared through [`AppState`]; requests carry no other
//! state and may run concurrently.

pub mod handlers;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::submit::Submitter;

/// Shared state for every request.
#[derive(Clone)]
pub struct AppState {
    pub submitter: Submitter,
    /// Bearer token required on `/submit`; `None` disables the check
    pub api_token: Option<String>,
    /// Deadline for a whole submission
    pub request_timeout: Duration,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("submitter", &self.submitter)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::build_info))
        .route("/submit", post(handlers::submit))
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    serve_with_shutdown(listener, state, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener.local_addr()?;
    if state.api_token.is_none() {
        info!("inbound authentication disabled: no API token configured");
    }
    info!(addr = %local, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
