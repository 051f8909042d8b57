//! Request handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use super::AppState;
use crate::submit::{FailureKind, SubmissionError};

/// Body returned on a successful submission.
pub const SUCCESS_MESSAGE: &str = "Notification sent successfully!";

/// Errors a handler turns into a response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized submission request.")]
    Unauthorized,

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("submission did not finish within {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Submission(err) => match err.kind() {
                FailureKind::BadInput => StatusCode::BAD_REQUEST,
                FailureKind::Unauthorized => StatusCode::UNAUTHORIZED,
                FailureKind::Upstream => StatusCode::BAD_GATEWAY,
            },
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "submission failed");
        } else {
            info!(status = status.as_u16(), error = %self, "submission rejected");
        }
        (status, self.to_string()).into_response()
    }
}

/// Build identification served on `/`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub name: &'static str,
    pub package_version: &'static str,
    pub version: &'static str,
    pub built_at: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            package_version: env!("CARGO_PKG_VERSION"),
            version: option_env!("SMP_BUILD_VERSION").unwrap_or("unknown"),
            built_at: option_env!("SMP_BUILT_AT").unwrap_or("unknown"),
        }
    }
}

/// GET /
pub async fn build_info() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}

/// POST /submit
///
/// The body is the metadata document; `Content-Type` selects the parser.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    authorize(&state, &headers)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let span = info_span!("submit", content_type = %content_type, bytes = body.len());

    async {
        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();

        let receipt = tokio::time::timeout(
            state.request_timeout,
            state
                .submitter
                .submit_with_cancel(&body, &content_type, &cancel),
        )
        .await
        .map_err(|_| ApiError::Timeout(state.request_timeout))??;

        let url = receipt.pull_request_url().to_string();
        info!(pr = %url, "submission accepted");
        Ok::<_, ApiError>((
            StatusCode::CREATED,
            [(header::LOCATION, url)],
            Json(json!({ "message": SUCCESS_MESSAGE })),
        )
            .into_response())
    }
    .instrument(span)
    .await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.api_token.as_deref() else {
        debug!("no API token configured, skipping authorization");
        return Ok(());
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{FailOn, MockForge, MockOperation};
    use crate::forge::ForgeError;
    use crate::server::router;
    use crate::submit::content::Committer;
    use crate::submit::fork::ForkPolicy;
    use crate::submit::{Submitter, SubmitterConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const DOC: &str = r#"{
        "@context": {"schema": "https://schema.org/"},
        "schema:codeRepository": "https://github.com/acme/widgets"
    }"#;

    fn state_with(forge: Arc<MockForge>, api_token: Option<&str>) -> AppState {
        let mut config = SubmitterConfig::new(Committer {
            name: "SMP Bot".into(),
            email: "bot@example.org".into(),
        });
        config.fork_policy = ForkPolicy {
            initial_delay: Duration::ZERO,
            ..ForkPolicy::default()
        };
        AppState {
            submitter: Submitter::new(forge, config),
            api_token: api_token.map(String::from),
            request_timeout: Duration::from_secs(30),
        }
    }

    fn submit_request(body: impl Into<Body>, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/submit")
            .header("Content-Type", "application/ld+json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder.body(body.into()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn build_info_route() {
        let app = router(state_with(Arc::new(MockForge::new()), None));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let info: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(info["name"], "smp-submitter");
        assert_eq!(info["packageVersion"], env!("CARGO_PKG_VERSION"));
        assert!(info["version"].is_string());
        assert!(info["builtAt"].is_string());
    }

    #[tokio::test]
    async fn successful_submission() {
        let forge = Arc::new(MockForge::new());
        let app = router(state_with(forge.clone(), Some("tok")));

        let response = app.oneshot(submit_request(DOC, Some("tok"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://github.com/acme/widgets/pull/1"
        );
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, json!({ "message": "Notification sent successfully!" }));
    }

    #[tokio::test]
    async fn missing_or_wrong_token_is_rejected() {
        let forge = Arc::new(MockForge::new());
        let app = router(state_with(forge.clone(), Some("tok")));

        let response = app
            .clone()
            .oneshot(submit_request(DOC, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "Unauthorized submission request.");

        let response = app.oneshot(submit_request(DOC, Some("nope"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(forge.operations().is_empty());
    }

    #[tokio::test]
    async fn auth_disabled_without_token() {
        let app = router(state_with(Arc::new(MockForge::new()), None));
        let response = app.oneshot(submit_request(DOC, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn bad_input_is_400() {
        let app = router(state_with(Arc::new(MockForge::new()), None));

        let response = app
            .clone()
            .oneshot(submit_request(r#"{"schema:name": "x"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("codeRepository"));

        let response = app
            .oneshot(submit_request(vec![0xff, 0xfe, 0x00], None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_takes_fallback_path() {
        let app = router(state_with(Arc::new(MockForge::new()), None));
        let request = Request::builder()
            .method("POST")
            .uri("/submit")
            .body(Body::from(DOC))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn upstream_failures_map_to_status() {
        let forge = Arc::new(MockForge::new().fail_on(FailOn::CreateFork(ForgeError::Api {
            status: 401,
            body: "Bad credentials".into(),
        })));
        let response = router(state_with(forge, None))
            .oneshot(submit_request(DOC, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response)
            .await
            .starts_with("failed to create a fork and submit PR: "));

        let forge = Arc::new(MockForge::new().fail_on(FailOn::CreatePull(ForgeError::Api {
            status: 422,
            body: "Validation Failed".into(),
        })));
        let response = router(state_with(forge, None))
            .oneshot(submit_request(DOC, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_504() {
        let forge = Arc::new(MockForge::new().never_ready());
        let mut state = state_with(forge.clone(), None);
        state.request_timeout = Duration::from_secs(20);

        let response = router(state).oneshot(submit_request(DOC, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            forge.count(|op| matches!(op, MockOperation::PutFile { .. })),
            0
        );
    }
}
