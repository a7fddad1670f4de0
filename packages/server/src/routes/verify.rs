//! Synchronous JSON verification endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use verification::{LocatorError, PipelineError};

use crate::app::AppState;

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub text: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    remediation: Option<String>,
}

/// `POST /api/verify` — run the pipeline and return the structured result.
pub async fn verify_handler(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Response {
    match state.verifier.verify(&request.text).await {
        Ok(result) => {
            info!(sources = result.sources.len(), "verification completed");
            Json(result).into_response()
        }
        Err(error) => error_response(error),
    }
}

/// Map pipeline errors to HTTP statuses.
///
/// Client mistakes are 4xx, missing server-side configuration is 503, and an
/// upstream search failure is 502. Auth/quota failures carry a remediation
/// hint so an operator can fix credentials without reading logs.
fn error_response(error: PipelineError) -> Response {
    let (status, remediation) = match &error {
        PipelineError::EmptyInput => (StatusCode::BAD_REQUEST, None),
        PipelineError::NoSourcesFound => (StatusCode::NOT_FOUND, None),
        PipelineError::Search(locator) => match locator {
            LocatorError::NoProviderConfigured => {
                (StatusCode::SERVICE_UNAVAILABLE, locator.remediation())
            }
            LocatorError::Provider { .. } => (StatusCode::BAD_GATEWAY, locator.remediation()),
        },
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            remediation,
        }),
    )
        .into_response()
}
