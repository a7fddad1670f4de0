use axum::Json;
use serde::Serialize;
use verification::SearchConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    search_configured: bool,
    model_configured: bool,
}

/// Liveness plus configuration report. The pipeline holds no connections or
/// state to probe, so reaching the handler is the liveness signal; the flags
/// say whether a search backend and a model backend are set up, without
/// exposing any key material.
pub async fn health_handler() -> Json<HealthResponse> {
    let config = SearchConfig::from_env();
    Json(HealthResponse {
        status: "ok",
        search_configured: config.any_configured(),
        model_configured: config.llm.is_some(),
    })
}
