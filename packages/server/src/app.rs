//! Application setup and shared state.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use verification::orchestrator::ProgressSink;
use verification::{
    Orchestrator, PipelineError, PipelineResult, SemanticComparator, SourceSearch,
};

use crate::reply::ReplySink;
use crate::routes::{health_handler, verify_handler, webhook_handler};

/// The pipeline as seen by the HTTP layer.
///
/// Object-safe so the router can hold any orchestrator wiring (production or
/// test doubles) behind one state type.
#[async_trait]
pub trait VerifyService: Send + Sync {
    async fn verify(&self, input: &str) -> Result<PipelineResult, PipelineError>;

    async fn verify_with_progress(
        &self,
        input: &str,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineResult, PipelineError>;
}

#[async_trait]
impl<S, C> VerifyService for Orchestrator<S, C>
where
    S: SourceSearch,
    C: SemanticComparator,
{
    async fn verify(&self, input: &str) -> Result<PipelineResult, PipelineError> {
        self.run(input).await
    }

    async fn verify_with_progress(
        &self,
        input: &str,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineResult, PipelineError> {
        self.run_with_progress(input, progress).await
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn VerifyService>,
    pub reply: Arc<dyn ReplySink>,
}

/// Build the Axum application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/verify", post(verify_handler))
        .route("/webhook", post(webhook_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
