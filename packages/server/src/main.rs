// Main entry point for the verification API server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::{build_app, AppState, LoggingSink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verification::Orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,verification=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting source verification API");

    let state = AppState {
        verifier: Arc::new(Orchestrator::from_env()),
        reply: Arc::new(LoggingSink),
    };
    let app = build_app(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{port}");
    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
