//! Fire-and-forget chat webhook.
//!
//! The inbound transport expects an acknowledgement within a few seconds,
//! while the pipeline can take much longer. The handler therefore acks
//! immediately and runs the pipeline as a detached task; everything the user
//! sees from that point on arrives through the reply sink.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::app::AppState;
use crate::format::{format_error, format_result};
use crate::reply::ChatProgress;

#[derive(Deserialize)]
pub struct WebhookUpdate {
    pub chat_id: i64,
    pub text: String,
}

/// `POST /webhook` — always responds `{"ok": true}` right away; a non-ok
/// response would make the transport redeliver the same update.
pub async fn webhook_handler(
    State(state): State<AppState>,
    Json(update): Json<WebhookUpdate>,
) -> Json<Value> {
    info!(chat_id = update.chat_id, chars = update.text.len(), "webhook update received");
    tokio::spawn(process_update(state, update));
    Json(json!({ "ok": true }))
}

async fn process_update(state: AppState, update: WebhookUpdate) {
    let progress = ChatProgress::new(update.chat_id, state.reply.clone());

    let reply_text = match state
        .verifier
        .verify_with_progress(&update.text, &progress)
        .await
    {
        Ok(result) => format_result(&result),
        Err(pipeline_error) => {
            error!(chat_id = update.chat_id, %pipeline_error, "background verification failed");
            format_error(&pipeline_error)
        }
    };

    state.reply.deliver(update.chat_id, &reply_text).await;
}
