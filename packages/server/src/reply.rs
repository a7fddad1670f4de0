//! Outbound reply port for the chat transport.
//!
//! The pipeline never talks to a chat service directly; it hands text to a
//! [`ReplySink`] and moves on. Delivery failures are the sink's problem and
//! must never propagate back into the pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use verification::orchestrator::{ProgressSink, ProgressStage};

/// Delivers a text message to a chat conversation.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, chat_id: i64, text: &str);
}

/// Default sink: logs deliveries instead of sending them anywhere. A real
/// chat transport implements [`ReplySink`] over its bot API.
pub struct LoggingSink;

#[async_trait]
impl ReplySink for LoggingSink {
    async fn deliver(&self, chat_id: i64, text: &str) {
        info!(chat_id, chars = text.len(), "reply delivered");
    }
}

/// Forwards pipeline progress checkpoints to a conversation as messages.
pub struct ChatProgress {
    chat_id: i64,
    sink: Arc<dyn ReplySink>,
}

impl ChatProgress {
    pub fn new(chat_id: i64, sink: Arc<dyn ReplySink>) -> Self {
        Self { chat_id, sink }
    }
}

#[async_trait]
impl ProgressSink for ChatProgress {
    async fn notify(&self, stage: ProgressStage) {
        self.sink.deliver(self.chat_id, stage.message()).await;
    }
}
