//! In-memory test doubles for the pipeline seams.
//!
//! These run the full orchestrator without touching the network and are used
//! by the integration tests; they are exported so a transport crate can reuse
//! them in its own tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::comparator::SemanticComparator;
use crate::error::{CompareError, LocatorError};
use crate::locator::SourceSearch;
use crate::orchestrator::{ProgressSink, ProgressStage};
use crate::types::{Comparison, SearchResult, SourceContent};

/// Searcher returning a canned outcome for every query.
pub struct MockSearcher {
    outcome: Result<Vec<SearchResult>, LocatorError>,
}

impl MockSearcher {
    pub fn returning(results: Vec<SearchResult>) -> Self {
        Self {
            outcome: Ok(results),
        }
    }

    pub fn failing(error: LocatorError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

#[async_trait]
impl SourceSearch for MockSearcher {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, LocatorError> {
        match &self.outcome {
            Ok(results) => Ok(results.clone()),
            // LocatorError is not Clone; rebuild the variant.
            Err(LocatorError::NoProviderConfigured) => Err(LocatorError::NoProviderConfigured),
            Err(LocatorError::Provider {
                provider,
                status,
                message,
            }) => Err(LocatorError::Provider {
                provider,
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

/// Comparator that counts calls and replies with a fixed model reply string,
/// parsed exactly like a live reply would be.
pub struct CountingComparator {
    reply: String,
    calls: AtomicUsize,
}

impl CountingComparator {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SemanticComparator for CountingComparator {
    async fn compare(
        &self,
        _original_text: &str,
        sources: &[SourceContent],
    ) -> Result<Comparison, CompareError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(crate::comparator::parse_reply(&self.reply, sources.len()))
    }
}

/// Progress sink that records the stages it was notified of, in order.
#[derive(Default)]
pub struct RecordingSink {
    stages: Mutex<Vec<ProgressStage>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> Vec<ProgressStage> {
        self.stages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn notify(&self, stage: ProgressStage) {
        self.stages.lock().unwrap().push(stage);
    }
}
