//! End-to-end pipeline sequencing: extract, search, fetch, compare, join.
//!
//! Partial-failure policy: empty input and zero located sources abort the
//! request; everything downstream degrades instead. Unreachable pages become
//! unavailable sources, a missing model key or a failed model call skips the
//! analysis, and an unparseable model reply becomes a uniform-confidence
//! verdict. A caller therefore always gets either a typed error from the
//! first two stages or a complete [`PipelineResult`].

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::comparator::{LlmComparator, SemanticComparator};
use crate::error::{PipelineError, Result};
use crate::extractor;
use crate::fetcher::{ContentFetcher, DEFAULT_FETCH_LIMIT};
use crate::input::resolve_input;
use crate::locator::{
    filter_results_by_source_type, ProviderChain, SourceSearch, DEFAULT_PREFERRED_TYPES,
};
use crate::types::{Comparison, PipelineResult, SourceContent, VerifiedSource};
use llm_client::LlmCredentials;

/// Checkpoints at which advisory progress is emitted, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    Extracting,
    Searching,
    Fetching,
    Analyzing,
}

impl ProgressStage {
    /// User-facing text for the chat transport.
    pub fn message(self) -> &'static str {
        match self {
            ProgressStage::Extracting => "🔍 Analyzing your request...",
            ProgressStage::Searching => "🌐 Looking for possible sources...",
            ProgressStage::Fetching => "📄 Retrieving source content...",
            ProgressStage::Analyzing => "🤖 Comparing sources with AI...",
        }
    }
}

/// Receiver of advisory progress notifications.
///
/// Notifications are fire-and-forget; failures must be swallowed by the
/// implementation, never surfaced to the pipeline.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn notify(&self, stage: ProgressStage);
}

/// Sink that drops every notification (the default for the JSON API).
pub struct NullSink;

#[async_trait]
impl ProgressSink for NullSink {
    async fn notify(&self, _stage: ProgressStage) {}
}

/// Sequences the full verification pipeline for one request.
///
/// Generic over the search and comparison backends so tests can run the whole
/// pipeline without network access. All state is per-request; one
/// orchestrator serves any number of concurrent requests.
pub struct Orchestrator<S, C> {
    searcher: S,
    comparator: Option<C>,
    fetcher: ContentFetcher,
    progress: Arc<dyn ProgressSink>,
    fetch_limit: usize,
}

impl Orchestrator<ProviderChain, LlmComparator> {
    /// Production wiring: provider chain and comparator credentials read from
    /// the environment. The comparator is absent when no model key is set, in
    /// which case analysis is skipped rather than failed.
    pub fn from_env() -> Self {
        let comparator = LlmCredentials::from_env().map(LlmComparator::new);
        if comparator.is_none() {
            warn!("no model credentials found, AI analysis will be skipped");
        }
        Self::new(ProviderChain::new(), comparator)
    }
}

impl<S, C> Orchestrator<S, C>
where
    S: SourceSearch,
    C: SemanticComparator,
{
    pub fn new(searcher: S, comparator: Option<C>) -> Self {
        Self {
            searcher,
            comparator,
            fetcher: ContentFetcher::new(),
            progress: Arc::new(NullSink),
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }

    /// Attach a progress sink (the chat transport passes its reply channel).
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Override how many filtered results get fetched.
    pub fn with_fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = limit;
        self
    }

    /// Run the pipeline for one raw input (a text passage or a post link).
    pub async fn run(&self, raw_input: &str) -> Result<PipelineResult> {
        let progress = self.progress.clone();
        self.run_with_progress(raw_input, progress.as_ref()).await
    }

    /// Like [`run`](Self::run), with a caller-supplied progress sink for this
    /// request only (the chat transport binds one per conversation).
    pub async fn run_with_progress(
        &self,
        raw_input: &str,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineResult> {
        if raw_input.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        progress.notify(ProgressStage::Extracting).await;
        let text = resolve_input(raw_input).await;
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let elements = extractor::extract(&text);
        debug!(
            statements = elements.key_statements.len(),
            dates = elements.dates.len(),
            numbers = elements.numbers.len(),
            names = elements.names.len(),
            "signal extracted"
        );

        progress.notify(ProgressStage::Searching).await;
        let results = self.searcher.search(&text).await?;
        if results.is_empty() {
            return Err(PipelineError::NoSourcesFound);
        }
        info!(count = results.len(), "sources located");

        let filtered = filter_results_by_source_type(results, DEFAULT_PREFERRED_TYPES);

        progress.notify(ProgressStage::Fetching).await;
        let sources = self.fetcher.fetch_content(&filtered, self.fetch_limit).await;

        progress.notify(ProgressStage::Analyzing).await;
        let comparison = self.analyze(&text, &sources).await;

        Ok(assemble(text, sources, comparison))
    }

    /// Run the comparator over the usable-text subset of `sources`.
    ///
    /// Returns `None` (analysis skipped) when no comparator is configured, no
    /// source carries usable text, or the model call fails. The returned
    /// indices map usable-subset positions back to `sources` positions.
    async fn analyze(
        &self,
        text: &str,
        sources: &[SourceContent],
    ) -> Option<(Comparison, Vec<usize>)> {
        let comparator = self.comparator.as_ref()?;

        let usable_indices: Vec<usize> = sources
            .iter()
            .enumerate()
            .filter(|(_, source)| source.content.is_usable())
            .map(|(index, _)| index)
            .collect();

        if usable_indices.is_empty() {
            warn!(total = sources.len(), "no usable source text, skipping AI analysis");
            return None;
        }

        let usable: Vec<SourceContent> = usable_indices
            .iter()
            .map(|&index| sources[index].clone())
            .collect();

        match comparator.compare(text, &usable).await {
            Ok(comparison) => Some((comparison, usable_indices)),
            Err(error) => {
                warn!(%error, "AI analysis failed, continuing without it");
                None
            }
        }
    }
}

/// Join comparator verdicts back onto the fetched source list and build the
/// final result. `usable_indices[i]` is the full-list position of the i-th
/// compared source.
fn assemble(
    query: String,
    sources: Vec<SourceContent>,
    comparison: Option<(Comparison, Vec<usize>)>,
) -> PipelineResult {
    let mut confidence: Vec<Option<u8>> = vec![None; sources.len()];
    let mut explanation: Vec<Option<String>> = vec![None; sources.len()];

    let ai_summary = comparison.map(|(comparison, usable_indices)| {
        for m in comparison.matches(usable_indices.len()) {
            if let Some(&position) = usable_indices.get(m.source_index) {
                confidence[position] = Some(m.confidence);
                explanation[position] = Some(m.explanation);
            }
        }
        comparison.summary().to_string()
    });

    let sources = sources
        .into_iter()
        .zip(confidence.into_iter().zip(explanation))
        .map(|(source, (confidence, explanation))| VerifiedSource {
            title: source.title,
            url: source.url,
            text: source.content.rendered().to_string(),
            source_type: source.source_type,
            confidence,
            explanation,
        })
        .collect();

    PipelineResult {
        query,
        sources,
        ai_summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComparisonMatch, ContentStatus, SourceType};

    fn source(url: &str, content: ContentStatus) -> SourceContent {
        SourceContent {
            url: url.into(),
            title: "t".into(),
            content,
            source_type: SourceType::News,
        }
    }

    #[test]
    fn test_assemble_joins_through_usable_positions() {
        // Source 0 unavailable, sources 1 and 2 usable: compared subset is
        // [1, 2], so subset index 1 must land on full-list position 2.
        let sources = vec![
            source("https://a", ContentStatus::Unavailable),
            source("https://b", ContentStatus::Loaded("b text".into())),
            source("https://c", ContentStatus::Loaded("c text".into())),
        ];
        let comparison = Comparison::Parsed {
            matches: vec![
                ComparisonMatch {
                    source_index: 0,
                    confidence: 90,
                    explanation: "first".into(),
                },
                ComparisonMatch {
                    source_index: 1,
                    confidence: 20,
                    explanation: "second".into(),
                },
            ],
            summary: "done".into(),
        };

        let result = assemble("q".into(), sources, Some((comparison, vec![1, 2])));

        assert_eq!(result.sources[0].confidence, None);
        assert_eq!(result.sources[1].confidence, Some(90));
        assert_eq!(result.sources[2].confidence, Some(20));
        assert_eq!(result.sources[2].explanation.as_deref(), Some("second"));
        assert_eq!(result.ai_summary.as_deref(), Some("done"));
    }

    #[test]
    fn test_assemble_degraded_is_uniform_over_usable() {
        let sources = vec![
            source("https://a", ContentStatus::Loaded("a text".into())),
            source("https://b", ContentStatus::Unavailable),
        ];
        let comparison = Comparison::Degraded {
            summary: "raw reply".into(),
        };

        let result = assemble("q".into(), sources, Some((comparison, vec![0])));

        assert_eq!(result.sources[0].confidence, Some(50));
        assert_eq!(result.sources[1].confidence, None);
        assert_eq!(result.ai_summary.as_deref(), Some("raw reply"));
        assert_eq!(result.sources[1].text, crate::types::UNAVAILABLE_TEXT);
    }

    #[test]
    fn test_assemble_without_analysis() {
        let sources = vec![source("https://a", ContentStatus::Loaded("text".into()))];
        let result = assemble("q".into(), sources, None);

        assert!(result.ai_summary.is_none());
        assert_eq!(result.sources[0].confidence, None);
        assert_eq!(result.sources[0].text, "text");
    }
}
