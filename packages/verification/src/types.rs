//! Data types flowing through the verification pipeline.
//!
//! All of these are request-scoped: derived once, immutable afterwards, and
//! discarded when the request completes.

use serde::{Deserialize, Serialize};

/// Rendered in place of text when a source could not be retrieved.
pub const UNAVAILABLE_TEXT: &str = "Content could not be retrieved";

/// Title placeholder when a page has no usable title.
pub const UNTITLED: &str = "Untitled";

/// Structured signal extracted from the input text.
///
/// Produced by [`crate::extractor::extract`]; empty input yields empty
/// containers, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedElements {
    /// Up to 5 salient sentences, in original order.
    pub key_statements: Vec<String>,
    /// Date mentions, deduplicated.
    pub dates: Vec<String>,
    /// Numeric mentions (percentages, amounts, bare numbers), deduplicated.
    pub numbers: Vec<String>,
    /// Proper names and acronyms, at most 10.
    pub names: Vec<String>,
    /// http(s) URLs found in the text.
    pub links: Vec<String>,
}

/// Closed classification of a source by its hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Official,
    News,
    Blog,
    Research,
    Unknown,
}

impl SourceType {
    /// Ranking weight used when ordering search results.
    pub fn priority(self) -> u8 {
        match self {
            SourceType::Official => 4,
            SourceType::Research => 3,
            SourceType::News => 2,
            SourceType::Blog => 1,
            SourceType::Unknown => 0,
        }
    }

    /// Human-readable label for formatted output.
    pub fn label(self) -> &'static str {
        match self {
            SourceType::Official => "Official source",
            SourceType::News => "News outlet",
            SourceType::Blog => "Blog",
            SourceType::Research => "Research",
            SourceType::Unknown => "Other source",
        }
    }
}

/// A candidate source returned by the locator, not yet fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(rename = "sourceType")]
    pub source_type: SourceType,
}

/// Outcome of retrieving a source's body text.
///
/// An enumerated status instead of a sentinel string, so downstream checks
/// cannot collide with page text that happens to equal the fallback message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentStatus {
    /// Cleaned page text, at most 5000 chars (ellipsis-truncated).
    Loaded(String),
    /// Retrieval failed and no snippet was available to substitute.
    Unavailable,
}

impl ContentStatus {
    /// The loaded text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentStatus::Loaded(text) => Some(text),
            ContentStatus::Unavailable => None,
        }
    }

    /// True when this source carries text worth sending to the comparator.
    pub fn is_usable(&self) -> bool {
        matches!(self, ContentStatus::Loaded(text) if !text.trim().is_empty())
    }

    /// Text as rendered to callers, with the fixed fallback for unavailable
    /// content.
    pub fn rendered(&self) -> &str {
        match self {
            ContentStatus::Loaded(text) => text,
            ContentStatus::Unavailable => UNAVAILABLE_TEXT,
        }
    }
}

/// A fetched (or fetch-attempted) source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContent {
    pub url: String,
    pub title: String,
    pub content: ContentStatus,
    pub source_type: SourceType,
}

/// Per-source verdict from the semantic comparator.
///
/// `source_index` is a 0-based position in the exact source list passed to
/// the comparator (the usable-text subset), not the full fetched list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonMatch {
    #[serde(rename = "sourceIndex")]
    pub source_index: usize,
    pub confidence: u8,
    pub explanation: String,
}

/// Comparator outcome.
///
/// `Degraded` means the model replied but no JSON could be parsed out of the
/// reply; callers must treat it as a valid (uniform-confidence) result, not
/// an error.
#[derive(Debug, Clone)]
pub enum Comparison {
    Parsed {
        matches: Vec<ComparisonMatch>,
        summary: String,
    },
    Degraded {
        /// The raw model reply, surfaced as the analysis summary.
        summary: String,
    },
}

impl Comparison {
    /// Matches for a comparison over `source_count` sources.
    ///
    /// The degraded variant expands to a uniform 50% match per source with a
    /// generic explanation.
    pub fn matches(&self, source_count: usize) -> Vec<ComparisonMatch> {
        match self {
            Comparison::Parsed { matches, .. } => matches.clone(),
            Comparison::Degraded { .. } => (0..source_count)
                .map(|source_index| ComparisonMatch {
                    source_index,
                    confidence: 50,
                    explanation:
                        "Analysis completed, but no detailed breakdown could be extracted"
                            .to_string(),
                })
                .collect(),
        }
    }

    /// The analysis summary text.
    pub fn summary(&self) -> &str {
        match self {
            Comparison::Parsed { summary, .. } => summary,
            Comparison::Degraded { summary } => summary,
        }
    }
}

/// Three-tier rendering of a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Classify a 0-100 confidence score.
    pub fn from_confidence(confidence: u8) -> Self {
        if confidence >= 70 {
            ConfidenceTier::High
        } else if confidence >= 40 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    /// Marker used by the chat-formatted output.
    pub fn marker(self) -> &'static str {
        match self {
            ConfidenceTier::High => "✅",
            ConfidenceTier::Medium => "⚠️",
            ConfidenceTier::Low => "❌",
        }
    }
}

/// A source as presented in the final result, with any AI verdict joined on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedSource {
    pub title: String,
    pub url: String,
    pub text: String,
    #[serde(rename = "sourceType")]
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Final pipeline output, consumed by both the JSON API and the chat
/// formatter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// The extracted text the search was run for.
    pub query: String,
    pub sources: Vec<VerifiedSource>,
    #[serde(rename = "aiSummary", skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}
