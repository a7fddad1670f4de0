//! AI-assisted semantic comparison of the input text against fetched
//! sources.
//!
//! One prompt per request carries the original text and every usable source;
//! the model is asked for a strict JSON verdict. Replies that cannot be
//! parsed degrade to a uniform result ([`Comparison::Degraded`]) rather than
//! failing — only a failed model call is an error, and even that is demoted
//! to "analysis skipped" by the orchestrator.

use async_trait::async_trait;
use llm_client::{ChatRequest, LlmClient, LlmCredentials, Message};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::CompareError;
use crate::json::{extract_json_object, truncate_chars};
use crate::types::{Comparison, ComparisonMatch, SourceContent};

const COMPARE_MODEL: &str = "gpt-4o-mini";
/// Chars of each source's content embedded in the prompt.
const SOURCE_EXCERPT_CHARS: usize = 1000;

const SYSTEM_PROMPT: &str = "You are a fact-checking expert. Compare texts for \
    agreement in meaning, not literal wording. Reply with valid JSON only.";

/// Semantic comparison backend.
#[async_trait]
pub trait SemanticComparator: Send + Sync {
    /// Rate each source's agreement with the original text.
    ///
    /// `sources` is the usable-text subset; match indices returned refer to
    /// positions in exactly this slice.
    async fn compare(
        &self,
        original_text: &str,
        sources: &[SourceContent],
    ) -> Result<Comparison, CompareError>;
}

#[async_trait]
impl<T: SemanticComparator + ?Sized> SemanticComparator for std::sync::Arc<T> {
    async fn compare(
        &self,
        original_text: &str,
        sources: &[SourceContent],
    ) -> Result<Comparison, CompareError> {
        (**self).compare(original_text, sources).await
    }
}

/// Comparator backed by an OpenAI-compatible chat model.
pub struct LlmComparator {
    client: LlmClient,
    model: String,
}

impl LlmComparator {
    pub fn new(credentials: LlmCredentials) -> Self {
        Self {
            client: LlmClient::from_credentials(credentials)
                .with_timeout(std::time::Duration::from_secs(30)),
            model: COMPARE_MODEL.to_string(),
        }
    }

    /// Override the comparison model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl SemanticComparator for LlmComparator {
    async fn compare(
        &self,
        original_text: &str,
        sources: &[SourceContent],
    ) -> Result<Comparison, CompareError> {
        let prompt = build_prompt(original_text, sources);

        let request = ChatRequest::new(
            self.client.qualified_model(&self.model),
            vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
        )
        .with_temperature(0.7)
        .with_max_tokens(2000);

        let reply = self.client.chat_completion(request).await?;
        debug!(chars = reply.content.len(), "comparison reply received");

        Ok(parse_reply(&reply.content, sources.len()))
    }
}

/// Build the single comparison prompt with explicit source delimiters.
fn build_prompt(original_text: &str, sources: &[SourceContent]) -> String {
    let sources_block = sources
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let excerpt = truncate_chars(source.content.rendered(), SOURCE_EXCERPT_CHARS);
            format!("Source {} ({}):\n{}", index + 1, source.url, excerpt)
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "You are a fact-checking expert. Compare the original text against the \
         found sources and determine which sources corroborate or refute it.\n\n\
         Original text:\n\"\"\"\n{original_text}\n\"\"\"\n\n\
         Found sources:\n\"\"\"\n{sources_block}\n\"\"\"\n\n\
         For each source determine:\n\
         1. The degree of semantic agreement with the original text (0-100%)\n\
         2. A short explanation of the agreement or differences\n\n\
         Reply as JSON:\n\
         {{\n  \"matches\": [\n    {{\n      \"sourceIndex\": 0,\n      \"confidence\": 85,\n      \"explanation\": \"The source corroborates the main claim...\"\n    }}\n  ],\n  \"summary\": \"Overall analysis summary...\"\n}}"
    )
}

#[derive(Deserialize)]
struct ReplyShape {
    #[serde(default)]
    matches: Vec<ReplyMatch>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Deserialize)]
struct ReplyMatch {
    #[serde(rename = "sourceIndex")]
    source_index: i64,
    confidence: f64,
    #[serde(default)]
    explanation: String,
}

/// Parse the model reply into a [`Comparison`].
///
/// Confidence is clamped to 0-100; matches pointing outside the compared
/// source list are dropped. No parseable JSON means `Degraded` with the raw
/// reply as summary.
pub(crate) fn parse_reply(reply: &str, source_count: usize) -> Comparison {
    let parsed = extract_json_object(reply)
        .and_then(|object| serde_json::from_str::<ReplyShape>(object).ok());

    match parsed {
        Some(shape) => {
            let matches: Vec<ComparisonMatch> = shape
                .matches
                .into_iter()
                .filter(|m| {
                    let in_bounds = m.source_index >= 0 && (m.source_index as usize) < source_count;
                    if !in_bounds {
                        warn!(source_index = m.source_index, "dropping out-of-bounds match");
                    }
                    in_bounds
                })
                .map(|m| ComparisonMatch {
                    source_index: m.source_index as usize,
                    confidence: m.confidence.clamp(0.0, 100.0).round() as u8,
                    explanation: m.explanation,
                })
                .collect();

            Comparison::Parsed {
                matches,
                summary: shape
                    .summary
                    .unwrap_or_else(|| "Analysis complete".to_string()),
            }
        }
        None => {
            warn!("model reply was not parseable JSON, degrading");
            Comparison::Degraded {
                summary: reply.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentStatus, SourceType};

    fn source(url: &str, text: &str) -> SourceContent {
        SourceContent {
            url: url.into(),
            title: "t".into(),
            content: ContentStatus::Loaded(text.into()),
            source_type: SourceType::News,
        }
    }

    #[test]
    fn test_prompt_embeds_urls_and_excerpts() {
        let sources = vec![
            source("https://a.example", &"x".repeat(1500)),
            source("https://b.example", "short body"),
        ];
        let prompt = build_prompt("original claim", &sources);

        assert!(prompt.contains("original claim"));
        assert!(prompt.contains("Source 1 (https://a.example)"));
        assert!(prompt.contains("Source 2 (https://b.example)"));
        // Excerpt capped at 1000 chars.
        assert!(!prompt.contains(&"x".repeat(1001)));
        assert!(prompt.contains(&"x".repeat(1000)));
    }

    #[test]
    fn test_parse_valid_reply() {
        let reply = r#"Here is my analysis:
            {"matches":[{"sourceIndex":0,"confidence":85,"explanation":"agrees"},
                        {"sourceIndex":1,"confidence":30,"explanation":"differs"}],
             "summary":"Mixed support"}"#;

        match parse_reply(reply, 2) {
            Comparison::Parsed { matches, summary } => {
                assert_eq!(matches.len(), 2);
                assert_eq!(matches[0].confidence, 85);
                assert_eq!(matches[1].source_index, 1);
                assert_eq!(summary, "Mixed support");
            }
            Comparison::Degraded { .. } => panic!("expected parsed"),
        }
    }

    #[test]
    fn test_parse_clamps_confidence() {
        let reply = r#"{"matches":[{"sourceIndex":0,"confidence":150,"explanation":""},
                                    {"sourceIndex":1,"confidence":-20,"explanation":""}],
                        "summary":"s"}"#;

        match parse_reply(reply, 2) {
            Comparison::Parsed { matches, .. } => {
                assert_eq!(matches[0].confidence, 100);
                assert_eq!(matches[1].confidence, 0);
            }
            Comparison::Degraded { .. } => panic!("expected parsed"),
        }
    }

    #[test]
    fn test_parse_drops_out_of_bounds_indices() {
        let reply = r#"{"matches":[{"sourceIndex":0,"confidence":80,"explanation":""},
                                    {"sourceIndex":5,"confidence":90,"explanation":""},
                                    {"sourceIndex":-1,"confidence":90,"explanation":""}],
                        "summary":"s"}"#;

        match parse_reply(reply, 1) {
            Comparison::Parsed { matches, .. } => {
                assert_eq!(matches.len(), 1);
                assert_eq!(matches[0].source_index, 0);
            }
            Comparison::Degraded { .. } => panic!("expected parsed"),
        }
    }

    #[test]
    fn test_unparseable_reply_degrades_with_raw_text() {
        let reply = "I could not produce JSON, sorry.";
        match parse_reply(reply, 3) {
            Comparison::Degraded { summary } => assert_eq!(summary, reply),
            Comparison::Parsed { .. } => panic!("expected degraded"),
        }
    }

    #[test]
    fn test_malformed_json_object_degrades() {
        // Balanced braces but not the expected shape and not valid JSON.
        let reply = "{not json at all}";
        assert!(matches!(
            parse_reply(reply, 1),
            Comparison::Degraded { .. }
        ));
    }
}
