//! LLM-backed "suggest sources" search.
//!
//! Last resort when no real search API is configured: ask the chat model to
//! propose relevant sources as JSON. The model may or may not comply with
//! the format, so a raw-URL scan of the reply is the fallback; low-quality
//! snippets from that path are acceptable as long as at least one URL comes
//! back.

use llm_client::{ChatRequest, LlmClient, LlmCredentials, LlmError, Message};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::json::{context_window, extract_json_object, truncate_chars};
use crate::locator::classify::classify_source_type;
use crate::types::SearchResult;

const SUGGEST_MODEL: &str = "gpt-4o-mini";
/// Cap on URL-scan fallback results.
const MAX_FALLBACK_RESULTS: usize = 5;
/// Chars of context taken on each side of a URL when synthesizing snippets.
const CONTEXT_CHARS: usize = 150;

pub struct LlmSuggestSearch {
    client: LlmClient,
}

#[derive(Deserialize)]
struct SuggestedSources {
    #[serde(default)]
    sources: Vec<SuggestedSource>,
}

#[derive(Deserialize)]
struct SuggestedSource {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

impl LlmSuggestSearch {
    pub fn new(credentials: LlmCredentials) -> Self {
        Self {
            client: LlmClient::from_credentials(credentials)
                .with_timeout(std::time::Duration::from_secs(30)),
        }
    }

    /// Errors stay as [`LlmError`] so the provider chain can inspect the HTTP
    /// status before mapping them.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, LlmError> {
        let prompt = format!(
            "Find relevant web sources for this query: \"{query}\".\n\n\
             Requirements:\n\
             1. Suggest the 3-5 most relevant sources\n\
             2. For each source give:\n\
                - the source title\n\
                - the full URL (https://...)\n\
                - a short description of its content\n\
             3. Prefer official sites, news outlets, and research publications\n\n\
             Reply as JSON:\n\
             {{\n  \"sources\": [\n    {{\"title\": \"...\", \"url\": \"https://example.com/page\", \"description\": \"...\"}}\n  ]\n}}"
        );

        let request = ChatRequest::new(
            self.client.qualified_model(SUGGEST_MODEL),
            vec![Message::user(prompt)],
        )
        .with_temperature(0.7)
        .with_max_tokens(3000);

        let reply = self.client.chat_completion(request).await?;

        // Preferred path: a parseable {sources: [...]} object.
        if let Some(object) = extract_json_object(&reply.content) {
            if let Ok(parsed) = serde_json::from_str::<SuggestedSources>(object) {
                let results: Vec<SearchResult> = parsed
                    .sources
                    .into_iter()
                    .filter(|s| s.url.starts_with("http"))
                    .map(|s| SearchResult {
                        source_type: classify_source_type(&s.url),
                        title: if s.title.is_empty() {
                            crate::types::UNTITLED.to_string()
                        } else {
                            s.title
                        },
                        url: s.url,
                        snippet: s.description,
                    })
                    .collect();
                if !results.is_empty() {
                    return Ok(results);
                }
            }
        }

        debug!("no structured sources in model reply, scanning for raw URLs");
        let results = scan_urls(&reply.content);
        if results.is_empty() {
            return Err(LlmError::Parse(
                "model reply contained no source URLs".to_string(),
            ));
        }
        Ok(results)
    }
}

/// Best-effort fallback: pull raw URLs out of the reply and synthesize
/// titles/snippets from the surrounding text.
fn scan_urls(reply: &str) -> Vec<SearchResult> {
    let url_re = Regex::new(r#"(?i)https?://[^\s<>"{}|\\^`\[\]]+"#).unwrap();
    let title_re = Regex::new(r"(?i)(?:title|source|site|resource)\s*:\s*([^\n.]+)").unwrap();

    url_re
        .find_iter(reply)
        .take(MAX_FALLBACK_RESULTS)
        .enumerate()
        .map(|(index, m)| {
            let context = context_window(reply, m.range(), CONTEXT_CHARS);
            let title = title_re
                .captures(context)
                .and_then(|cap| cap.get(1))
                .map(|t| truncate_chars(t.as_str().trim(), 100).to_string())
                .unwrap_or_else(|| format!("Source {}", index + 1));

            SearchResult {
                source_type: classify_source_type(m.as_str()),
                title,
                url: m.as_str().to_string(),
                snippet: truncate_chars(context, 300).to_string(),
            }
        })
        .collect()
}
