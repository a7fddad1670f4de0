//! Source location: multi-provider web search with fallback ordering.
//!
//! Backends are tried in a strict order — Google Custom Search, Bing,
//! SerpAPI, then the LLM suggester — picking the first one whose credentials
//! are present. Selection happens per call so credential changes take effect
//! immediately. The one documented exception to "first match wins": an
//! auth/permission failure (401/403) from the LLM suggester retries once
//! against SerpAPI when that key exists, because suggester access problems
//! are usually billing-side and a real search API is the better answer.

pub mod bing;
pub mod classify;
pub mod google;
pub mod llm;
pub mod serpapi;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::error::LocatorError;
use crate::types::{SearchResult, SourceType};

pub use classify::classify_source_type;

/// Results requested from each search backend.
pub(crate) const SEARCH_RESULT_COUNT: usize = 10;

/// Timeout for the plain search APIs (the LLM suggester gets 30s).
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn provider_error(
    provider: &'static str,
    status: Option<u16>,
    message: String,
) -> LocatorError {
    LocatorError::Provider {
        provider,
        status,
        message,
    }
}

/// Web search abstraction over the provider chain.
#[async_trait]
pub trait SourceSearch: Send + Sync {
    /// Search the web for candidate sources matching the query.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, LocatorError>;
}

/// Credential-ordered chain of search backends.
pub struct ProviderChain {
    client: reqwest::Client,
    config_source: Arc<dyn Fn() -> SearchConfig + Send + Sync>,
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderChain {
    /// Chain reading credentials from the environment on every call.
    pub fn new() -> Self {
        Self::with_config_source(SearchConfig::from_env)
    }

    /// Chain with a fixed credential set (used by tests).
    pub fn with_config(config: SearchConfig) -> Self {
        Self::with_config_source(move || config.clone())
    }

    fn with_config_source(source: impl Fn() -> SearchConfig + Send + Sync + 'static) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(SEARCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            config_source: Arc::new(source),
        }
    }

    async fn dispatch(&self, config: &SearchConfig, query: &str) -> Result<Vec<SearchResult>, LocatorError> {
        if let Some(google) = &config.google {
            debug!(provider = "google", "searching");
            return google::GoogleSearch::new(
                self.client.clone(),
                google.api_key.clone(),
                google.engine_id.clone(),
            )
            .search(query)
            .await;
        }

        if let Some(key) = &config.bing_api_key {
            debug!(provider = "bing", "searching");
            return bing::BingSearch::new(self.client.clone(), key.clone())
                .search(query)
                .await;
        }

        if let Some(key) = &config.serpapi_key {
            debug!(provider = "serpapi", "searching");
            return serpapi::SerpApiSearch::new(self.client.clone(), key.clone())
                .search(query)
                .await;
        }

        if let Some(credentials) = &config.llm {
            debug!(provider = "llm-suggest", "searching");
            return match llm::LlmSuggestSearch::new(credentials.clone())
                .search(query)
                .await
            {
                Ok(results) => Ok(results),
                Err(model_error) => {
                    // Auth failures from the suggester get one retry against
                    // SerpAPI if configured. Note: unreachable while
                    // serpapi_key shadows the suggester above; the fallback
                    // matters when the key appears between calls or the chain
                    // is reordered by config.
                    if let Some(key) = suggester_retry_key(&model_error, config) {
                        warn!(
                            status = model_error.status(),
                            "LLM suggester auth failure, retrying via serpapi"
                        );
                        return serpapi::SerpApiSearch::new(self.client.clone(), key.to_string())
                            .search(query)
                            .await;
                    }
                    Err(provider_error(
                        "llm-suggest",
                        model_error.status(),
                        model_error.to_string(),
                    ))
                }
            };
        }

        Err(LocatorError::NoProviderConfigured)
    }
}

/// SerpAPI key to retry with after a suggester failure, if the failure was an
/// auth/permission rejection and the key is present.
fn suggester_retry_key<'a>(
    error: &llm_client::LlmError,
    config: &'a SearchConfig,
) -> Option<&'a str> {
    if error.is_auth_failure() {
        config.serpapi_key.as_deref()
    } else {
        None
    }
}

#[async_trait]
impl SourceSearch for ProviderChain {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, LocatorError> {
        let config = (self.config_source)();
        self.dispatch(&config, query).await
    }
}

/// Default preferred types: official, news, research (blogs drop out).
pub const DEFAULT_PREFERRED_TYPES: &[SourceType] =
    &[SourceType::Official, SourceType::News, SourceType::Research];

/// Keep `unknown` results plus any preferred type, ordered by type priority
/// descending; ties broken by longer snippet (a proxy for informativeness).
pub fn filter_results_by_source_type(
    results: Vec<SearchResult>,
    preferred_types: &[SourceType],
) -> Vec<SearchResult> {
    let mut filtered: Vec<SearchResult> = results
        .into_iter()
        .filter(|result| {
            result.source_type == SourceType::Unknown
                || preferred_types.contains(&result.source_type)
        })
        .collect();

    filtered.sort_by(|a, b| {
        b.source_type
            .priority()
            .cmp(&a.source_type.priority())
            .then_with(|| b.snippet.len().cmp(&a.snippet.len()))
    });

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str, source_type: SourceType, snippet: &str) -> SearchResult {
        SearchResult {
            title: "t".into(),
            url: url.into(),
            snippet: snippet.into(),
            source_type,
        }
    }

    #[test]
    fn test_filter_orders_by_priority() {
        let results = vec![
            result("https://a", SourceType::Blog, "blog snippet"),
            result("https://b", SourceType::Official, "official"),
            result("https://c", SourceType::News, "news"),
            result("https://d", SourceType::Research, "research"),
        ];

        let filtered = filter_results_by_source_type(results, DEFAULT_PREFERRED_TYPES);

        let order: Vec<SourceType> = filtered.iter().map(|r| r.source_type).collect();
        assert_eq!(
            order,
            vec![SourceType::Official, SourceType::Research, SourceType::News]
        );
    }

    #[test]
    fn test_filter_always_keeps_unknown() {
        let results = vec![
            result("https://a", SourceType::Unknown, "x"),
            result("https://b", SourceType::Blog, "y"),
        ];

        let filtered = filter_results_by_source_type(results, DEFAULT_PREFERRED_TYPES);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].source_type, SourceType::Unknown);
    }

    #[test]
    fn test_filter_tie_broken_by_snippet_length() {
        let results = vec![
            result("https://short", SourceType::News, "short"),
            result("https://long", SourceType::News, "a much longer snippet here"),
        ];

        let filtered = filter_results_by_source_type(results, DEFAULT_PREFERRED_TYPES);
        assert_eq!(filtered[0].url, "https://long");
    }

    #[test]
    fn test_filter_output_is_subset_of_input() {
        let results = vec![
            result("https://a", SourceType::Official, "1"),
            result("https://b", SourceType::Blog, "2"),
            result("https://c", SourceType::Unknown, "3"),
        ];
        let input_urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();

        let filtered = filter_results_by_source_type(results, DEFAULT_PREFERRED_TYPES);
        assert!(filtered.iter().all(|r| input_urls.contains(&r.url)));
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_suggester_auth_failure_retries_only_with_serpapi_key() {
        let config = SearchConfig {
            serpapi_key: Some("serp-key".into()),
            ..SearchConfig::default()
        };
        let auth = llm_client::LlmError::Api {
            status: 403,
            message: "forbidden".into(),
        };
        let quota = llm_client::LlmError::Api {
            status: 429,
            message: "quota exhausted".into(),
        };

        assert_eq!(suggester_retry_key(&auth, &config), Some("serp-key"));
        assert_eq!(suggester_retry_key(&quota, &config), None);
        assert_eq!(suggester_retry_key(&auth, &SearchConfig::default()), None);
    }

    #[tokio::test]
    async fn test_empty_config_is_no_provider() {
        let chain = ProviderChain::with_config(SearchConfig::default());
        let err = chain.search("anything").await.unwrap_err();
        assert!(matches!(err, LocatorError::NoProviderConfigured));
    }
}
