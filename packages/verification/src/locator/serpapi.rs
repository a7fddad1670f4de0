//! SerpAPI adapter (Google engine, organic results only).

use serde::Deserialize;

use crate::error::LocatorError;
use crate::locator::{classify::classify_source_type, provider_error, SEARCH_RESULT_COUNT};
use crate::types::SearchResult;

const ENDPOINT: &str = "https://serpapi.com/search";

pub struct SerpApiSearch {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct OrganicResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerpApiSearch {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, LocatorError> {
        let num = SEARCH_RESULT_COUNT.to_string();
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| provider_error("serpapi", None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(
                "serpapi",
                Some(status.as_u16()),
                api_error_message(&body),
            ));
        }

        let parsed: Response = response
            .json()
            .await
            .map_err(|e| provider_error("serpapi", None, e.to_string()))?;

        Ok(parsed
            .organic_results
            .into_iter()
            .map(|item| SearchResult {
                source_type: classify_source_type(&item.link),
                title: item.title,
                url: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}

/// SerpAPI errors arrive as `{"error": "..."}`.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
