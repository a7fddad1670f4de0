//! Google Custom Search adapter.

use serde::Deserialize;

use crate::error::LocatorError;
use crate::locator::{classify::classify_source_type, provider_error, SEARCH_RESULT_COUNT};
use crate::types::SearchResult;

const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

pub struct GoogleSearch {
    client: reqwest::Client,
    api_key: String,
    engine_id: String,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleSearch {
    pub fn new(client: reqwest::Client, api_key: String, engine_id: String) -> Self {
        Self {
            client,
            api_key,
            engine_id,
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, LocatorError> {
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", &SEARCH_RESULT_COUNT.to_string()),
            ])
            .send()
            .await
            .map_err(|e| provider_error("google", None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(
                "google",
                Some(status.as_u16()),
                api_error_message(&body),
            ));
        }

        let parsed: Response = response
            .json()
            .await
            .map_err(|e| provider_error("google", None, e.to_string()))?;

        Ok(parsed
            .items
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

/// Pull `error.message` out of a Google error body, else return it verbatim.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
