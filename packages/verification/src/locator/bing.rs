//! Bing Web Search adapter.

use serde::Deserialize;

use crate::error::LocatorError;
use crate::locator::{classify::classify_source_type, provider_error, SEARCH_RESULT_COUNT};
use crate::types::SearchResult;

const ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";

pub struct BingSearch {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct Response {
    #[serde(rename = "webPages")]
    web_pages: Option<WebPages>,
}

#[derive(Deserialize)]
struct WebPages {
    #[serde(default)]
    value: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    name: String,
    url: String,
    #[serde(default)]
    snippet: String,
}

impl BingSearch {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, LocatorError> {
        let count = SEARCH_RESULT_COUNT.to_string();
        let response = self
            .client
            .get(ENDPOINT)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| provider_error("bing", None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error("bing", Some(status.as_u16()), body));
        }

        let parsed: Response = response
            .json()
            .await
            .map_err(|e| provider_error("bing", None, e.to_string()))?;

        Ok(parsed
            .web_pages
            .map(|pages| pages.value)
            .unwrap_or_default()
            .into_iter()
            .map(|page| SearchResult {
                source_type: classify_source_type(&page.url),
                title: page.name,
                url: page.url,
                snippet: page.snippet,
            })
            .collect())
    }
}
