//! Credential discovery for search and model backends.
//!
//! Presence or absence of credentials is the only control surface the
//! pipeline has: which search backend runs, and whether AI comparison is
//! attempted at all, both follow from what is set in the environment.

use llm_client::LlmCredentials;

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Google Custom Search needs a key and an engine id, as a pair.
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub api_key: String,
    pub engine_id: String,
}

/// Which search backends are configured right now.
///
/// Built fresh per search call rather than cached, so that credential
/// changes take effect without a restart.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    pub google: Option<GoogleCredentials>,
    pub bing_api_key: Option<String>,
    pub serpapi_key: Option<String>,
    /// Model credentials double as the suggest-sources search backend.
    pub llm: Option<LlmCredentials>,
}

impl SearchConfig {
    /// Read the current environment.
    pub fn from_env() -> Self {
        let google = match (
            env_non_empty("GOOGLE_SEARCH_API_KEY"),
            env_non_empty("GOOGLE_SEARCH_ENGINE_ID"),
        ) {
            (Some(api_key), Some(engine_id)) => Some(GoogleCredentials { api_key, engine_id }),
            _ => None,
        };

        Self {
            google,
            bing_api_key: env_non_empty("BING_SEARCH_API_KEY"),
            serpapi_key: env_non_empty("SERPAPI_KEY"),
            llm: LlmCredentials::from_env(),
        }
    }

    /// True when at least one backend can be called.
    pub fn any_configured(&self) -> bool {
        self.google.is_some()
            || self.bing_api_key.is_some()
            || self.serpapi_key.is_some()
            || self.llm.is_some()
    }
}
