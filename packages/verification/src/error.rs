//! Typed errors for the verification pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Only two conditions
//! abort a request outright: empty input and zero located sources. Search
//! backend failures propagate with enough detail for the caller to surface a
//! remediation hint; everything else in the pipeline degrades to a partial
//! result instead of erroring.

use thiserror::Error;

/// Errors surfaced by the source locator.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// No search backend credential is present.
    #[error(
        "no search backend configured; set GOOGLE_SEARCH_API_KEY (with \
         GOOGLE_SEARCH_ENGINE_ID), BING_SEARCH_API_KEY, SERPAPI_KEY, or an \
         LLM key (OPENAI_API_KEY / OPENROUTER_API_KEY)"
    )]
    NoProviderConfigured,

    /// The selected backend's call failed.
    #[error("{provider} search failed{}: {message}", status_suffix(.status))]
    Provider {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl LocatorError {
    /// Actionable advice for auth/permission/quota failures, if applicable.
    pub fn remediation(&self) -> Option<String> {
        match self {
            LocatorError::NoProviderConfigured => Some(self.to_string()),
            LocatorError::Provider {
                provider, status, ..
            } => match status {
                Some(401) => Some(format!(
                    "{provider} rejected the API key (401); check the configured credential"
                )),
                Some(403) => Some(format!(
                    "{provider} denied access (403); check billing and key permissions"
                )),
                Some(429) => Some(format!(
                    "{provider} quota exhausted (429); wait or switch to another search backend"
                )),
                _ => None,
            },
        }
    }
}

/// Errors surfaced by the semantic comparator.
///
/// Only a failed model call lands here; an unparseable reply is a
/// [`crate::types::Comparison::Degraded`] result, not an error.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The underlying model call failed (network, auth, quota).
    #[error("model backend error: {0}")]
    Model(#[from] llm_client::LlmError),
}

/// Request-level pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input text extraction produced nothing.
    #[error("no text could be extracted from the input; send a text passage or a post link")]
    EmptyInput,

    /// The locator returned zero candidates.
    #[error("no sources found for this text; try rephrasing")]
    NoSourcesFound,

    /// Search backend missing or failing.
    #[error(transparent)]
    Search(#[from] LocatorError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_provider_message_names_credentials() {
        let message = LocatorError::NoProviderConfigured.to_string();
        assert!(message.contains("GOOGLE_SEARCH_API_KEY"));
        assert!(message.contains("GOOGLE_SEARCH_ENGINE_ID"));
        assert!(message.contains("BING_SEARCH_API_KEY"));
        assert!(message.contains("SERPAPI_KEY"));
    }

    #[test]
    fn test_remediation_for_auth_statuses() {
        for (status, needle) in [(401, "401"), (403, "billing"), (429, "quota")] {
            let err = LocatorError::Provider {
                provider: "google",
                status: Some(status),
                message: "denied".into(),
            };
            let hint = err.remediation().expect("remediation expected");
            assert!(hint.contains(needle), "{hint}");
        }

        let generic = LocatorError::Provider {
            provider: "bing",
            status: Some(500),
            message: "boom".into(),
        };
        assert!(generic.remediation().is_none());
    }
}
