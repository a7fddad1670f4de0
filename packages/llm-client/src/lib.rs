//! Minimal chat-completions client for OpenAI-compatible endpoints.
//!
//! Supports the OpenAI API directly and OpenRouter as a drop-in alternative.
//! Credential discovery prefers OpenRouter when both keys are present, since
//! that is the deployment shape the bot runs with.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{ChatRequest, LlmClient, Message};
//!
//! let client = LlmClient::from_env()?;
//!
//! let response = client
//!     .chat_completion(
//!         ChatRequest::new(client.qualified_model("gpt-4o-mini"), vec![
//!             Message::user("Hello!"),
//!         ])
//!         .with_temperature(0.7),
//!     )
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{LlmError, Result};
pub use types::{ChatRequest, ChatResponse, Message, Usage};

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Model backend credentials resolved from the environment.
///
/// Used both to build a client and as the "is a model backend configured"
/// probe for callers that skip AI work when no key is present.
#[derive(Debug, Clone)]
pub struct LlmCredentials {
    pub api_key: String,
    pub base_url: String,
    pub openrouter: bool,
}

impl LlmCredentials {
    /// Resolve credentials from `OPENROUTER_API_KEY` / `OPENAI_API_KEY`.
    ///
    /// Returns `None` when neither key is set. `OPENAI_BASE_URL` overrides
    /// the endpoint for either key; surrounding quotes are stripped since
    /// they sneak in through `.env` files.
    pub fn from_env() -> Option<Self> {
        let openrouter_key = env_key("OPENROUTER_API_KEY");
        let openai_key = env_key("OPENAI_API_KEY");

        let openrouter = openrouter_key.is_some();
        let api_key = openrouter_key.or(openai_key)?;

        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .map(|u| u.trim_matches(|c| c == '"' || c == '\'').to_string())
            .unwrap_or_else(|| {
                if openrouter {
                    OPENROUTER_BASE_URL.to_string()
                } else {
                    OPENAI_BASE_URL.to_string()
                }
            });

        Some(Self {
            api_key,
            base_url,
            openrouter,
        })
    }
}

/// Environment lookup treating whitespace-only values as unset, so a stray
/// `KEY=" "` in a `.env` file does not count as a configured backend.
fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Chat-completions client.
#[derive(Clone)]
pub struct LlmClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    openrouter: bool,
}

impl LlmClient {
    /// Create a client for the OpenAI API with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Self::default_http_client(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            openrouter: false,
        }
    }

    /// Create a client from resolved credentials.
    pub fn from_credentials(credentials: LlmCredentials) -> Self {
        Self {
            http_client: Self::default_http_client(),
            api_key: credentials.api_key,
            base_url: credentials.base_url,
            openrouter: credentials.openrouter,
        }
    }

    /// Create from the environment (see [`LlmCredentials::from_env`]).
    pub fn from_env() -> Result<Self> {
        let credentials = LlmCredentials::from_env().ok_or_else(|| {
            LlmError::Config("OPENAI_API_KEY or OPENROUTER_API_KEY not set".into())
        })?;
        Ok(Self::from_credentials(credentials))
    }

    fn default_http_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default()
    }

    /// Set a custom base URL (proxies, self-hosted gateways).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a custom request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when the client talks to OpenRouter.
    pub fn is_openrouter(&self) -> bool {
        self.openrouter
    }

    /// Provider-qualified model name.
    ///
    /// OpenRouter requires `provider/model`; bare OpenAI model names get the
    /// `openai/` prefix. Direct OpenAI calls pass through unchanged.
    pub fn qualified_model(&self, model: &str) -> String {
        if self.openrouter && !model.contains('/') {
            format!("openai/{model}")
        } else {
            model.to_string()
        }
    }

    /// Chat completion.
    ///
    /// Sends the request and returns the first choice's content.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let mut builder = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter wants attribution headers on every request.
        if self.openrouter {
            let referer = std::env::var("OPENROUTER_REFERER")
                .unwrap_or_else(|_| "https://github.com".to_string());
            let title = std::env::var("OPENROUTER_TITLE")
                .unwrap_or_else(|_| "FindOrigin Bot".to_string());
            builder = builder.header("HTTP-Referer", referer).header("X-Title", title);
        }

        let response = builder.json(&request).send().await.map_err(|e| {
            warn!(error = %e, "LLM request failed");
            if e.is_timeout() {
                LlmError::Network(format!("request timed out: {e}"))
            } else {
                LlmError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = extract_api_error(&error_text);
            warn!(status = %status, error = %message, "LLM API error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::Api {
                status: status.as_u16(),
                message: "model returned no content".into(),
            })?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "LLM chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: raw.usage,
        })
    }
}

/// Pull the human-readable message out of an API error body, if present.
fn extract_api_error(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.pointer("/message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| body.to_string())
}
