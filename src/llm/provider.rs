//! Provider abstraction shared by the OpenAI and Gemini adapters.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Gemini",
        }
    }

    /// Lowercase name used as a metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed generation parameters sent with every call.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub top_k: Option<u32>,
    pub top_p: Option<f64>,
}

impl SamplingConfig {
    pub fn openai() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            max_output_tokens: 4096,
            top_k: None,
            top_p: None,
        }
    }

    pub fn gemini() -> Self {
        Self {
            model: "gemini-1.5-pro".to_string(),
            temperature: 0.0,
            max_output_tokens: 2048,
            top_k: Some(1),
            top_p: Some(1.0),
        }
    }
}

/// A remote text generation endpoint.
///
/// Implementations hold no credentials: the caller's key is passed on every
/// call and only lives for the duration of that request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Send one system prompt + user prompt pair and return the trimmed text
    /// of the first completion. Exactly one outbound request, no retries.
    async fn generate(
        &self,
        api_key: &str,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<String, ProviderError>;
}

/// Build the per-call HTTP client.
pub(crate) fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, ProviderError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(ProviderError::ClientBuild)
}

/// Turn a non-2xx response into a [`ProviderError::Api`], preferring the
/// provider's own `error.message`.
pub(crate) async fn api_error(kind: ProviderKind, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("no response body").to_string()
            } else {
                body
            }
        });

    ProviderError::Api {
        provider: kind.as_str(),
        status: status.as_u16(),
        message,
    }
}

/// Join the base URL and a path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
