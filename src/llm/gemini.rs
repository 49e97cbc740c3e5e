//! Gemini generate-content adapter.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ProviderError;

use super::provider::{Provider, ProviderKind, SamplingConfig, api_error, build_client, endpoint};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The key travels in this header rather than the `?key=` query parameter,
/// so it never shows up in URLs or error messages.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Calls `POST /v1beta/models/{model}:generateContent`.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    base_url: String,
    sampling: SamplingConfig,
    timeout: Option<Duration>,
}

impl GeminiProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sampling: SamplingConfig::gemini(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn path(&self) -> String {
        format!("v1beta/models/{}:generateContent", self.sampling.model)
    }

    fn request_body(&self, system_prompt: &str, prompt: &str) -> Value {
        let mut generation_config = json!({
            "temperature": self.sampling.temperature,
            "maxOutputTokens": self.sampling.max_output_tokens,
        });
        if let Some(top_k) = self.sampling.top_k {
            generation_config["topK"] = json!(top_k);
        }
        if let Some(top_p) = self.sampling.top_p {
            generation_config["topP"] = json!(top_p);
        }

        json!({
            "systemInstruction": {"parts": [{"text": system_prompt}]},
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": generation_config,
        })
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn generate(
        &self,
        api_key: &str,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let client = build_client(self.timeout)?;

        debug!(model = %self.sampling.model, "Calling Gemini generateContent");
        let response = client
            .post(endpoint(&self.base_url, &self.path()))
            .header(API_KEY_HEADER, api_key)
            .json(&self.request_body(system_prompt, prompt))
            .send()
            .await
            .map_err(ProviderError::Transport)?;

        if !response.status().is_success() {
            return Err(api_error(self.kind(), response).await);
        }

        let body = response.text().await.map_err(ProviderError::Transport)?;
        parse_generation(&body)
    }
}

/// Concatenate the text parts of the first candidate.
fn parse_generation(body: &str) -> Result<String, ProviderError> {
    let provider = ProviderKind::Gemini.as_str();
    let value: Value = serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse {
        provider,
        detail: e.to_string(),
    })?;

    let Some(candidate) = value["candidates"].as_array().and_then(|c| c.first()) else {
        let detail = match value["promptFeedback"]["blockReason"].as_str() {
            Some(reason) => format!("prompt was blocked ({reason})"),
            None => "no candidates in response".to_string(),
        };
        return Err(ProviderError::MalformedResponse { provider, detail });
    };

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();
    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_pins_sampling() {
        let body = GeminiProvider::default().request_body("system", "user");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "system");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "user");
        assert_eq!(body["generationConfig"]["temperature"], 0.0);
        assert_eq!(body["generationConfig"]["topK"], 1);
        assert_eq!(body["generationConfig"]["topP"], 1.0);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_path_uses_model() {
        assert_eq!(
            GeminiProvider::default().path(),
            "v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_parse_generation_joins_parts() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": " {\"a\":"}, {"text": "1} "}]}}]}"#;
        assert_eq!(parse_generation(body).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn test_parse_generation_blocked_prompt() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = parse_generation(body).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_parse_generation_empty_text() {
        let body = r#"{"candidates": [{"content": {"parts": []}}]}"#;
        assert_eq!(parse_generation(body).unwrap(), "");
    }

    #[test]
    fn test_parse_generation_candidate_without_content() {
        let body = r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#;
        assert_eq!(parse_generation(body).unwrap(), "");
    }
}
