//! OpenAI chat-completions adapter.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ProviderError;

use super::provider::{Provider, ProviderKind, SamplingConfig, api_error, build_client, endpoint};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const CHAT_COMPLETIONS_PATH: &str = "v1/chat/completions";

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Calls `POST /v1/chat/completions` with a system and a user message.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    base_url: String,
    sampling: SamplingConfig,
    timeout: Option<Duration>,
}

impl OpenAiProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sampling: SamplingConfig::openai(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn request_body(&self, system_prompt: &str, prompt: &str) -> Value {
        json!({
            "model": self.sampling.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": prompt}
            ],
            "temperature": self.sampling.temperature,
            "max_tokens": self.sampling.max_output_tokens,
        })
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn generate(
        &self,
        api_key: &str,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let client = build_client(self.timeout)?;

        debug!(model = %self.sampling.model, "Calling OpenAI chat completions");
        let response = client
            .post(endpoint(&self.base_url, CHAT_COMPLETIONS_PATH))
            .bearer_auth(api_key)
            .json(&self.request_body(system_prompt, prompt))
            .send()
            .await
            .map_err(ProviderError::Transport)?;

        if !response.status().is_success() {
            return Err(api_error(self.kind(), response).await);
        }

        let body = response.text().await.map_err(ProviderError::Transport)?;
        parse_completion(&body)
    }
}

fn parse_completion(body: &str) -> Result<String, ProviderError> {
    let completion: ChatCompletion =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse {
            provider: ProviderKind::OpenAi.as_str(),
            detail: e.to_string(),
        })?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider: ProviderKind::OpenAi.as_str(),
            detail: "no choices in response".to_string(),
        })?;

    Ok(choice.message.content.unwrap_or_default().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_pins_sampling() {
        let body = OpenAiProvider::default().request_body("system", "user");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "user");
    }

    #[test]
    fn test_parse_completion_trims_first_choice() {
        let body = r#"{"choices": [
            {"message": {"role": "assistant", "content": "  first \n"}},
            {"message": {"role": "assistant", "content": "second"}}
        ]}"#;
        assert_eq!(parse_completion(body).unwrap(), "first");
    }

    #[test]
    fn test_parse_completion_without_choices() {
        let err = parse_completion(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_completion_null_content_is_empty_text() {
        let body = r#"{"choices": [{"message": {"content": null}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "");
    }

    #[test]
    fn test_parse_completion_invalid_json() {
        assert!(matches!(
            parse_completion("<html>"),
            Err(ProviderError::MalformedResponse { .. })
        ));
    }
}
