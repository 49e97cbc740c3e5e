//! Per-request orchestration: validate, build the prompt, call the provider,
//! normalize the answer.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Deserializer};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::{RelayError, ValidationError};
use crate::llm::{Provider, normalize};
use crate::metrics::{CallOutcome, CallRecorder};
use crate::prompt::{Strategy, TemplateStore, build_prompt_named};

/// How a successful answer is rendered to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
}

/// Body of `POST /call_openai` and `POST /call_gemini`.
///
/// Required fields that are missing or `null` deserialize as empty, so they
/// surface as a validation error naming the field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub api_key: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_text: String,
    #[serde(default, alias = "prompting_strategie")]
    pub prompting_strategy: Option<String>,
    #[serde(default)]
    pub format: Option<ResponseFormat>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A request that passed validation, with defaults resolved.
#[derive(Debug)]
struct ValidatedRequest<'a> {
    api_key: &'a str,
    system_prompt: &'a str,
    user_text: &'a str,
    strategy: &'a str,
}

/// The request handler shared by both provider endpoints.
pub struct Relay {
    templates: Arc<TemplateStore>,
    default_system_prompt: String,
    require_system_prompt: bool,
    recorder: Arc<dyn CallRecorder>,
}

impl Relay {
    pub fn new(
        templates: Arc<TemplateStore>,
        config: &AppConfig,
        recorder: Arc<dyn CallRecorder>,
    ) -> Self {
        Self {
            templates,
            default_system_prompt: config.system_prompt.clone(),
            require_system_prompt: config.require_system_prompt,
            recorder,
        }
    }

    /// Run one request against `provider`.
    ///
    /// Validation errors and unknown strategies are returned before any
    /// network call.
    /// Provider failures are returned as is; nothing is retried.
    pub async fn generate(
        &self,
        provider: &dyn Provider,
        request: &GenerationRequest,
    ) -> Result<String, RelayError> {
        let kind = provider.kind();
        let request = self.validate(request).inspect_err(|e| {
            warn!(provider = %kind, error = %e, "Rejected request");
        })?;

        let prompt = build_prompt_named(request.strategy, request.user_text, &self.templates)
            .inspect_err(|e| {
                warn!(provider = %kind, error = %e, "Rejected request");
            })?;
        debug!(
            provider = %kind,
            strategy = request.strategy,
            user_text_len = request.user_text.len(),
            prompt_len = prompt.len(),
            "Built prompt"
        );

        self.recorder.call_started(kind);
        let started = Instant::now();
        let result = provider
            .generate(request.api_key, request.system_prompt, &prompt)
            .await;
        let elapsed = started.elapsed();

        match result {
            Ok(raw) => {
                self.recorder.call_finished(kind, CallOutcome::Success, elapsed);
                info!(
                    provider = %kind,
                    elapsed_ms = elapsed.as_millis() as u64,
                    response_len = raw.len(),
                    "Provider response received"
                );
                Ok(normalize(&raw))
            }
            Err(e) => {
                self.recorder.call_finished(kind, CallOutcome::Failure, elapsed);
                error!(
                    provider = %kind,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "Provider call failed"
                );
                Err(e.into())
            }
        }
    }

    fn validate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Result<ValidatedRequest<'a>, RelayError> {
        let api_key =
            non_blank(&request.api_key).ok_or(ValidationError::MissingField("api_key"))?;
        if non_blank(&request.user_text).is_none() {
            return Err(ValidationError::MissingField("user_text").into());
        }

        let system_prompt = match request.system_prompt.as_deref().and_then(non_blank) {
            Some(prompt) => prompt,
            None if self.require_system_prompt => {
                return Err(ValidationError::MissingField("system_prompt").into());
            }
            None => self.default_system_prompt.as_str(),
        };

        let strategy = request
            .prompting_strategy
            .as_deref()
            .unwrap_or(Strategy::default().as_str());

        Ok(ValidatedRequest {
            api_key,
            system_prompt,
            user_text: &request.user_text,
            strategy,
        })
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
