//! llm-connector - An HTTP relay that turns natural-language process
//! descriptions into BPMN models.
//!
//! # Overview
//!
//! A request carries the caller's provider API key, an optional system
//! prompt, the description text and a prompting strategy. The relay builds a
//! zero-, single- or few-shot prompt from the configured templates, forwards
//! it to OpenAI or Gemini, and reformats the answer as canonical JSON when it
//! looks like JSON.

pub mod config;
pub mod error;
pub mod llm;
pub mod metrics;
pub mod prompt;
pub mod relay;
pub mod server;
pub mod version;

// Re-export commonly used types
pub use config::{AppConfig, Environment};
pub use error::{ConfigurationError, ProviderError, RelayError, ValidationError};
pub use llm::{GeminiProvider, OpenAiProvider, Provider, ProviderKind, normalize};
pub use metrics::{CallOutcome, CallRecorder, Metrics};
pub use prompt::{Strategy, Template, TemplateStore, build_prompt};
pub use relay::{GenerationRequest, Relay, ResponseFormat};
pub use server::{AppState, router, serve};
