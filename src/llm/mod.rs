//! LLM provider adapters and response normalization.

pub mod gemini;
pub mod json;
pub mod openai;
pub mod provider;

pub use gemini::GeminiProvider;
pub use json::normalize;
pub use openai::OpenAiProvider;
pub use provider::{Provider, ProviderKind, SamplingConfig};
