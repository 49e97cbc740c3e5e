//! Prompt construction: few-shot examples, strategies, and the default system prompt.

pub mod builder;
pub mod system;
pub mod templates;

pub use builder::{Strategy, build_prompt, build_prompt_named};
pub use system::DEFAULT_SYSTEM_PROMPT;
pub use templates::{Template, TemplateStore};
