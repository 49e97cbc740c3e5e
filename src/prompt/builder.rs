//! Prompt construction for the three prompting strategies.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;

use super::templates::{Template, TemplateStore};

/// Label of the answer slot that follows each description.
const NOTATION_LABEL: &str = "BPMN";

/// How many worked examples go into a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    ZeroShot,
    SingleShot,
    #[default]
    FewShot,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ZeroShot => "zero_shot",
            Strategy::SingleShot => "single_shot",
            Strategy::FewShot => "few_shot",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero_shot" => Ok(Strategy::ZeroShot),
            "single_shot" => Ok(Strategy::SingleShot),
            "few_shot" => Ok(Strategy::FewShot),
            other => Err(ConfigurationError::UnsupportedStrategy(other.to_string())),
        }
    }
}

/// Build the user prompt for `strategy`.
///
/// - `ZeroShot`: a fixed instruction with the description, no examples.
/// - `SingleShot`: the first template as the only example. Falls back to
///   `ZeroShot` when there are no templates.
/// - `FewShot`: every template, in store order, then the description with an
///   empty answer slot.
pub fn build_prompt(strategy: Strategy, user_text: &str, templates: &TemplateStore) -> String {
    match strategy {
        Strategy::ZeroShot => zero_shot(user_text),
        Strategy::SingleShot => match templates.first() {
            Some(example) => [example_section(example), query_section(user_text)].join("\n"),
            None => zero_shot(user_text),
        },
        Strategy::FewShot => templates
            .iter()
            .map(example_section)
            .chain(std::iter::once(query_section(user_text)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Same as [`build_prompt`], taking the strategy by its wire name.
pub fn build_prompt_named(
    strategy: &str,
    user_text: &str,
    templates: &TemplateStore,
) -> Result<String, ConfigurationError> {
    let strategy = strategy.parse::<Strategy>()?;
    Ok(build_prompt(strategy, user_text, templates))
}

fn zero_shot(user_text: &str) -> String {
    format!(
        "Please generate a {NOTATION_LABEL} model for the following description:\n\n{user_text}\n\n{NOTATION_LABEL}:"
    )
}

fn example_section(template: &Template) -> String {
    format!(
        "Description:\n{}\n\n{NOTATION_LABEL}:\n{}\n",
        template.description, template.target_notation
    )
}

fn query_section(user_text: &str) -> String {
    format!("Description:\n{user_text}\n\n{NOTATION_LABEL}:\n")
}
