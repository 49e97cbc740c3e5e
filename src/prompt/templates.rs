//! Few-shot template store.
//!
//! Templates are (description, target notation) pairs that get spliced into
//! prompts as worked examples. They are loaded once at startup, either from
//! the resource compiled into the binary or from a file given on the command
//! line, and never change afterwards.
//!
//! Loading never fails: a missing or malformed resource only costs prompt
//! quality, so it is logged and replaced by an empty store.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Templates shipped with the binary.
const BUNDLED_TEMPLATES: &str = include_str!("../../resources/few_shot_templates.json");

/// A single worked example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub description: String,
    pub target_notation: String,
}

impl Template {
    pub fn new(description: impl Into<String>, target_notation: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            target_notation: target_notation.into(),
        }
    }
}

/// On-disk shape. `bpmn` is the key used by older resource files.
#[derive(Deserialize)]
struct RawTemplate {
    description: Option<String>,
    #[serde(alias = "bpmn")]
    target_notation: Option<Value>,
}

impl RawTemplate {
    fn into_template(self) -> Option<Template> {
        let description = self.description?;
        let target_notation = match self.target_notation? {
            Value::String(s) => s,
            // Inline JSON models are kept in their compact form.
            other => other.to_string(),
        };
        Some(Template {
            description,
            target_notation,
        })
    }
}

/// Ordered, read-only collection of templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateStore {
    templates: Vec<Template>,
}

impl TemplateStore {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from `path`, or from the bundled resource when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Self {
        let (origin, parsed) = match path {
            None => ("bundled resource".to_string(), Self::parse(BUNDLED_TEMPLATES)),
            Some(path) => {
                let origin = path.display().to_string();
                match std::fs::read_to_string(path) {
                    Ok(content) => (origin, Self::parse(&content)),
                    Err(e) => {
                        warn!(source = %origin, error = %e, "Could not read few-shot templates, continuing without examples");
                        return Self::empty();
                    }
                }
            }
        };

        match parsed {
            Ok(store) => {
                info!(source = %origin, count = store.len(), "Loaded few-shot templates");
                store
            }
            Err(e) => {
                warn!(source = %origin, error = %e, "Could not parse few-shot templates, continuing without examples");
                Self::empty()
            }
        }
    }

    /// Parse a JSON array of templates. Entries missing either field are skipped.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let raw: Vec<RawTemplate> = serde_json::from_str(content)?;
        let total = raw.len();
        let templates: Vec<Template> = raw.into_iter().filter_map(RawTemplate::into_template).collect();

        if templates.len() < total {
            debug!(
                skipped = total - templates.len(),
                "Skipped few-shot entries without description or target notation"
            );
        }

        Ok(Self { templates })
    }

    pub fn first(&self) -> Option<&Template> {
        self.templates.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_templates_are_present() {
        let store = TemplateStore::load(None);
        assert!(!store.is_empty());
        for template in store.iter() {
            assert!(!template.description.is_empty());
            assert!(serde_json::from_str::<Value>(&template.target_notation).is_ok());
        }
    }

    #[test]
    fn test_parse_preserves_order() {
        let store = TemplateStore::parse(
            r#"[
                {"description": "first", "target_notation": "A"},
                {"description": "second", "target_notation": "B"}
            ]"#,
        )
        .unwrap();

        let descriptions: Vec<_> = store.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, vec!["first", "second"]);
        assert_eq!(store.first().unwrap().target_notation, "A");
    }

    #[test]
    fn test_parse_accepts_legacy_bpmn_key() {
        let store = TemplateStore::parse(r#"[{"description": "d", "bpmn": "<xml/>"}]"#).unwrap();
        assert_eq!(store.first().unwrap().target_notation, "<xml/>");
    }

    #[test]
    fn test_parse_skips_incomplete_entries() {
        let store = TemplateStore::parse(
            r#"[
                {"description": "no notation"},
                {"bpmn": "no description"},
                {"description": "ok", "bpmn": "ok"}
            ]"#,
        )
        .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.first().unwrap().description, "ok");
    }

    #[test]
    fn test_parse_inline_json_notation_is_compacted() {
        let store =
            TemplateStore::parse(r#"[{"description": "d", "target_notation": {"events": []}}]"#)
                .unwrap();
        assert_eq!(store.first().unwrap().target_notation, r#"{"events":[]}"#);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(TemplateStore::parse(r#"{"description": "d"}"#).is_err());
    }
}
