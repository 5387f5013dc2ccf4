//! Frontmatter types and defensive field access.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::HashMap;

/// Represents parsed YAML frontmatter from a markdown document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Fields as key-value pairs.
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

impl Frontmatter {
    /// Read a scalar field as a string.
    ///
    /// Numbers and booleans are rendered to text; empty strings, sequences,
    /// mappings and nulls yield `None`.
    pub fn string_field(&self, key: &str) -> Option<String> {
        let value = match self.fields.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Tagged(tagged) => match &tagged.value {
                Value::String(s) => s.trim().to_string(),
                _ => return None,
            },
            _ => return None,
        };
        (!value.is_empty()).then_some(value)
    }

    /// Read a list of strings.
    ///
    /// Accepts a YAML sequence (non-string items are skipped) or a single
    /// comma-separated string.
    pub fn string_list_field(&self, key: &str) -> Option<Vec<String>> {
        let items: Vec<String> = match self.fields.get(key)? {
            Value::Sequence(seq) => seq
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect(),
            Value::String(s) => s
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            _ => return None,
        };
        Some(items)
    }
}

/// Result of splitting frontmatter from markdown.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Parsed frontmatter (if present).
    pub frontmatter: Option<Frontmatter>,
    /// The markdown body (everything after frontmatter).
    pub body: String,
}

impl ParsedDocument {
    /// A document without any frontmatter.
    pub fn plain(content: &str) -> Self {
        Self { frontmatter: None, body: content.to_string() }
    }
}
