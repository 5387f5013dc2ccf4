//! Frontmatter parsing from markdown documents.

use super::FrontmatterParser;
use super::types::{Frontmatter, ParsedDocument};
use thiserror::Error;

/// Errors that can occur during frontmatter parsing.
#[derive(Debug, Error)]
pub enum FrontmatterParseError {
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Parses `---` delimited YAML frontmatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFrontmatterParser;

impl FrontmatterParser for YamlFrontmatterParser {
    fn parse(&self, content: &str) -> Result<ParsedDocument, FrontmatterParseError> {
        parse(content)
    }
}

/// Parse frontmatter from markdown content.
///
/// Frontmatter is delimited by `---` at the start of the document:
/// ```markdown
/// ---
/// key: value
/// ---
/// # Document content
/// ```
pub fn parse(content: &str) -> Result<ParsedDocument, FrontmatterParseError> {
    let trimmed = content.trim_start();

    // Check if document starts with frontmatter delimiter
    if !trimmed.starts_with("---") {
        return Ok(ParsedDocument::plain(content));
    }

    let after_first = &trimmed[3..];

    // Skip the newline after opening ---
    let after_newline = after_first
        .strip_prefix('\n')
        .or_else(|| after_first.strip_prefix("\r\n"))
        .unwrap_or(after_first);

    let Some((start, end)) = find_closing_delimiter(after_newline) else {
        // No closing ---, treat as no frontmatter
        return Ok(ParsedDocument::plain(content));
    };

    let yaml_content = &after_newline[..start];
    let body = after_newline[end..].to_string();

    let frontmatter: Frontmatter = if yaml_content.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content.trim())?
    };

    Ok(ParsedDocument { frontmatter: Some(frontmatter), body })
}

/// Byte span of the line holding the closing `---`, including its line break.
fn find_closing_delimiter(content: &str) -> Option<(usize, usize)> {
    let mut pos = 0;
    for line in content.split_inclusive('\n') {
        if line.trim() == "---" {
            return Some((pos, pos + line.len()));
        }
        pos += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_no_frontmatter() {
        let content = "# Hello\n\nSome content";
        let result = parse(content).unwrap();
        assert!(result.frontmatter.is_none());
        assert_eq!(result.body, content);
    }

    #[test]
    fn parse_simple_frontmatter() {
        let content = "---\ntitle: Hello\n---\n# Content";
        let result = parse(content).unwrap();
        assert!(result.frontmatter.is_some());
        let fm = result.frontmatter.unwrap();
        assert_eq!(fm.fields.get("title").and_then(|v| v.as_str()), Some("Hello"));
        assert_eq!(result.body, "# Content");
    }

    #[test]
    fn parse_frontmatter_with_multiple_fields() {
        let content =
            "---\ntitle: Test\ndate: 2024-01-15\ntags:\n  - rust\n  - cli\n---\n\nBody";
        let result = parse(content).unwrap();
        let fm = result.frontmatter.unwrap();
        assert_eq!(fm.fields.get("title").and_then(|v| v.as_str()), Some("Test"));
        assert!(fm.fields.contains_key("tags"));
        assert_eq!(result.body, "\nBody");
    }

    #[test]
    fn parse_empty_frontmatter() {
        let content = "---\n---\n# Content";
        let result = parse(content).unwrap();
        assert!(result.frontmatter.unwrap().fields.is_empty());
        assert_eq!(result.body, "# Content");
    }

    #[test]
    fn parse_crlf_frontmatter() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let result = parse(content).unwrap();
        let fm = result.frontmatter.unwrap();
        assert_eq!(fm.string_field("title").as_deref(), Some("Windows"));
        assert_eq!(result.body, "Body\r\n");
    }

    #[test]
    fn parse_unclosed_frontmatter_is_body() {
        let content = "---\ntitle: never closed\n# Content";
        let result = parse(content).unwrap();
        assert!(result.frontmatter.is_none());
        assert_eq!(result.body, content);
    }

    #[test]
    fn parse_invalid_yaml_is_error() {
        let content = "---\ntitle: [unterminated\n---\nBody";
        assert!(matches!(parse(content), Err(FrontmatterParseError::InvalidYaml(_))));
    }

    #[test]
    fn trait_delegates_to_parse() {
        let parser = YamlFrontmatterParser;
        let doc = parser.parse("---\ntype: progress\n---\nDone").unwrap();
        assert_eq!(doc.frontmatter.unwrap().string_field("type").as_deref(), Some("progress"));
        assert_eq!(doc.body, "Done");
    }
}
