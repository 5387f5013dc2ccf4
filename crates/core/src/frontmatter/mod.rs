//! Frontmatter parsing for memory bank documents.
//!
//! The index only needs to split a leading YAML block from the body and read
//! a handful of well-known keys out of it. Parsing sits behind the
//! [`FrontmatterParser`] trait so the index can be driven with another format.

pub mod parser;
pub mod types;

pub use parser::{FrontmatterParseError, YamlFrontmatterParser, parse};
pub use types::{Frontmatter, ParsedDocument};

/// Splits a raw document into frontmatter data and body content.
pub trait FrontmatterParser: Send + Sync {
    fn parse(&self, content: &str) -> Result<ParsedDocument, FrontmatterParseError>;
}
