//! Heuristic file-type classification from file names.

use std::path::Path;

/// Exact (normalised) stems of the core memory bank documents.
const CORE_FILES: &[(&str, &str)] = &[
    ("projectbrief", "projectbrief"),
    ("productcontext", "productContext"),
    ("activecontext", "activeContext"),
    ("systempatterns", "systemPatterns"),
    ("techcontext", "techContext"),
    ("progress", "progress"),
];

/// Stem fragments and the type they imply, checked in order.
const STEM_HINTS: &[(&str, &str)] = &[
    ("decision", "decision"),
    ("meeting", "meeting"),
    ("research", "research"),
    ("task", "task"),
    ("todo", "task"),
    ("readme", "readme"),
];

/// Infer a document type for a path that declares none.
pub fn infer_file_type(relative_path: &str) -> String {
    let path = Path::new(relative_path);
    let stem: String = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect();

    if let Some((_, ty)) = CORE_FILES.iter().find(|(name, _)| *name == stem) {
        return (*ty).to_string();
    }

    if let Some((_, ty)) = STEM_HINTS.iter().find(|(hint, _)| stem.contains(hint)) {
        return (*ty).to_string();
    }

    let extension =
        path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).unwrap_or_default();
    match extension.as_str() {
        "md" | "markdown" => "markdown",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "txt" => "text",
        _ => "unknown",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("projectbrief.md", "projectbrief")]
    #[case("project-brief.md", "projectbrief")]
    #[case("ProductContext.md", "productContext")]
    #[case("core/active_context.md", "activeContext")]
    #[case("systemPatterns.md", "systemPatterns")]
    #[case("tech context.md", "techContext")]
    #[case("progress.md", "progress")]
    #[case("decisions/2024-01-adr-decision.md", "decision")]
    #[case("weekly-meeting-notes.md", "meeting")]
    #[case("research-llm.md", "research")]
    #[case("TODO.md", "task")]
    #[case("README.md", "readme")]
    #[case("notes/random.md", "markdown")]
    #[case("schema.JSON", "json")]
    #[case("config.yml", "yaml")]
    #[case("plain.txt", "text")]
    #[case("binary", "unknown")]
    fn test_infer_file_type(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(infer_file_type(path), expected);
    }
}
