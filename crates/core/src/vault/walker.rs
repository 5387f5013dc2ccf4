//! Recursive memory bank directory walker.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Directory names owned by package managers and build tools.
const DEPENDENCY_DIRS: &[&str] =
    &["node_modules", "bower_components", "vendor", "target", "__pycache__", "venv"];

#[derive(Debug, Error)]
pub enum VaultWalkerError {
    #[error("memory bank root does not exist: {0}")]
    MissingRoot(String),

    #[error("failed to walk memory bank directory {0}: {1}")]
    WalkError(String, #[source] walkdir::Error),
}

/// A discovered candidate document.
#[derive(Debug, Clone)]
pub struct WalkedFile {
    /// Path relative to the root, always `/`-separated.
    pub relative_path: String,
}

/// Walker for discovering documents in a memory bank.
#[derive(Debug)]
pub struct VaultWalker {
    root: PathBuf,
    /// Folders to exclude from walking (relative paths from the root).
    excluded_folders: Vec<PathBuf>,
    /// Lower-cased extensions without the leading dot.
    extensions: Vec<String>,
}

impl VaultWalker {
    /// Create a walker collecting `.md` files under `root`.
    pub fn new(root: &Path) -> Result<Self, VaultWalkerError> {
        Self::with_options(root, Vec::new(), &["md".to_string()])
    }

    /// Create a walker with folder exclusions and a custom extension list.
    ///
    /// Excluded folders can be specified as:
    /// - Relative paths from the root (e.g., "archive/2023")
    /// - Absolute paths (will be converted to relative)
    /// - Paths joined onto `root` as given, even when `root` is relative or
    ///   reached through a symlink
    pub fn with_options(
        root: &Path,
        excluded_folders: Vec<PathBuf>,
        extensions: &[String],
    ) -> Result<Self, VaultWalkerError> {
        let given_root = root;
        let root = root
            .canonicalize()
            .map_err(|_| VaultWalkerError::MissingRoot(root.display().to_string()))?;

        if !root.is_dir() {
            return Err(VaultWalkerError::MissingRoot(root.display().to_string()));
        }

        let excluded_folders = excluded_folders
            .into_iter()
            .map(|p| relative_exclusion(p, given_root, &root))
            .collect();

        let extensions = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();

        Ok(Self { root, excluded_folders, extensions })
    }

    /// Walk the tree depth-first and return every candidate document.
    ///
    /// Hidden and dependency directories are never entered. An unreadable
    /// subdirectory is logged and skipped; only a failure at the root aborts.
    pub fn walk(&self) -> Result<Vec<WalkedFile>, VaultWalkerError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(VaultWalkerError::WalkError(
                        self.root.display().to_string(),
                        e,
                    ));
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable path under {}: {}", self.root.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !self.is_candidate(path) {
                continue;
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            files.push(WalkedFile { relative_path: to_relative_key(relative) });
        }

        Ok(files)
    }

    /// Check if an entry should be excluded from walking.
    fn is_excluded(&self, entry: &walkdir::DirEntry) -> bool {
        // Never filter the root directory (depth 0)
        if entry.depth() == 0 {
            return false;
        }

        if !entry.file_type().is_dir() {
            return false;
        }

        let name = entry.file_name().to_string_lossy();

        if name.starts_with('.') || DEPENDENCY_DIRS.contains(&name.as_ref()) {
            return true;
        }

        if !self.excluded_folders.is_empty()
            && let Ok(relative) = entry.path().strip_prefix(&self.root)
        {
            return self.excluded_folders.iter().any(|excluded| relative.starts_with(excluded));
        }

        false
    }

    fn is_candidate(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
    }
}

/// Normalize an excluded folder to a path relative to the canonical `root`.
fn relative_exclusion(path: PathBuf, given_root: &Path, root: &Path) -> PathBuf {
    if let Ok(relative) = path.strip_prefix(given_root) {
        return relative.to_path_buf();
    }
    if !path.is_absolute() {
        return path;
    }
    if let Ok(relative) = path.strip_prefix(root) {
        return relative.to_path_buf();
    }
    // Resolve symlinks in the exclusion itself; a missing folder excludes nothing.
    match path.canonicalize() {
        Ok(canonical) => canonical.strip_prefix(root).map_or(path.clone(), Path::to_path_buf),
        Err(_) => path,
    }
}

/// Render a relative path as the `/`-separated key used by the index.
pub fn to_relative_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_bank() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::write(root.join("projectbrief.md"), "# Brief").unwrap();
        fs::write(root.join("progress.md"), "# Progress").unwrap();

        fs::create_dir(root.join("notes")).unwrap();
        fs::write(root.join("notes/meeting.md"), "# Meeting").unwrap();

        // Hidden directory (should be skipped)
        fs::create_dir(root.join(".index")).unwrap();
        fs::write(root.join(".index/secret.md"), "# Secret").unwrap();

        // Dependency directory (should be skipped)
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("node_modules/pkg/README.md"), "# Pkg").unwrap();

        // Non-markdown file (should be skipped)
        fs::write(root.join("readme.txt"), "Not markdown").unwrap();

        dir
    }

    fn relative_paths(files: &[WalkedFile]) -> Vec<String> {
        files.iter().map(|f| f.relative_path.clone()).collect()
    }

    #[test]
    fn test_walk_finds_markdown_files() {
        let bank = create_test_bank();
        let walker = VaultWalker::new(bank.path()).unwrap();
        let files = walker.walk().unwrap();

        assert_eq!(
            relative_paths(&files),
            vec!["notes/meeting.md", "progress.md", "projectbrief.md"]
        );
    }

    #[test]
    fn test_walk_skips_hidden_and_dependency_directories() {
        let bank = create_test_bank();
        let walker = VaultWalker::new(bank.path()).unwrap();
        let paths = relative_paths(&walker.walk().unwrap());

        assert!(!paths.iter().any(|p| p.contains(".index")));
        assert!(!paths.iter().any(|p| p.contains("node_modules")));
    }

    #[test]
    fn test_walk_hidden_file_at_top_level_is_kept() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".draft.md"), "# Draft").unwrap();

        let walker = VaultWalker::new(dir.path()).unwrap();
        assert_eq!(relative_paths(&walker.walk().unwrap()), vec![".draft.md"]);
    }

    #[test]
    fn test_walk_custom_extensions() {
        let bank = create_test_bank();
        let walker = VaultWalker::with_options(
            bank.path(),
            Vec::new(),
            &["txt".to_string(), ".MD".to_string()],
        )
        .unwrap();
        let paths = relative_paths(&walker.walk().unwrap());

        assert!(paths.contains(&"readme.txt".to_string()));
        assert!(paths.contains(&"progress.md".to_string()));
    }

    #[test]
    fn test_missing_root() {
        let result = VaultWalker::new(Path::new("/nonexistent/path"));
        assert!(matches!(result.unwrap_err(), VaultWalkerError::MissingRoot(_)));
    }

    #[test]
    fn test_walk_with_nested_exclusion() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("docs/internal")).unwrap();
        fs::write(root.join("docs/readme.md"), "# Docs").unwrap();
        fs::write(root.join("docs/internal/secret.md"), "# Secret").unwrap();
        fs::write(root.join("note.md"), "# Note").unwrap();

        let excluded = vec![PathBuf::from("docs/internal")];
        let walker =
            VaultWalker::with_options(root, excluded, &["md".to_string()]).unwrap();
        let paths = relative_paths(&walker.walk().unwrap());

        assert_eq!(paths, vec!["docs/readme.md", "note.md"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_exclusion_under_symlinked_root() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real");
        fs::create_dir_all(real.join("archive")).unwrap();
        fs::write(real.join("archive/old.md"), "# Old").unwrap();
        fs::write(real.join("keep.md"), "# Keep").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let excluded = vec![link.join("archive")];
        let walker = VaultWalker::with_options(&link, excluded, &["md".to_string()]).unwrap();

        assert_eq!(relative_paths(&walker.walk().unwrap()), vec!["keep.md"]);
    }

    #[test]
    fn test_exclusion_joined_onto_relative_root() {
        let excluded = relative_exclusion(
            PathBuf::from("bank/archive"),
            Path::new("bank"),
            Path::new("/home/me/bank"),
        );
        assert_eq!(excluded, PathBuf::from("archive"));

        let plain = relative_exclusion(
            PathBuf::from("archive/2023"),
            Path::new("/home/me/bank"),
            Path::new("/home/me/bank"),
        );
        assert_eq!(plain, PathBuf::from("archive/2023"));
    }

    #[test]
    fn test_relative_key_uses_forward_slashes() {
        let path: PathBuf = ["a", "b", "c.md"].iter().collect();
        assert_eq!(to_relative_key(&path), "a/b/c.md");
    }
}
