//! Deterministic directory walk with ignore patterns.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Compiled ignore patterns.
///
/// Patterns are glob syntax matched against root-relative paths with `/`
/// separators. Directories are also tested with a trailing `/`, so
/// `**/node_modules/**` prunes the `node_modules` directory itself.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    set: GlobSet,
}

impl IgnoreMatcher {
    /// Compile the patterns. The first invalid pattern is an error.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| Error::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
            source,
        })?;
        Ok(Self { set })
    }

    /// A matcher that ignores nothing.
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    /// Whether a root-relative path is ignored.
    pub fn is_ignored(&self, relative: &str, is_dir: bool) -> bool {
        if self.set.is_empty() {
            return false;
        }
        self.set.is_match(relative) || (is_dir && self.set.is_match(format!("{}/", relative)))
    }
}

/// A file found by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    pub path: PathBuf,
    /// Root-relative path with `/` separators.
    pub relative: String,
}

/// Root-relative path with `/` separators.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Collect every non-ignored file under `root`, sorted by name within each
/// directory.
///
/// Ignored directories are pruned before they are read. An error reading
/// the root itself is returned; errors below the root are logged and the
/// affected entry is skipped.
pub fn collect_files(
    root: &Path,
    ignore: &IgnoreMatcher,
    follow_links: bool,
) -> Result<Vec<WalkedFile>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            let relative = relative_path(root, e.path());
            !ignore.is_ignored(&relative, e.file_type().is_dir())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(Error::Walk {
                    path: root.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() {
            let relative = relative_path(root, entry.path());
            files.push(WalkedFile {
                path: entry.into_path(),
                relative,
            });
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    fn relatives(files: &[WalkedFile]) -> Vec<&str> {
        files.iter().map(|f| f.relative.as_str()).collect()
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let err = IgnoreMatcher::new(&["src/[".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "src/["));
    }

    #[test]
    fn test_directory_patterns_match_with_trailing_slash() {
        let m = IgnoreMatcher::new(&["**/node_modules/**"]).unwrap();
        assert!(m.is_ignored("node_modules", true));
        assert!(m.is_ignored("web/node_modules", true));
        assert!(m.is_ignored("web/node_modules/react/index.js", false));
        assert!(!m.is_ignored("node_modules_backup", true));
        assert!(!m.is_ignored("src/app.js", false));
    }

    #[test]
    fn test_file_patterns() {
        let m = IgnoreMatcher::new(&["*.min.js", "vendor/**"]).unwrap();
        assert!(m.is_ignored("web/app.min.js", false));
        assert!(m.is_ignored("vendor/lib.c", false));
        assert!(!m.is_ignored("src/vendor.c", false));
        assert!(!IgnoreMatcher::empty().is_ignored("anything", false));
    }

    #[test]
    fn test_walk_is_sorted_and_prunes() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.py");
        touch(temp.path(), "a.py");
        touch(temp.path(), "pkg/z.go");
        touch(temp.path(), "pkg/m.go");
        touch(temp.path(), "node_modules/dep/index.js");
        touch(temp.path(), "web/node_modules/x.js");

        let ignore = IgnoreMatcher::new(&["**/node_modules/**"]).unwrap();
        let files = collect_files(temp.path(), &ignore, false).unwrap();
        assert_eq!(relatives(&files), ["a.py", "b.py", "pkg/m.go", "pkg/z.go"]);
    }

    #[test]
    fn test_walk_missing_root() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let err = collect_files(&missing, &IgnoreMatcher::empty(), false).unwrap_err();
        assert!(matches!(err, Error::Walk { .. }));
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/repo");
        assert_eq!(relative_path(root, &root.join("a").join("b.rs")), "a/b.rs");
    }
}
