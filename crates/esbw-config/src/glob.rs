//! Entry-point glob expansion.

use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use walkdir::WalkDir;

use crate::error::ResolveError;

/// Turns a pattern into the ordered list of files it names.
pub trait Expander: Send + Sync {
    fn expand(&self, pattern: &str) -> Result<Vec<String>, ResolveError>;
}

/// Filesystem expander rooted at the project directory.
///
/// Results are `/`-separated, relative to the root (absolute patterns stay
/// absolute) and sorted, so expanding the same tree twice is stable.
#[derive(Debug, Clone)]
pub struct GlobExpander {
    root: PathBuf,
}

impl GlobExpander {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Expander for GlobExpander {
    fn expand(&self, pattern: &str) -> Result<Vec<String>, ResolveError> {
        let pattern = pattern.strip_prefix("./").unwrap_or(pattern);

        if !is_glob(pattern) {
            let exists = self.root.join(pattern).is_file();
            return Ok(if exists { vec![pattern.to_string()] } else { Vec::new() });
        }

        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ResolveError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?
            .compile_matcher();

        let absolute = Path::new(pattern).is_absolute();
        let walk_root = self.root.join(static_prefix(pattern));
        if !walk_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in WalkDir::new(&walk_root).follow_links(true) {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_file() {
                continue;
            }
            let candidate = if absolute {
                to_slash(entry.path())
            } else {
                match entry.path().strip_prefix(&self.root) {
                    Ok(rel) => to_slash(rel),
                    Err(_) => continue,
                }
            };
            if matcher.is_match(&candidate) {
                matches.push(candidate);
            }
        }

        matches.sort();
        Ok(matches)
    }
}

/// Whether `pattern` contains glob metacharacters.
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// The leading directory components of `pattern` that contain no glob
/// metacharacters. For a plain path this is the path itself.
pub fn static_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    for component in Path::new(pattern).components() {
        match component {
            Component::Normal(part) if is_glob(&part.to_string_lossy()) => break,
            Component::CurDir => continue,
            other => prefix.push(other.as_os_str()),
        }
    }
    prefix
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replacen("//", "/", 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn static_prefix_stops_at_first_glob() {
        assert_eq!(static_prefix("src/**/*.ts"), PathBuf::from("src"));
        assert_eq!(static_prefix("./src/pages/*.tsx"), PathBuf::from("src/pages"));
        assert_eq!(static_prefix("*.ts"), PathBuf::new());
        assert_eq!(static_prefix("public/index.html"), PathBuf::from("public/index.html"));
    }

    #[test]
    fn star_does_not_cross_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/a.ts");
        touch(dir.path(), "src/nested/b.ts");

        let expander = GlobExpander::new(dir.path());
        assert_eq!(expander.expand("src/*.ts").unwrap(), vec!["src/a.ts"]);
        assert_eq!(
            expander.expand("src/**/*.ts").unwrap(),
            vec!["src/a.ts", "src/nested/b.ts"]
        );
    }

    #[test]
    fn brace_alternation_is_supported() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/a.ts");
        touch(dir.path(), "src/b.tsx");
        touch(dir.path(), "src/c.js");

        let expander = GlobExpander::new(dir.path());
        assert_eq!(
            expander.expand("src/**/*.{ts,tsx}").unwrap(),
            vec!["src/a.ts", "src/b.tsx"]
        );
    }

    #[test]
    fn literal_paths_expand_only_when_present() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/index.ts");

        let expander = GlobExpander::new(dir.path());
        assert_eq!(expander.expand("./src/index.ts").unwrap(), vec!["src/index.ts"]);
        assert!(expander.expand("src/missing.ts").unwrap().is_empty());
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let dir = TempDir::new().unwrap();
        let expander = GlobExpander::new(dir.path());
        assert!(matches!(
            expander.expand("src/{a,b"),
            Err(ResolveError::InvalidPattern { .. })
        ));
    }
}
