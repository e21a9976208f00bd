//! File system watcher for the watch loop.
//!
//! Watches the static directory prefix of every pattern and forwards the
//! changes whose project-relative path matches one of the patterns. A
//! pattern naming a single file is watched through its parent directory,
//! since saving by renaming a temp file over it replaces the watched inode.
//! Events are not debounced here; the watch loop coalesces them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use esbw_config::glob::static_prefix;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{CliError, Result};

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    fn from_event(kind: &EventKind, path: &Path) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path.to_path_buf())),
            EventKind::Modify(_) => Some(FileChange::Modified(path.to_path_buf())),
            EventKind::Remove(_) => Some(FileChange::Removed(path.to_path_buf())),
            _ => None,
        }
    }
}

/// Keeps the underlying notify watcher alive; events stop when dropped.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
    watched: Vec<PathBuf>,
}

impl FileWatcher {
    /// Watch `patterns` (project-relative globs or paths) under `root`.
    ///
    /// # Errors
    ///
    /// Fails if the root does not exist, a pattern is not a valid glob, or
    /// the platform watcher cannot be set up.
    pub fn new<I, S>(root: &Path, patterns: I) -> Result<(Self, mpsc::Receiver<FileChange>)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !root.exists() {
            return Err(CliError::FileNotFound(root.to_path_buf()));
        }
        let root = root.canonicalize()?;

        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().trim_start_matches("./").to_string())
            .collect();
        let matcher = build_matcher(&patterns)?;
        let watched = watch_roots(&root, &patterns);

        let (tx, rx) = mpsc::channel(256);
        let filter_root = root.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(%err, "file watcher error");
                    return;
                }
            };
            for path in &event.paths {
                if !Self::matches(path, &filter_root, &matcher) {
                    continue;
                }
                if let Some(change) = FileChange::from_event(&event.kind, path) {
                    // A full channel already has a cycle pending.
                    let _ = tx.try_send(change);
                }
            }
        })?;

        for entry in &watched {
            let mode = if entry.recursive {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            watcher.watch(&entry.path, mode)?;
            tracing::debug!(path = %entry.path.display(), recursive = entry.recursive, "watching");
        }
        let watched = watched.into_iter().map(|entry| entry.path).collect();

        Ok((
            Self {
                _watcher: watcher,
                root,
                watched,
            },
            rx,
        ))
    }

    fn matches(path: &Path, root: &Path, matcher: &GlobSet) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return false;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        matcher.is_match(relative)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths registered with the platform watcher.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

fn build_matcher(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| CliError::Custom(format!("invalid watch pattern '{pattern}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| CliError::Custom(format!("invalid watch patterns: {e}")))
}

/// A directory registered with the platform watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WatchRoot {
    path: PathBuf,
    recursive: bool,
}

/// Directories to register: each pattern's static prefix, or its closest
/// existing ancestor. A prefix that is a file contributes its parent,
/// non-recursively. Entries under a recursive root are dropped.
fn watch_roots(root: &Path, patterns: &[String]) -> Vec<WatchRoot> {
    let mut candidates: BTreeMap<PathBuf, bool> = BTreeMap::new();
    for pattern in patterns {
        let mut path = root.join(static_prefix(pattern));
        while !path.exists() && path != root {
            if !path.pop() {
                break;
            }
        }

        let (dir, recursive) = if path.is_file() {
            let parent = path.parent().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            (parent, false)
        } else {
            (path, true)
        };
        *candidates.entry(dir).or_insert(recursive) |= recursive;
    }

    let mut roots: Vec<WatchRoot> = Vec::new();
    for (path, recursive) in candidates {
        if !roots.iter().any(|r| r.recursive && path.starts_with(&r.path)) {
            roots.push(WatchRoot { path, recursive });
        }
    }
    roots
}
