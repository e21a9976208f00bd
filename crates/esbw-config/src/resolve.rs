//! Artifact resolution: from a [`ResolvedConfig`] to the concrete specs a
//! build cycle submits.
//!
//! Option precedence is mode overrides > artifact options > common options.
//! Lifecycle keys are stripped from the merged result so the bundler never
//! sees them. Entry points are re-expanded on every call because the files
//! behind a glob change between cycles.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::defaults::ResolvedConfig;
use crate::error::ResolveError;
use crate::glob::Expander;
use crate::mode::Mode;
use crate::options::BuildOptions;

/// One artifact ready to hand to the bundler.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArtifact {
    pub name: String,
    /// Merged, stripped options with `entryPoints` replaced by the expanded
    /// list and `metafile` forced on.
    pub options: BuildOptions,
    pub entry_points: Vec<String>,
}

/// Artifacts built in `mode`, keyed by name in build-list order.
pub fn select_artifacts<'a>(
    config: &'a ResolvedConfig,
    mode: Mode,
) -> Result<IndexMap<&'a str, &'a BuildOptions>, ResolveError> {
    config
        .mode(mode)
        .build
        .iter()
        .map(|name| {
            config
                .artifacts
                .get_key_value(name.as_str())
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| ResolveError::UnknownArtifact(name.clone()))
        })
        .collect()
}

/// Three-way shallow merge with lifecycle keys removed.
pub fn merge_spec(
    common: &BuildOptions,
    artifact: &BuildOptions,
    overrides: &BuildOptions,
) -> BuildOptions {
    let mut merged = common.clone();
    merged.merge_from(artifact);
    merged.merge_from(overrides);
    merged.strip_lifecycle_keys();
    merged
}

/// Expand every entry-point pattern of `spec`, in declaration order.
/// Duplicates across patterns are kept.
pub fn expand_entry_points(
    name: &str,
    spec: &BuildOptions,
    expander: &dyn Expander,
) -> Result<Vec<String>, ResolveError> {
    let mut files = Vec::new();
    for pattern in spec.entry_points() {
        let matched = expander.expand(&pattern)?;
        if matched.is_empty() {
            tracing::warn!(artifact = name, %pattern, "entry point pattern matched no files");
        }
        files.extend(matched);
    }

    if files.len() > 1 {
        if spec.outfile().is_some() {
            return Err(ResolveError::AmbiguousOutput {
                artifact: name.to_string(),
                count: files.len(),
            });
        }
        if spec.outdir().is_none() {
            return Err(ResolveError::MissingOutdir {
                artifact: name.to_string(),
                count: files.len(),
            });
        }
    }

    Ok(files)
}

/// Patterns to watch in `mode`: the expanded entry points of every selected
/// artifact plus the mode's `watchPaths` (except in build mode).
pub fn compute_watch_paths(
    config: &ResolvedConfig,
    mode: Mode,
    expander: &dyn Expander,
) -> Result<IndexSet<String>, ResolveError> {
    let section = config.mode(mode);
    let mut paths = IndexSet::new();

    for (name, artifact) in select_artifacts(config, mode)? {
        let spec = merge_spec(&config.artifacts_common, artifact, &section.overrides);
        paths.extend(expand_entry_points(name, &spec, expander)?);
    }

    if mode.watches() {
        paths.extend(section.watch_paths.iter().cloned());
    }

    Ok(paths)
}

/// Resolves artifacts for a mode against a fixed config and expander.
pub struct Resolver<'a> {
    config: &'a ResolvedConfig,
    expander: &'a dyn Expander,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a ResolvedConfig, expander: &'a dyn Expander) -> Self {
        Self { config, expander }
    }

    /// The specs for one build cycle. Any resolution error aborts the cycle.
    pub fn resolve(&self, mode: Mode) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        let overrides = &self.config.mode(mode).overrides;

        select_artifacts(self.config, mode)?
            .into_iter()
            .map(|(name, artifact)| {
                let mut options = merge_spec(&self.config.artifacts_common, artifact, overrides);
                let entry_points = expand_entry_points(name, &options, self.expander)?;
                if options.contains_key("entryPoints") {
                    options.set_entry_points(&entry_points);
                }
                options.insert("metafile", Value::Bool(true));

                Ok(ResolvedArtifact {
                    name: name.to_string(),
                    options,
                    entry_points,
                })
            })
            .collect()
    }

    pub fn watch_paths(&self, mode: Mode) -> Result<IndexSet<String>, ResolveError> {
        compute_watch_paths(self.config, mode, self.expander)
    }
}
