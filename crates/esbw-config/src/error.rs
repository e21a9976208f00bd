//! Error types for configuration loading, validation and resolution.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Fatal configuration problems. None of these are retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't find {candidates} in {}", .dir.display())]
    NotFound { dir: PathBuf, candidates: String },

    #[error("failed to load {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error(
        "invalid 'format' for artifact '{artifact}'. got {found}, expected one of 'esm', 'cjs', 'iife'"
    )]
    InvalidFormat { artifact: String, found: String },

    #[error("unknown artifact in {field}: \"{name}\"")]
    UnknownArtifact { field: String, name: String },

    #[error("injected artifact \"{artifact}\" must specify an outfile")]
    MissingOutfile { artifact: String },
}

/// Problems turning a resolved config into concrete build specs.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(
        "cannot specify \"outfile\" when there are multiple \"entryPoints\" (artifact \"{artifact}\" matched {count} files)"
    )]
    AmbiguousOutput { artifact: String, count: usize },

    #[error(
        "artifact \"{artifact}\" matched {count} entry points, an \"outdir\" is required"
    )]
    MissingOutdir { artifact: String, count: usize },

    #[error("unknown artifact \"{0}\"")]
    UnknownArtifact(String),

    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_directory_and_candidates() {
        let err = ConfigError::NotFound {
            dir: PathBuf::from("/work/app"),
            candidates: "esbw.toml or esbw.json".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/work/app"));
        assert!(msg.contains("esbw.toml"));
    }

    #[test]
    fn ambiguous_output_mentions_outfile() {
        let err = ResolveError::AmbiguousOutput {
            artifact: "main".into(),
            count: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("outfile"));
        assert!(msg.contains("main"));
        assert!(msg.contains('3'));
    }
}
