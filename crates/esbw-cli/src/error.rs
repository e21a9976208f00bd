//! Error handling for the esbw CLI.
//!
//! [`CliError`] is the error every command returns. Domain errors from the
//! config, bundler, hook and supervisor layers convert into it through
//! `#[from]`, and `main` turns it into a miette report.
//!
//! # Example
//!
//! ```rust,no_run
//! use esbw_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_index(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Set serveMode.index to an existing file")
//! }
//! ```

mod report;

use std::path::PathBuf;

use esbw_config::{ConfigError, ResolveError};
use thiserror::Error;

use crate::supervisor::SupervisorError;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Missing, unreadable or invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Entry-point expansion or artifact selection failed
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// A build-mode cycle failed; the message lists every failure
    #[error("Build failed:\n{0}")]
    CycleFailed(String),

    /// Run-mode child management failed
    #[error("Supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("{} already exists\n\nHint: pass --force to overwrite it", .0.display())]
    AlreadyExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert() {
        let err: CliError = ConfigError::UnknownArtifact {
            field: "serveMode.build".into(),
            name: "nope".into(),
        }
        .into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn supervisor_errors_convert() {
        let err: CliError = SupervisorError::Unkillable { pid: 42, attempts: 4 }.into();
        assert!(matches!(err, CliError::Supervisor(_)));
        assert!(err.to_string().contains("pid 42"));
    }

    #[test]
    fn with_path_maps_not_found() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = result.with_path("public/index.html").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(ref p) if p.ends_with("index.html")));
    }

    #[test]
    fn with_hint_appends_hint() {
        let result: Result<()> = Err(CliError::Server("port in use".into()));
        let msg = result.with_hint("Pick another serveMode.port").unwrap_err().to_string();
        assert!(msg.contains("port in use"));
        assert!(msg.contains("Hint: Pick another serveMode.port"));
    }

    #[test]
    fn already_exists_mentions_force() {
        let msg = CliError::AlreadyExists(PathBuf::from("esbw.toml")).to_string();
        assert!(msg.contains("esbw.toml"));
        assert!(msg.contains("--force"));
    }
}
