//! Build errors.

use std::io;

use thiserror::Error;

/// Errors produced while compiling an artifact.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The bundler executable could not be started.
    #[error("failed to launch `{program}`: {source}\n\nHint: install esbuild or set ESBW_ESBUILD to its path")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The bundler ran and rejected the build.
    #[error("build failed for artifact '{artifact}'\n{diagnostics}")]
    Failed {
        artifact: String,
        /// Diagnostics as reported by the bundler
        diagnostics: String,
    },

    /// Every entry point pattern expanded to nothing.
    #[error("artifact '{artifact}' has no entry points\n\nHint: check that its entryPoints patterns match existing files")]
    NoEntryPoints { artifact: String },

    /// The size metadata requested from the bundler was missing or malformed.
    #[error("could not read build metadata for artifact '{artifact}': {message}")]
    Metafile { artifact: String, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl BuildError {
    /// Name of the artifact this error belongs to, if known.
    pub fn artifact(&self) -> Option<&str> {
        match self {
            BuildError::Failed { artifact, .. }
            | BuildError::NoEntryPoints { artifact }
            | BuildError::Metafile { artifact, .. } => Some(artifact),
            _ => None,
        }
    }
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;
