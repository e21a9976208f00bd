//! Validation of a user config against the active mode.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::EsbwConfig;
use crate::error::{ConfigError, Result};
use crate::mode::Mode;
use crate::options::BuildOptions;
use crate::resolve::merge_spec;

/// Non-fatal findings. The caller decides how to surface them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `serveMode.index` is set but missing on disk; an index is generated.
    IndexNotFound(PathBuf),
    /// `serveMode.injectArtifacts` is empty; every artifact is injected.
    EmptyInjectList,
    /// The config declares no artifacts.
    NoArtifacts,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::IndexNotFound(path) => write!(
                f,
                "config: serveMode.index was defined as \"{}\" but was not found on the filesystem",
                path.display()
            ),
            ConfigWarning::EmptyInjectList => f.write_str(
                "config: serveMode.injectArtifacts empty. defaulting to injecting all artifacts.",
            ),
            ConfigWarning::NoArtifacts => f.write_str("config: no artifacts defined"),
        }
    }
}

/// Validate `config` for `mode`. Relative paths are checked against `root`.
///
/// Build lists of every mode and the serve inject list must only name
/// declared artifacts. Serve mode additionally requires each injected
/// artifact to have an `outfile`.
pub fn validate(config: &EsbwConfig, mode: Mode, root: &Path) -> Result<Vec<ConfigWarning>> {
    let mut warnings = Vec::new();

    if config.artifacts.is_empty() {
        warnings.push(ConfigWarning::NoArtifacts);
    }

    validate_formats(config)?;

    for m in Mode::ALL {
        let Some(section) = config.mode(m) else {
            continue;
        };
        for name in section.build.iter().flatten() {
            if !config.artifacts.contains_key(name) {
                return Err(ConfigError::UnknownArtifact {
                    field: format!("{}.build", m.key()),
                    name: name.clone(),
                });
            }
        }
    }

    let serve = config.serve_mode.as_ref();
    let inject = serve.and_then(|s| s.inject_artifacts.as_deref()).unwrap_or(&[]);
    for name in inject {
        if !config.artifacts.contains_key(name) {
            return Err(ConfigError::UnknownArtifact {
                field: "serveMode.injectArtifacts".into(),
                name: name.clone(),
            });
        }
    }

    if mode == Mode::Serve {
        if let Some(index) = serve.and_then(|s| s.index.as_ref()) {
            if !root.join(index).is_file() {
                warnings.push(ConfigWarning::IndexNotFound(index.clone()));
            }
        }

        if inject.is_empty() {
            warnings.push(ConfigWarning::EmptyInjectList);
        }

        let no_overrides = BuildOptions::default();
        let overrides = serve.map_or(&no_overrides, |s| &s.overrides);
        for name in inject {
            let spec = merge_spec(
                &config.artifacts_common,
                &config.artifacts[name.as_str()],
                overrides,
            );
            if spec.outfile().is_none() {
                return Err(ConfigError::MissingOutfile {
                    artifact: name.clone(),
                });
            }
        }
    }

    Ok(warnings)
}

/// Without a common `format`, every artifact must declare a known one.
fn validate_formats(config: &EsbwConfig) -> Result<()> {
    if config.artifacts_common.contains_key("format") {
        return Ok(());
    }

    for (name, artifact) in &config.artifacts {
        if artifact.format().is_none() {
            let found = match artifact.get("format") {
                None | Some(Value::Null) => "undefined".to_string(),
                Some(other) => other.to_string(),
            };
            return Err(ConfigError::InvalidFormat {
                artifact: name.clone(),
                found,
            });
        }
    }
    Ok(())
}
