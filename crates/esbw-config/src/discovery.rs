//! File-based config discovery for CLI use
//!
//! Handles finding and loading the esbw configuration from the project
//! directory. Hosts that build an [`EsbwConfig`] themselves skip this module.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::EsbwConfig;
use crate::defaults::{ResolvedConfig, apply_defaults};
use crate::error::{ConfigError, Result};
use crate::mode::Mode;
use crate::validation::{ConfigWarning, validate};

/// Config file names, in lookup order.
pub const CONFIG_FILE_NAMES: &[&str] = &["esbw.toml", "esbw.json"];

/// A validated, defaulted config and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: ResolvedConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Searches for an esbw configuration in conventional locations.
///
/// # Example
///
/// ```no_run
/// use esbw_config::{ConfigDiscovery, Mode};
///
/// let loaded = ConfigDiscovery::new(".").load_resolved(Mode::Serve).unwrap();
/// for warning in &loaded.warnings {
///     eprintln!("{warning}");
/// }
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
    explicit: Option<PathBuf>,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            explicit: None,
        }
    }

    /// Use `path` instead of searching. Relative paths are joined to the root.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the config file.
    ///
    /// Searches in this order:
    /// 1. the explicit path, if one was given
    /// 2. `esbw.toml`, then `esbw.json`
    /// 3. package.json (`esbw` field)
    pub fn find(&self) -> Option<PathBuf> {
        if let Some(explicit) = &self.explicit {
            let path = self.root.join(explicit);
            return path.is_file().then_some(path);
        }

        for name in CONFIG_FILE_NAMES {
            let path = self.root.join(name);
            if path.is_file() {
                return Some(path);
            }
        }

        let pkg_path = self.root.join("package.json");
        let content = fs::read_to_string(&pkg_path).ok()?;
        let parsed: Value = serde_json::from_str(&content).ok()?;
        parsed
            .get("esbw")
            .filter(|v| !v.is_null())
            .map(|_| pkg_path)
    }

    /// Load the config file without validating it.
    pub fn load(&self) -> Result<(PathBuf, EsbwConfig)> {
        let path = self.find().ok_or_else(|| ConfigError::NotFound {
            dir: self.root.clone(),
            candidates: match &self.explicit {
                Some(p) => p.display().to_string(),
                None => format!("{} or package.json#esbw", CONFIG_FILE_NAMES.join(", ")),
            },
        })?;
        let config = load_from(&path)?;
        Ok((path, config))
    }

    /// Load, validate for `mode`, and apply defaults.
    pub fn load_resolved(&self, mode: Mode) -> Result<LoadedConfig> {
        let (path, config) = self.load()?;
        let warnings = validate(&config, mode, &self.root)?;
        tracing::debug!(path = %path.display(), %mode, "loaded config");

        Ok(LoadedConfig {
            path,
            config: apply_defaults(config),
            warnings,
        })
    }
}

/// Load a config from a specific file. The format follows the extension.
pub fn load_from(path: &Path) -> Result<EsbwConfig> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Load {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let load_err = |message: String| ConfigError::Load {
        path: path.to_path_buf(),
        message,
    };

    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => {
            toml::from_str(&content).map_err(|e| load_err(format!("invalid TOML: {e}")))?
        }
        Some("json") if path.file_name().is_some_and(|n| n == "package.json") => {
            let mut parsed: Value = serde_json::from_str(&content)
                .map_err(|e| load_err(format!("invalid JSON: {e}")))?;
            parsed
                .get_mut("esbw")
                .map(Value::take)
                .filter(|v| !v.is_null())
                .ok_or_else(|| load_err("package.json has no \"esbw\" field".into()))?
        }
        Some("json") => {
            serde_json::from_str(&content).map_err(|e| load_err(format!("invalid JSON: {e}")))?
        }
        other => {
            return Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            ));
        }
    };

    if !value.is_object() {
        return Err(load_err("the configuration must be a table/object".into()));
    }

    serde_json::from_value(value).map_err(|e| load_err(e.to_string()))
}
