//! The configuration as written by the user, before defaulting.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::hook::Hook;
use crate::mode::Mode;
use crate::options::BuildOptions;

/// Top-level esbw configuration.
///
/// ```toml
/// [artifactsCommon]
/// bundle = true
/// sourcemap = true
///
/// [artifacts.main]
/// format = "esm"
/// entryPoints = ["src/index.ts"]
/// outfile = "dist/index.js"
///
/// [serveMode]
/// watchPaths = ["src/**/*.{ts,tsx}"]
/// injectArtifacts = ["main"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EsbwConfig {
    /// Least-specific options, spread into every artifact.
    pub artifacts_common: BuildOptions,

    /// Named artifacts. The name is the reference used by mode build lists
    /// and the dev server's inject list.
    pub artifacts: IndexMap<String, BuildOptions>,

    pub build_mode: Option<ModeConfig>,
    pub watch_mode: Option<ModeConfig>,
    pub serve_mode: Option<ModeConfig>,
    pub run_mode: Option<ModeConfig>,
}

/// A mode section. Known keys configure esbw; everything else is an
/// override applied to every artifact built in this mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModeConfig {
    pub before_all: Option<Hook>,
    pub after_all: Option<Hook>,

    /// Artifact names to build. All artifacts when unset.
    pub build: Option<Vec<String>>,

    /// Extra patterns that trigger a rebuild. Ignored in build mode.
    pub watch_paths: Option<Vec<String>>,

    /// Run mode: file to execute after each successful build.
    pub runfile: Option<String>,

    /// Run mode: interpreter used to execute the run-file.
    pub runner: Option<String>,

    /// Serve mode: HTML document served for route requests.
    pub index: Option<PathBuf>,

    /// Serve mode: artifacts whose outputs become `<script>` tags.
    pub inject_artifacts: Option<Vec<String>>,

    /// Serve mode: main HTTP port (0 picks a free port).
    pub port: Option<u16>,

    /// Serve mode: live-reload stream port (0 picks a free port).
    pub reload_port: Option<u16>,

    #[serde(flatten)]
    pub overrides: BuildOptions,
}

impl EsbwConfig {
    /// Build a config from an already-parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::Load {
            path: PathBuf::from("<value>"),
            message: e.to_string(),
        })
    }

    pub fn mode(&self, mode: Mode) -> Option<&ModeConfig> {
        match mode {
            Mode::Build => self.build_mode.as_ref(),
            Mode::Watch => self.watch_mode.as_ref(),
            Mode::Serve => self.serve_mode.as_ref(),
            Mode::Run => self.run_mode.as_ref(),
        }
    }

    pub fn mode_mut(&mut self, mode: Mode) -> &mut Option<ModeConfig> {
        match mode {
            Mode::Build => &mut self.build_mode,
            Mode::Watch => &mut self.watch_mode,
            Mode::Serve => &mut self.serve_mode,
            Mode::Run => &mut self.run_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mode_section_splits_lifecycle_keys_from_overrides() {
        let config = EsbwConfig::from_value(json!({
            "artifacts": { "main": { "entryPoints": ["src/index.ts"] } },
            "serveMode": {
                "beforeAll": "npm run css",
                "injectArtifacts": ["main"],
                "port": 8080,
                "minify": false
            }
        }))
        .unwrap();

        let serve = config.serve_mode.unwrap();
        assert!(serve.before_all.is_some());
        assert_eq!(serve.inject_artifacts, Some(vec!["main".to_string()]));
        assert_eq!(serve.port, Some(8080));
        assert_eq!(serve.overrides.keys().collect::<Vec<_>>(), vec!["minify"]);
    }

    #[test]
    fn artifacts_keep_declaration_order() {
        let config = EsbwConfig::from_value(json!({
            "artifacts": { "zeta": {}, "alpha": {}, "mid": {} }
        }))
        .unwrap();
        let names: Vec<_> = config.artifacts.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn rejects_ill_typed_port() {
        let err = EsbwConfig::from_value(json!({ "serveMode": { "port": "eighty" } }));
        assert!(matches!(err, Err(ConfigError::Load { .. })));
    }
}
