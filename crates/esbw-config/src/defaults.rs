//! Defaulting: turns a user config into a [`ResolvedConfig`] with no gaps.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::config::{EsbwConfig, ModeConfig};
use crate::hook::Hook;
use crate::mode::Mode;
use crate::options::BuildOptions;

/// Index document served when `serveMode.index` is unset.
pub const DEFAULT_INDEX: &str = "public/index.html";

/// Interpreter used for the run-file when `runMode.runner` is unset.
pub const DEFAULT_RUNNER: &str = "node";

/// A mode section after defaulting.
#[derive(Debug, Clone, Default)]
pub struct ResolvedMode {
    pub before_all: Option<Hook>,
    pub after_all: Option<Hook>,
    /// Artifact names built in this mode, never empty unless the config
    /// declares no artifacts at all.
    pub build: Vec<String>,
    pub watch_paths: Vec<String>,
    pub overrides: BuildOptions,
}

/// Dev server settings extracted from `serveMode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeSettings {
    pub index: PathBuf,
    pub inject_artifacts: Vec<String>,
    pub port: u16,
    pub reload_port: u16,
}

/// Process supervisor settings extracted from `runMode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub runfile: Option<String>,
    pub runner: String,
}

/// The configuration after validation and defaulting. Immutable for the
/// lifetime of a process invocation.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub artifacts_common: BuildOptions,
    pub artifacts: IndexMap<String, BuildOptions>,
    pub build_mode: ResolvedMode,
    pub watch_mode: ResolvedMode,
    pub serve_mode: ResolvedMode,
    pub run_mode: ResolvedMode,
    pub serve: ServeSettings,
    pub run: RunSettings,
}

impl ResolvedConfig {
    pub fn mode(&self, mode: Mode) -> &ResolvedMode {
        match mode {
            Mode::Build => &self.build_mode,
            Mode::Watch => &self.watch_mode,
            Mode::Serve => &self.serve_mode,
            Mode::Run => &self.run_mode,
        }
    }

    pub fn artifact(&self, name: &str) -> Option<&BuildOptions> {
        self.artifacts.get(name)
    }

    pub fn artifact_names(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }

    /// Whether `name` is built in `mode`.
    pub fn is_selected(&self, name: &str, mode: Mode) -> bool {
        self.mode(mode).build.iter().any(|n| n == name)
    }
}

impl EsbwConfig {
    pub fn resolve(self) -> ResolvedConfig {
        apply_defaults(self)
    }
}

/// Fill every gap in `config`. Never fails.
///
/// Empty build and inject lists are treated the same as missing ones.
pub fn apply_defaults(mut config: EsbwConfig) -> ResolvedConfig {
    let all: Vec<String> = config.artifacts.keys().cloned().collect();

    let serve_section = config.serve_mode.clone().unwrap_or_default();
    let run_section = config.run_mode.clone().unwrap_or_default();

    let serve = ServeSettings {
        index: serve_section
            .index
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX)),
        inject_artifacts: non_empty_or(serve_section.inject_artifacts.clone(), &all),
        port: serve_section.port.unwrap_or(0),
        reload_port: serve_section.reload_port.unwrap_or(0),
    };

    let run = RunSettings {
        runfile: run_section.runfile.clone().filter(|s| !s.is_empty()),
        runner: run_section
            .runner
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_RUNNER.to_string()),
    };

    let mut resolve_mode = |mode: Mode| {
        let section = config.mode_mut(mode).take().unwrap_or_default();
        resolve_section(section, &all)
    };

    let build_mode = resolve_mode(Mode::Build);
    let watch_mode = resolve_mode(Mode::Watch);
    let serve_mode = resolve_mode(Mode::Serve);
    let run_mode = resolve_mode(Mode::Run);

    ResolvedConfig {
        artifacts_common: config.artifacts_common,
        artifacts: config.artifacts,
        build_mode,
        watch_mode,
        serve_mode,
        run_mode,
        serve,
        run,
    }
}

fn resolve_section(section: ModeConfig, all: &[String]) -> ResolvedMode {
    let mut overrides = section.overrides;
    overrides.strip_lifecycle_keys();

    ResolvedMode {
        before_all: section.before_all,
        after_all: section.after_all,
        build: non_empty_or(section.build, all),
        watch_paths: section.watch_paths.unwrap_or_default(),
        overrides,
    }
}

fn non_empty_or(list: Option<Vec<String>>, fallback: &[String]) -> Vec<String> {
    match list {
        Some(list) if !list.is_empty() => list,
        _ => fallback.to_vec(),
    }
}
