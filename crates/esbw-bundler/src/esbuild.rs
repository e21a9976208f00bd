//! Driving the `esbuild` command-line binary.
//!
//! Build options are the JavaScript API's option object. They are translated
//! to flags following esbuild's CLI conventions:
//!
//! | option value            | flag                          |
//! |-------------------------|-------------------------------|
//! | `minify: true`          | `--minify`                    |
//! | `minify: false`         | `--minify=false`              |
//! | `banner: null`          | omitted                       |
//! | `format: "esm"`         | `--format=esm`                |
//! | `external: ["a", "b"]`  | `--external:a --external:b`   |
//! | `target: ["es2020"]`    | `--target=es2020` (joined)    |
//! | `define: { K: "v" }`    | `--define:K=v`                |
//!
//! Entry points are passed positionally.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use esbw_config::{BuildOptions, ResolvedArtifact};
use serde_json::Value;
use tokio::process::Command;

use crate::error::{BuildError, Result};
use crate::output::BuildOutput;
use crate::Bundler;

/// Environment variable naming the esbuild executable.
pub const ESBUILD_ENV: &str = "ESBW_ESBUILD";

/// Options that have no command-line form.
const SKIPPED_KEYS: &[&str] = &["plugins", "watch", "write", "stdin", "absWorkingDir"];

/// Options whose array values are comma-joined instead of repeated.
const JOINED_KEYS: &[&str] = &["target", "resolveExtensions", "mainFields", "conditions"];

/// Options the driver sets itself.
const MANAGED_KEYS: &[&str] = &["entryPoints", "metafile"];

/// Bundler that shells out to esbuild.
#[derive(Debug, Clone)]
pub struct EsbuildCli {
    program: PathBuf,
    cwd: PathBuf,
}

impl EsbuildCli {
    /// Driver running in `cwd`. The executable comes from [`ESBUILD_ENV`]
    /// when set, otherwise `esbuild` on `PATH`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        let program = std::env::var_os(ESBUILD_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("esbuild"));
        Self {
            program,
            cwd: cwd.into(),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Full argument list for `artifact`, without the metafile flag.
    pub fn args(&self, artifact: &ResolvedArtifact) -> Vec<String> {
        let mut args = artifact.entry_points.clone();
        args.extend(translate_options(&artifact.options));
        if !artifact.options.contains_key("logLevel") {
            args.push("--log-level=warning".to_string());
        }
        args
    }
}

#[async_trait]
impl Bundler for EsbuildCli {
    async fn compile(&self, artifact: &ResolvedArtifact) -> Result<BuildOutput> {
        // esbuild reads stdin when given no entry points
        if artifact.entry_points.is_empty() {
            return Err(BuildError::NoEntryPoints {
                artifact: artifact.name.clone(),
            });
        }

        let metafile = tempfile::Builder::new()
            .prefix("esbw-meta-")
            .suffix(".json")
            .tempfile()?;

        let mut command = Command::new(&self.program);
        command
            .args(self.args(artifact))
            .arg(format!("--metafile={}", metafile.path().display()))
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(artifact = %artifact.name, program = %self.program.display(), "running esbuild");

        let output = command.output().await.map_err(|source| BuildError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(BuildError::Failed {
                artifact: artifact.name.clone(),
                diagnostics: stderr.trim_end().to_string(),
            });
        }
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            tracing::warn!(artifact = %artifact.name, "{line}");
        }

        let bytes = tokio::fs::read(metafile.path()).await?;
        BuildOutput::from_metafile(&bytes).map_err(|e| BuildError::Metafile {
            artifact: artifact.name.clone(),
            message: e.to_string(),
        })
    }
}

/// Translate build options to esbuild flags. Entry points and the metafile
/// are not included.
pub fn translate_options(options: &BuildOptions) -> Vec<String> {
    let mut args = Vec::new();

    for (key, value) in options.iter() {
        let key = key.as_str();
        if MANAGED_KEYS.contains(&key) {
            continue;
        }
        if SKIPPED_KEYS.contains(&key) {
            tracing::debug!(option = key, "option has no esbuild flag, skipping");
            continue;
        }

        let flag = kebab_case(key);
        match value {
            Value::Null => {}
            Value::Bool(true) => args.push(format!("--{flag}")),
            Value::Bool(false) => args.push(format!("--{flag}=false")),
            Value::String(_) | Value::Number(_) => {
                args.push(format!("--{flag}={}", scalar(value)));
            }
            Value::Array(items) if JOINED_KEYS.contains(&key) => {
                let joined: Vec<String> = items.iter().map(scalar).collect();
                args.push(format!("--{flag}={}", joined.join(",")));
            }
            Value::Array(items) => {
                args.extend(items.iter().map(|item| format!("--{flag}:{}", scalar(item))));
            }
            Value::Object(entries) => {
                args.extend(
                    entries
                        .iter()
                        .map(|(k, v)| format!("--{flag}:{k}={}", scalar(v))),
                );
            }
        }
    }

    args
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `resolveExtensions` -> `resolve-extensions`.
fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> BuildOptions {
        BuildOptions::from_value(value).unwrap()
    }

    #[test]
    fn kebab_cases_option_names() {
        assert_eq!(kebab_case("outExtension"), "out-extension");
        assert_eq!(kebab_case("jsxImportSource"), "jsx-import-source");
        assert_eq!(kebab_case("bundle"), "bundle");
    }

    #[test]
    fn translates_scalars_and_booleans() {
        let args = translate_options(&options(json!({
            "bundle": true,
            "minify": false,
            "sourcemap": "inline",
            "format": "esm",
            "logLimit": 5,
            "banner": null
        })));
        assert_eq!(
            args,
            vec![
                "--bundle",
                "--minify=false",
                "--sourcemap=inline",
                "--format=esm",
                "--log-limit=5",
            ]
        );
    }

    #[test]
    fn false_turns_off_flags_that_default_on() {
        let args = translate_options(&options(json!({
            "bundle": true,
            "treeShaking": false
        })));
        assert_eq!(args, vec!["--bundle", "--tree-shaking=false"]);
    }

    #[test]
    fn translates_lists_and_maps() {
        let args = translate_options(&options(json!({
            "external": ["react", "react-dom"],
            "target": ["es2020", "chrome90"],
            "define": { "process.env.NODE_ENV": "\"production\"" },
            "loader": { ".png": "file" }
        })));
        assert_eq!(
            args,
            vec![
                "--external:react",
                "--external:react-dom",
                "--target=es2020,chrome90",
                "--define:process.env.NODE_ENV=\"production\"",
                "--loader:.png=file",
            ]
        );
    }

    #[test]
    fn skips_managed_and_unrepresentable_options() {
        let args = translate_options(&options(json!({
            "entryPoints": ["src/index.ts"],
            "metafile": true,
            "plugins": [],
            "watch": true,
            "outfile": "dist/index.js"
        })));
        assert_eq!(args, vec!["--outfile=dist/index.js"]);
    }

    #[test]
    fn entry_points_lead_the_argument_list() {
        let artifact = ResolvedArtifact {
            name: "main".into(),
            options: options(json!({ "bundle": true, "entryPoints": ["src/a.ts", "src/b.ts"] })),
            entry_points: vec!["src/a.ts".into(), "src/b.ts".into()],
        };
        let args = EsbuildCli::new(".").with_program("esbuild").args(&artifact);
        assert_eq!(
            args,
            vec!["src/a.ts", "src/b.ts", "--bundle", "--log-level=warning"]
        );
    }

    #[test]
    fn explicit_log_level_is_kept() {
        let artifact = ResolvedArtifact {
            name: "main".into(),
            options: options(json!({ "logLevel": "silent" })),
            entry_points: vec![],
        };
        let args = EsbuildCli::new(".").args(&artifact);
        assert_eq!(args, vec!["--log-level=silent"]);
    }
}
