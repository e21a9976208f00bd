//! Tests for loading config files from disk.

use std::fs;
use std::path::PathBuf;

use esbw_config::{ConfigDiscovery, ConfigError, ConfigWarning, Hook, Mode};
use serde_json::json;
use tempfile::TempDir;

const TOML_CONFIG: &str = r#"
[artifactsCommon]
bundle = true
platform = "browser"
sourcemap = true

[artifacts.main]
format = "esm"
entryPoints = ["src/index.ts"]
outfile = "dist/index.js"

[artifacts.mainCJS]
format = "cjs"
entryPoints = ["src/index.ts"]
outfile = "dist/index.cjs.js"

[serveMode]
watchPaths = ["src/**/*.{ts,tsx}"]
injectArtifacts = ["main"]
beforeAll = "npm run css"
reloadPort = 35729

[buildMode]
minify = true
"#;

#[test]
fn loads_and_resolves_toml_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("esbw.toml"), TOML_CONFIG).unwrap();

    let loaded = ConfigDiscovery::new(dir.path())
        .load_resolved(Mode::Serve)
        .unwrap();
    let config = loaded.config;

    assert_eq!(loaded.path, dir.path().join("esbw.toml"));
    assert_eq!(
        config.artifact_names().collect::<Vec<_>>(),
        vec!["main", "mainCJS"]
    );
    assert_eq!(config.serve.inject_artifacts, vec!["main"]);
    assert_eq!(config.serve.reload_port, 35729);
    assert!(matches!(config.serve_mode.before_all, Some(Hook::Command(ref c)) if c == "npm run css"));
    assert_eq!(config.build_mode.overrides.get("minify"), Some(&json!(true)));
    assert_eq!(config.serve_mode.watch_paths, vec!["src/**/*.{ts,tsx}"]);
    assert_eq!(config.serve.index, PathBuf::from("public/index.html"));
}

#[test]
fn loads_json_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("esbw.json"),
        r#"{ "artifacts": { "app": { "format": "iife", "entryPoints": ["app.js"], "outfile": "out.js" } } }"#,
    )
    .unwrap();

    let loaded = ConfigDiscovery::new(dir.path()).load_resolved(Mode::Build).unwrap();
    assert_eq!(loaded.config.build_mode.build, vec!["app"]);
    assert!(loaded.warnings.is_empty());
}

#[test]
fn loads_package_json_field() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{ "name": "demo", "esbw": { "artifactsCommon": { "format": "esm" }, "artifacts": { "main": {} } } }"#,
    )
    .unwrap();

    let loaded = ConfigDiscovery::new(dir.path()).load_resolved(Mode::Watch).unwrap();
    assert_eq!(loaded.path, dir.path().join("package.json"));
    assert_eq!(loaded.config.watch_mode.build, vec!["main"]);
}

#[test]
fn explicit_path_overrides_search() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("conf")).unwrap();
    fs::write(dir.path().join("conf/dev.toml"), TOML_CONFIG).unwrap();

    let discovery = ConfigDiscovery::new(dir.path()).with_path("conf/dev.toml");
    assert_eq!(discovery.find().unwrap(), dir.path().join("conf/dev.toml"));

    let missing = ConfigDiscovery::new(dir.path()).with_path("nope.toml");
    assert!(matches!(missing.load(), Err(ConfigError::NotFound { .. })));
}

#[test]
fn syntax_errors_are_load_errors() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("esbw.toml"), "[artifacts.main\nformat = ").unwrap();

    let err = ConfigDiscovery::new(dir.path()).load().unwrap_err();
    assert!(matches!(err, ConfigError::Load { .. }));
}

#[test]
fn unknown_build_reference_is_fatal() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("esbw.toml"),
        r#"
[artifacts.main]
format = "esm"

[runMode]
build = ["server"]
"#,
    )
    .unwrap();

    let err = ConfigDiscovery::new(dir.path())
        .load_resolved(Mode::Build)
        .unwrap_err();
    match err {
        ConfigError::UnknownArtifact { field, name } => {
            assert_eq!(field, "runMode.build");
            assert_eq!(name, "server");
        }
        other => panic!("expected UnknownArtifact, got {other:?}"),
    }
}

#[test]
fn serve_inject_requires_outfile() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("esbw.toml"),
        r#"
[artifacts.pages]
format = "esm"
entryPoints = ["src/pages/*.ts"]
outdir = "dist"

[serveMode]
injectArtifacts = ["pages"]
"#,
    )
    .unwrap();

    let discovery = ConfigDiscovery::new(dir.path());
    assert!(discovery.load_resolved(Mode::Build).is_ok());
    assert!(matches!(
        discovery.load_resolved(Mode::Serve),
        Err(ConfigError::MissingOutfile { ref artifact }) if artifact == "pages"
    ));
}

#[test]
fn serve_mode_warns_about_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("esbw.toml"),
        r#"
[artifacts.main]
format = "esm"
outfile = "dist/main.js"

[serveMode]
index = "public/custom.html"
"#,
    )
    .unwrap();

    let loaded = ConfigDiscovery::new(dir.path()).load_resolved(Mode::Serve).unwrap();
    assert_eq!(
        loaded.warnings,
        vec![
            ConfigWarning::IndexNotFound(PathBuf::from("public/custom.html")),
            ConfigWarning::EmptyInjectList,
        ]
    );
    assert_eq!(loaded.config.serve.index, PathBuf::from("public/custom.html"));
}
