//! Starter files written by `esbw generate`.

use crate::cli::{Lang, Platform};

/// Starter `esbw.toml` with an ESM, a CommonJS and an IIFE artifact.
pub fn config_toml(platform: Platform, lang: Lang) -> String {
    let ext = lang.extension();
    let watch = lang.watch_extensions();
    let mut toml = format!(
        r#"[artifactsCommon]
bundle = true
platform = "{platform}"
sourcemap = true

[artifacts.main]
format = "esm"
entryPoints = ["src/index.{ext}"]
outfile = "dist/index.js"

[artifacts.mainCJS]
format = "cjs"
entryPoints = ["src/index.{ext}"]
outfile = "dist/index.cjs.js"

[artifacts.mainIIFE]
format = "iife"
entryPoints = ["src/index.{ext}"]
outfile = "dist/index.iife.js"

[buildMode]
minify = true

[watchMode]
watchPaths = ["src/**/*.{{{watch}}}"]
"#,
        platform = platform.as_str(),
    );

    match platform {
        Platform::Browser => toml.push_str(&format!(
            r#"
[serveMode]
index = "public/index.html"
watchPaths = ["src/**/*.{{{watch}}}", "public/index.html"]
injectArtifacts = ["main"]
"#
        )),
        Platform::Node => toml.push_str(&format!(
            r#"
[runMode]
build = ["main"]
watchPaths = ["src/**/*.{{{watch}}}"]
runfile = "dist/index.js"
"#
        )),
    }
    toml
}

/// Index document for browser projects. The dev server injects the scripts.
pub fn index_html(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{name}</title>
</head>
<body>
  <div id="app"></div>
</body>
</html>
"#
    )
}

pub fn source_file(platform: Platform, lang: Lang) -> &'static str {
    match (platform, lang) {
        (Platform::Browser, Lang::Ts) => {
            r#"const app = document.getElementById('app');

if (app) {
  app.textContent = 'Hello from esbw';
}

export {};
"#
        }
        (Platform::Browser, Lang::Js) => {
            r#"const app = document.getElementById('app');

if (app) {
  app.textContent = 'Hello from esbw';
}
"#
        }
        (Platform::Node, Lang::Ts) => {
            r#"export function greet(name: string): string {
  return `Hello, ${name}!`;
}

console.log(greet('esbw'));
"#
        }
        (Platform::Node, Lang::Js) => {
            r#"export function greet(name) {
  return `Hello, ${name}!`;
}

console.log(greet('esbw'));
"#
        }
    }
}
