//! Bundler options as an opaque, ordered JSON object.
//!
//! esbw never interprets most option keys; they are passed through to the
//! build capability as-is. A handful of keys (`entryPoints`, `outfile`,
//! `outdir`, `format`) are read through typed accessors because resolution
//! and the dev server depend on them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys that configure esbw itself. They are removed before options reach
/// the bundler.
pub const LIFECYCLE_KEYS: &[&str] = &[
    "beforeAll",
    "afterAll",
    "build",
    "runfile",
    "runner",
    "watchPaths",
    "index",
    "injectArtifacts",
    "port",
    "reloadPort",
];

/// Bundle output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Esm,
    Cjs,
    Iife,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Esm, Format::Cjs, Format::Iife];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Esm => "esm",
            Format::Cjs => "cjs",
            Format::Iife => "iife",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown format '{s}'"))
    }
}

/// An ordered map of bundler options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildOptions(Map<String, Value>);

impl BuildOptions {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build from a JSON value. Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Shallow merge: every key of `other` overwrites the same key here.
    pub fn merge_from(&mut self, other: &BuildOptions) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Remove every key in [`LIFECYCLE_KEYS`].
    pub fn strip_lifecycle_keys(&mut self) {
        for key in LIFECYCLE_KEYS {
            self.0.shift_remove(*key);
        }
    }

    /// Entry point patterns, accepting either a single string or an array.
    pub fn entry_points(&self) -> Vec<String> {
        match self.0.get("entryPoints") {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_entry_points(&mut self, entries: &[String]) {
        self.0.insert(
            "entryPoints".into(),
            Value::Array(entries.iter().cloned().map(Value::String).collect()),
        );
    }

    pub fn outfile(&self) -> Option<&str> {
        self.str_value("outfile")
    }

    pub fn outdir(&self) -> Option<&str> {
        self.str_value("outdir")
    }

    /// The declared format, if it is one esbw recognises.
    pub fn format(&self) -> Option<Format> {
        self.str_value("format").and_then(|s| s.parse().ok())
    }

    fn str_value(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl From<Map<String, Value>> for BuildOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for BuildOptions {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts(value: Value) -> BuildOptions {
        BuildOptions::from_value(value).unwrap()
    }

    #[test]
    fn entry_points_accepts_string_or_array() {
        assert_eq!(
            opts(json!({"entryPoints": "src/a.ts"})).entry_points(),
            vec!["src/a.ts"]
        );
        assert_eq!(
            opts(json!({"entryPoints": ["src/a.ts", "src/b.ts"]})).entry_points(),
            vec!["src/a.ts", "src/b.ts"]
        );
        assert!(BuildOptions::new().entry_points().is_empty());
    }

    #[test]
    fn merge_overwrites_existing_keys() {
        let mut base = opts(json!({"sourcemap": true, "bundle": true}));
        base.merge_from(&opts(json!({"sourcemap": "inline"})));
        assert_eq!(base.get("sourcemap"), Some(&json!("inline")));
        assert_eq!(base.get("bundle"), Some(&json!(true)));
    }

    #[test]
    fn strip_removes_every_lifecycle_key() {
        let mut o = BuildOptions::new();
        for key in LIFECYCLE_KEYS {
            o.insert(*key, json!(1));
        }
        o.insert("minify", json!(true));
        o.strip_lifecycle_keys();
        assert_eq!(o.keys().collect::<Vec<_>>(), vec!["minify"]);
    }

    #[test]
    fn format_ignores_unknown_values() {
        assert_eq!(opts(json!({"format": "esm"})).format(), Some(Format::Esm));
        assert_eq!(opts(json!({"format": "umd"})).format(), None);
        assert_eq!(opts(json!({"format": 3})).format(), None);
    }

    #[test]
    fn empty_outfile_counts_as_unset() {
        assert_eq!(opts(json!({"outfile": ""})).outfile(), None);
        assert_eq!(opts(json!({"outdir": "dist"})).outdir(), Some("dist"));
    }
}
