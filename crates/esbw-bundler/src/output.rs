//! Build results.

use indexmap::IndexMap;
use serde::Deserialize;

/// Files written by one compile, with their sizes in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub outputs: IndexMap<String, u64>,
}

impl BuildOutput {
    pub fn new(outputs: impl IntoIterator<Item = (String, u64)>) -> Self {
        Self {
            outputs: outputs.into_iter().collect(),
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.outputs.values().sum()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.outputs.iter().map(|(path, bytes)| (path.as_str(), *bytes))
    }

    /// Parse the `outputs` section of an esbuild metafile.
    pub fn from_metafile(json: &[u8]) -> Result<Self, serde_json::Error> {
        let meta: Metafile = serde_json::from_slice(json)?;
        Ok(Self {
            outputs: meta
                .outputs
                .into_iter()
                .map(|(path, out)| (path, out.bytes))
                .collect(),
        })
    }
}

#[derive(Deserialize)]
struct Metafile {
    #[serde(default)]
    outputs: IndexMap<String, MetafileOutput>,
}

#[derive(Deserialize)]
struct MetafileOutput {
    bytes: u64,
}
