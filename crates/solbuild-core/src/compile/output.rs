//! Decoding of `solc --combined-json` output.
//!
//! The compiler prints one JSON document:
//!
//! ```text
//! {
//!   "contracts": {
//!     "<path>:<Name>": { "abi": ..., "bin-runtime": "...", "srcmap-runtime": "..." }
//!   },
//!   "sources":   { "<path>": { "AST": {...} } },
//!   "version":   "0.4.24+commit.e67f0147.Linux.g++"
//! }
//! ```
//!
//! It is decoded into [`CombinedOutput`] first, so a document with missing or
//! mistyped fields is rejected with a decode error instead of producing
//! half-filled artifacts.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::types::{ArtifactCollection, CompiledArtifact, strip_hex_prefix};

/// Top-level combined-json document.
#[derive(Debug, Deserialize)]
pub struct CombinedOutput {
    #[serde(default)]
    pub contracts: BTreeMap<String, RawContract>,

    #[serde(default)]
    pub sources: BTreeMap<String, RawSource>,

    #[serde(default)]
    pub version: Option<String>,
}

/// Per-contract entry of the `contracts` map.
#[derive(Debug, Deserialize)]
pub struct RawContract {
    /// A JSON-encoded string on older compilers, an array on newer ones.
    pub abi: Value,

    #[serde(default)]
    pub bin: Option<String>,

    #[serde(rename = "bin-runtime")]
    pub bin_runtime: String,

    #[serde(default)]
    pub srcmap: Option<String>,

    #[serde(rename = "srcmap-runtime")]
    pub srcmap_runtime: String,
}

/// Per-source entry of the `sources` map.
#[derive(Debug, Deserialize)]
pub struct RawSource {
    #[serde(rename = "AST", default)]
    pub ast: Option<Value>,
}

impl CombinedOutput {
    /// Decode compiler stdout.
    pub fn from_json(stdout: &str) -> Result<Self, String> {
        serde_json::from_str(stdout).map_err(|e| format!("unreadable compiler output: {e}"))
    }

    /// Convert into artifacts, attaching each source's AST to its contracts.
    pub fn into_artifacts(self) -> Result<ArtifactCollection, String> {
        let Self {
            contracts, sources, ..
        } = self;

        let mut artifacts = ArtifactCollection::new();
        for (key, contract) in contracts {
            let source_path = key.rsplit_once(':').map_or(key.as_str(), |(path, _)| path);
            let ast = sources.get(source_path).and_then(|s| s.ast.clone());

            let abi = match contract.abi {
                Value::String(encoded) => serde_json::from_str(&encoded)
                    .map_err(|e| format!("invalid ABI for {key}: {e}"))?,
                other => other,
            };

            let artifact = CompiledArtifact {
                abi,
                ast,
                bin: contract.bin.map(|b| strip_hex_prefix(&b).to_string()),
                bin_runtime: strip_hex_prefix(&contract.bin_runtime).to_string(),
                srcmap: contract.srcmap,
                srcmap_runtime: contract.srcmap_runtime,
            };
            artifacts.insert(key, artifact);
        }

        Ok(artifacts)
    }
}
