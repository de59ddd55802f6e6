//! Common types for the compilation pipeline.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::paths::ToolchainHome;
use crate::version::{MIN_SUPPORTED_VERSION, SolcVersion, default_ttl};

/// Outputs requested from `solc --combined-json`.
pub const DEFAULT_OUTPUT_VALUES: &[&str] = &["abi", "ast", "bin-runtime", "srcmap-runtime"];

/// Libraries under `node_modules` that get an import remapping.
pub const DEFAULT_REMAP_WHITELIST: &[&str] = &["zeppelin-solidity", "openzeppelin-solidity"];

/// Configuration for a build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Where compilers and the catalog are stored
    pub home: ToolchainHome,

    /// Compile with this version instead of resolving pragmas
    pub solc_version: Option<SolcVersion>,

    /// How long a fetched release list stays fresh
    pub catalog_ttl: TimeDelta,

    /// Versions below this are never selected or installed
    pub min_version: SolcVersion,

    /// `node_modules` packages to remap
    pub remap_whitelist: Vec<String>,

    /// Value passed to `--combined-json`
    pub output_values: Vec<String>,

    /// Only use compilers that are already installed
    pub offline: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            home: ToolchainHome::discover(),
            solc_version: None,
            catalog_ttl: default_ttl(),
            min_version: MIN_SUPPORTED_VERSION,
            remap_whitelist: DEFAULT_REMAP_WHITELIST.iter().map(|s| s.to_string()).collect(),
            output_values: DEFAULT_OUTPUT_VALUES.iter().map(|s| s.to_string()).collect(),
            offline: false,
        }
    }
}

impl BuildConfig {
    /// Config using a specific home directory.
    pub fn with_home(home: ToolchainHome) -> Self {
        Self {
            home,
            ..Self::default()
        }
    }

    /// Pin the compiler version.
    pub fn solc_version(mut self, version: Option<SolcVersion>) -> Self {
        self.solc_version = version;
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}

/// Compiled output of one contract, in the schema the analyzer reads.
///
/// Bytecode is hex without a `0x` prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    pub abi: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast: Option<serde_json::Value>,

    /// Deployment bytecode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,

    /// Runtime bytecode
    #[serde(rename = "bin-runtime")]
    pub bin_runtime: String,

    /// Source map of the deployment bytecode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcmap: Option<String>,

    /// Source map of the runtime bytecode
    #[serde(rename = "srcmap-runtime")]
    pub srcmap_runtime: String,
}

/// All artifacts of a build, keyed by `"<source path>:<contract name>"`.
pub type ArtifactCollection = BTreeMap<String, CompiledArtifact>;

/// Key of a contract in an [`ArtifactCollection`].
pub fn artifact_key(source_path: &str, contract_name: &str) -> String {
    format!("{source_path}:{contract_name}")
}

/// Remove the `0x` marker from a hex string, if present.
pub fn strip_hex_prefix(hex: &str) -> &str {
    hex.strip_prefix("0x").unwrap_or(hex)
}

/// Render a collection as pretty-printed JSON.
pub fn collection_to_json(collection: &ArtifactCollection) -> Result<String> {
    Ok(serde_json::to_string_pretty(collection)?)
}

/// Write a collection as pretty-printed JSON to `path`.
pub fn write_collection(collection: &ArtifactCollection, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, collection_to_json(collection)?)?;
    tracing::info!("Wrote {} artifact(s) to {}", collection.len(), path.display());
    Ok(())
}
