//! Truffle build support.
//!
//! `truffle compile` writes one JSON file per contract into
//! `build/contracts/`. These are merged into a single [`ArtifactCollection`]
//! with the same field names and encoding as `solc --combined-json` output.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

use super::types::{ArtifactCollection, CompiledArtifact, artifact_key, strip_hex_prefix};

/// Build directory of a truffle project, relative to its root.
pub const TRUFFLE_BUILD_DIR: &str = "build/contracts";

/// Truffle's bookkeeping contract, never analyzed.
pub const MIGRATIONS_ARTIFACT: &str = "Migrations.json";

/// Fields of a truffle artifact file that solbuild reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TruffleArtifact {
    contract_name: String,
    source_path: String,
    #[serde(default)]
    abi: Value,
    #[serde(default)]
    ast: Option<Value>,
    bytecode: String,
    deployed_bytecode: String,
    #[serde(default)]
    source_map: String,
    #[serde(default)]
    deployed_source_map: String,
}

/// Path used in the artifact key for `source_path`.
///
/// Sources inside the project keep their declared path. Anything else is
/// assumed to be a library and looked up under `dependency_dir`.
fn locate_source(
    project_root: &Path,
    source_path: &str,
    dependency_dir: Option<&Path>,
) -> Option<String> {
    if project_root.join(source_path).is_file() {
        return Some(source_path.to_string());
    }

    let rerooted = dependency_dir?.join(source_path.trim_start_matches('/'));
    rerooted
        .is_file()
        .then(|| rerooted.to_string_lossy().into_owned())
}

/// Artifact files in `build_dir`, sorted by name.
fn artifact_files(build_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(build_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        if entry.file_name() == MIGRATIONS_ARTIFACT {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Merge the per-contract artifacts in `build_dir` into one collection.
///
/// Both bytecodes lose their `0x` prefix and the four code fields are
/// renamed to `bin`, `bin-runtime`, `srcmap` and `srcmap-runtime`. If two
/// files produce the same key the later one (by file name) wins.
pub fn merge_build_dir(
    project_root: &Path,
    build_dir: &Path,
    dependency_dir: Option<&Path>,
) -> Result<ArtifactCollection> {
    let mut collection = ArtifactCollection::new();

    for path in artifact_files(build_dir)? {
        let content = fs::read_to_string(&path)?;
        let artifact: TruffleArtifact = serde_json::from_str(&content)?;

        let source = locate_source(project_root, &artifact.source_path, dependency_dir)
            .ok_or_else(|| Error::MissingArtifactSource {
                contract: artifact.contract_name.clone(),
                source_path: artifact.source_path.clone(),
            })?;

        let key = artifact_key(&source, &artifact.contract_name);
        let compiled = CompiledArtifact {
            abi: artifact.abi,
            ast: artifact.ast,
            bin: Some(strip_hex_prefix(&artifact.bytecode).to_string()),
            bin_runtime: strip_hex_prefix(&artifact.deployed_bytecode).to_string(),
            srcmap: Some(artifact.source_map),
            srcmap_runtime: artifact.deployed_source_map,
        };

        if collection.insert(key.clone(), compiled).is_some() {
            tracing::warn!("Duplicate artifact {key} from {}", path.display());
        }
    }

    tracing::info!("Merged {} truffle artifact(s) from {}", collection.len(), build_dir.display());
    Ok(collection)
}

/// Run `truffle compile` in `project_root`.
pub fn run_truffle_compile(project_root: &Path) -> Result<()> {
    let truffle = which::which("truffle").map_err(|_| Error::BuildToolFailed {
        tool: "truffle".to_string(),
        diagnostics: "truffle not found in PATH".to_string(),
    })?;

    tracing::info!("Running truffle compile in {}", project_root.display());

    let output = Command::new(&truffle)
        .arg("compile")
        .current_dir(project_root)
        .output()
        .map_err(|e| Error::BuildToolFailed {
            tool: "truffle".to_string(),
            diagnostics: format!("Failed to run {}: {}", truffle.display(), e),
        })?;

    if !output.status.success() {
        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(Error::BuildToolFailed {
            tool: "truffle".to_string(),
            diagnostics: diagnostics.trim_end().to_string(),
        });
    }

    Ok(())
}
