//! Integration tests for merging truffle build artifacts.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use solbuild_core::compile::{
    collection_to_json, find_dependency_dir, merge_build_dir, write_collection,
};
use solbuild_core::{Error, Project, TruffleProject};
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "pragma solidity ^0.4.24;\n").unwrap();
}

fn write_artifact(project: &TruffleProject, file: &str, artifact: Value) {
    fs::create_dir_all(project.build_dir()).unwrap();
    fs::write(
        project.build_dir().join(file),
        serde_json::to_string_pretty(&artifact).unwrap(),
    )
    .unwrap();
}

fn artifact(name: &str, source_path: &str, bytecode: &str) -> Value {
    json!({
        "contractName": name,
        "sourcePath": source_path,
        "abi": [{ "type": "constructor", "inputs": [] }],
        "ast": { "nodeType": "SourceUnit", "absolutePath": source_path },
        "bytecode": format!("0x{bytecode}"),
        "deployedBytecode": format!("0x{bytecode}00"),
        "sourceMap": "0:100:0:-;;",
        "deployedSourceMap": "0:100:0:-;;;",
        "compiler": { "name": "solc", "version": "0.4.24+commit.e67f0147.Emscripten.clang" },
        "networks": {},
        "updatedAt": "2018-11-02T10:00:00.000Z"
    })
}

/// Project with one local contract, one library, and Migrations.
fn sample_project(temp: &TempDir) -> TruffleProject {
    let root = temp.path();
    touch(root, "contracts/Crowdsale.sol");
    touch(root, "contracts/Migrations.sol");
    touch(root, "node_modules/openzeppelin-solidity/contracts/math/SafeMath.sol");

    let project = TruffleProject::new(root).skip_build();
    write_artifact(
        &project,
        "Crowdsale.json",
        artifact("Crowdsale", "contracts/Crowdsale.sol", "6080"),
    );
    write_artifact(
        &project,
        "SafeMath.json",
        artifact("SafeMath", "/openzeppelin-solidity/contracts/math/SafeMath.sol", "6060"),
    );
    write_artifact(
        &project,
        "Migrations.json",
        artifact("Migrations", "contracts/Migrations.sol", "60ff"),
    );
    project
}

// =============================================================================
// Merging
// =============================================================================

#[test]
fn test_merge_renames_fields_and_strips_prefixes() {
    let temp = TempDir::new().unwrap();
    let project = sample_project(&temp);

    let merged = project.compile().unwrap();
    assert_eq!(merged.len(), 2);

    let crowdsale = &merged["contracts/Crowdsale.sol:Crowdsale"];
    assert_eq!(crowdsale.bin.as_deref(), Some("6080"));
    assert_eq!(crowdsale.bin_runtime, "608000");
    assert_eq!(crowdsale.srcmap.as_deref(), Some("0:100:0:-;;"));
    assert_eq!(crowdsale.srcmap_runtime, "0:100:0:-;;;");
    assert_eq!(crowdsale.abi[0]["type"], "constructor");
    assert_eq!(crowdsale.ast.as_ref().unwrap()["nodeType"], "SourceUnit");

    let json: Value = serde_json::from_str(&collection_to_json(&merged).unwrap()).unwrap();
    let entry = &json["contracts/Crowdsale.sol:Crowdsale"];
    assert_eq!(entry["bin-runtime"], "608000");
    assert_eq!(entry["srcmap-runtime"], "0:100:0:-;;;");
    assert!(entry.get("bytecode").is_none());
    assert!(entry.get("networks").is_none());
}

#[test]
fn test_library_sources_are_rerooted_under_node_modules() {
    let temp = TempDir::new().unwrap();
    let project = sample_project(&temp);

    let merged = project.compile().unwrap();
    let dependency_dir = find_dependency_dir(project.root()).unwrap();
    let expected = dependency_dir.join("openzeppelin-solidity/contracts/math/SafeMath.sol");

    let key = format!("{}:SafeMath", expected.display());
    assert!(merged.contains_key(&key), "keys: {:?}", merged.keys().collect::<Vec<_>>());
    assert_eq!(merged[&key].bin.as_deref(), Some("6060"));
}

#[test]
fn test_migrations_is_never_merged() {
    let temp = TempDir::new().unwrap();
    let project = sample_project(&temp);

    let merged = project.compile().unwrap();
    assert!(merged.keys().all(|k| !k.ends_with(":Migrations")));
}

#[test]
fn test_unlocatable_source_is_an_error() {
    let temp = TempDir::new().unwrap();
    let project = sample_project(&temp);
    write_artifact(&project, "Ghost.json", artifact("Ghost", "contracts/Ghost.sol", "60"));

    match project.compile() {
        Err(Error::MissingArtifactSource {
            contract,
            source_path,
        }) => {
            assert_eq!(contract, "Ghost");
            assert_eq!(source_path, "contracts/Ghost.sol");
        }
        other => panic!("expected MissingArtifactSource, got {other:?}"),
    }
}

#[test]
fn test_missing_build_dir_is_io_error() {
    let temp = TempDir::new().unwrap();
    let project = TruffleProject::new(temp.path()).skip_build();

    assert!(matches!(project.compile(), Err(Error::Io(_))));
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_merge_output_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let project = sample_project(&temp);

    let first = collection_to_json(&project.compile().unwrap()).unwrap();
    let dependency_dir = find_dependency_dir(project.root());
    let second = collection_to_json(
        &merge_build_dir(project.root(), project.build_dir(), dependency_dir.as_deref()).unwrap(),
    )
    .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_written_collection_reads_back() {
    let temp = TempDir::new().unwrap();
    let project = sample_project(&temp);
    let merged = project.compile().unwrap();

    let out = temp.path().join("out/artifacts.json");
    write_collection(&merged, &out).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written.trim_end(), collection_to_json(&merged).unwrap().trim_end());

    let decoded: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(decoded.as_object().unwrap().len(), merged.len());
}
