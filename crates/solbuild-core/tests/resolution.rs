//! Integration tests for compiler version resolution.
//!
//! Covers pragma parsing across several files, the catalog refresh through a
//! release source, and the failure modes of a build before solc runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use solbuild_core::compile::SolcCompiler;
use solbuild_core::toolchain::{ReleaseList, ReleaseSource};
use solbuild_core::version::{self, resolve_sources};
use solbuild_core::{BuildConfig, Error, Result, SolcVersion, ToolchainHome};
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

fn v(text: &str) -> SolcVersion {
    SolcVersion::parse(text).expect("valid version")
}

fn write_source(root: &Path, rel: &str, pragma: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, format!("{pragma}\n\ncontract C {{}}\n")).unwrap();
    path
}

/// Release source publishing a fixed version list.
struct StaticReleases(Vec<SolcVersion>);

impl ReleaseSource for StaticReleases {
    fn fetch_releases(&self) -> Result<ReleaseList> {
        Ok(ReleaseList::new(
            self.0
                .iter()
                .map(|v| (*v, format!("solc-v{v}")))
                .collect::<BTreeMap<_, _>>(),
        ))
    }

    fn download(&self, file_name: &str) -> Result<Vec<u8>> {
        Err(Error::Download {
            url: file_name.to_string(),
            message: "downloads disabled in tests".to_string(),
        })
    }
}

/// Release source that must never be consulted.
struct Unreachable;

impl ReleaseSource for Unreachable {
    fn fetch_releases(&self) -> Result<ReleaseList> {
        panic!("release list fetched")
    }

    fn download(&self, _file_name: &str) -> Result<Vec<u8>> {
        panic!("download attempted")
    }
}

fn compiler(home: &Path, source: Arc<dyn ReleaseSource>, offline: bool) -> SolcCompiler {
    let config = BuildConfig::with_home(ToolchainHome::at(home)).offline(offline);
    SolcCompiler::with_source(config, source)
}

fn published() -> Arc<StaticReleases> {
    Arc::new(StaticReleases(
        ["0.4.10", "0.4.11", "0.4.18", "0.4.20", "0.4.24", "0.5.0"]
            .into_iter()
            .map(v)
            .collect(),
    ))
}

// =============================================================================
// Pragma Resolution
// =============================================================================

#[test]
fn test_exact_pragma_selects_that_version() {
    let temp = TempDir::new().unwrap();
    let a = write_source(temp.path(), "A.sol", "pragma solidity 0.4.24;");

    let catalog = version::fallback_versions();
    assert_eq!(resolve_sources(&[a], &catalog).unwrap(), v("0.4.24"));
}

#[test]
fn test_exact_pragma_missing_from_catalog() {
    let temp = TempDir::new().unwrap();
    let a = write_source(temp.path(), "A.sol", "pragma solidity 0.4.24;");

    let catalog = vec![v("0.4.23"), v("0.4.25")];
    assert!(matches!(
        resolve_sources(&[a], &catalog),
        Err(Error::UnsatisfiableVersionConstraints { .. })
    ));
}

#[test]
fn test_two_modules_are_intersected() {
    let temp = TempDir::new().unwrap();
    let sources = vec![
        write_source(temp.path(), "contracts/A.sol", "pragma solidity >=0.4.11;"),
        write_source(temp.path(), "contracts/B.sol", "pragma solidity ^0.4.20;"),
    ];

    let catalog = version::fallback_versions();
    assert_eq!(resolve_sources(&sources, &catalog).unwrap(), v("0.4.20"));

    // Order of modules does not matter.
    let reversed: Vec<PathBuf> = sources.iter().rev().cloned().collect();
    assert_eq!(resolve_sources(&reversed, &catalog).unwrap(), v("0.4.20"));
}

#[test]
fn test_conflicting_modules_report_all_constraints() {
    let temp = TempDir::new().unwrap();
    let sources = vec![
        write_source(temp.path(), "A.sol", "pragma solidity 0.4.24;"),
        write_source(temp.path(), "B.sol", "pragma solidity ^0.5.0;"),
    ];

    match resolve_sources(&sources, &version::fallback_versions()) {
        Err(err @ Error::UnsatisfiableVersionConstraints { .. }) => {
            let message = err.to_string();
            assert!(message.contains("=0.4.24"), "{message}");
            assert!(message.contains("^0.5.0"), "{message}");
        }
        other => panic!("expected UnsatisfiableVersionConstraints, got {other:?}"),
    }
}

#[test]
fn test_malformed_pragma_aborts_resolution() {
    let temp = TempDir::new().unwrap();
    let sources = vec![
        write_source(temp.path(), "A.sol", "pragma solidity ^0.4.20;"),
        write_source(temp.path(), "B.sol", "pragma solidity latest;"),
    ];

    assert!(matches!(
        resolve_sources(&sources, &version::fallback_versions()),
        Err(Error::MalformedDeclaration { path, .. }) if path.ends_with("B.sol")
    ));
}

#[test]
fn test_files_without_pragma_accept_anything() {
    let temp = TempDir::new().unwrap();
    let sources = vec![
        write_source(temp.path(), "A.sol", "// no pragma here"),
        write_source(temp.path(), "B.sol", "pragma experimental ABIEncoderV2;"),
    ];

    let catalog = version::fallback_versions();
    assert_eq!(resolve_sources(&sources, &catalog).unwrap(), v("0.4.11"));
}

// =============================================================================
// Resolution Through The Compiler
// =============================================================================

#[test]
fn test_compiler_refreshes_and_caches_catalog() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    let home = temp.path().join("home");
    let a = write_source(&project, "A.sol", "pragma solidity ^0.4.19;");

    let compiler = compiler(&home, published(), false);
    assert_eq!(compiler.resolve_version(&[a]).unwrap(), v("0.4.20"));

    // The floor drops 0.4.10; the fetched list is persisted.
    let catalog = compiler.available_versions().unwrap();
    assert!(!catalog.contains(&v("0.4.10")));
    assert!(ToolchainHome::at(&home).catalog_file.is_file());

    // A fresh cached catalog is used without touching the network.
    let cached = self::compiler(&home, Arc::new(Unreachable), false);
    assert_eq!(cached.available_versions().unwrap().entries(), catalog.entries());
}

#[test]
fn test_offline_without_installed_compilers() {
    let temp = TempDir::new().unwrap();
    let a = write_source(temp.path(), "project/A.sol", "pragma solidity ^0.4.19;");

    let compiler = compiler(&temp.path().join("home"), Arc::new(Unreachable), true);
    assert!(matches!(
        compiler.resolve_version(&[a]),
        Err(Error::NoCompilerAvailable)
    ));
}

#[test]
fn test_offline_resolves_among_installed() {
    let temp = TempDir::new().unwrap();
    let home = ToolchainHome::at(temp.path().join("home"));
    home.create().unwrap();
    for installed in ["0.4.24", "0.4.25"] {
        fs::write(home.binary_path(&v(installed)), b"").unwrap();
    }

    let a = write_source(temp.path(), "project/A.sol", "pragma solidity ^0.4.20;");
    let compiler = compiler(&home.root, Arc::new(Unreachable), true);
    assert_eq!(compiler.resolve_version(&[a]).unwrap(), v("0.4.24"));
}

#[test]
fn test_compiler_agrees_with_standalone_resolution() {
    let temp = TempDir::new().unwrap();
    let home = ToolchainHome::at(temp.path().join("home"));
    home.create().unwrap();
    for installed in ["0.4.18", "0.4.21", "0.4.24"] {
        fs::write(home.binary_path(&v(installed)), b"").unwrap();
    }

    let sources = vec![
        write_source(temp.path(), "project/A.sol", "pragma solidity >=0.4.11;"),
        write_source(temp.path(), "project/B.sol", "pragma solidity ^0.4.20;"),
    ];
    let compiler = compiler(&home.root, Arc::new(Unreachable), true);

    let installed = home.installed_versions().unwrap();
    assert_eq!(
        compiler.resolve_version(&sources).unwrap(),
        resolve_sources(&sources, &installed).unwrap()
    );

    let broken = write_source(temp.path(), "project/C.sol", "pragma solidity latest;");
    assert!(matches!(
        compiler.resolve_version(&[broken]),
        Err(Error::MalformedDeclaration { .. })
    ));
}

#[test]
fn test_failed_refresh_falls_back_to_hardcoded_list() {
    let temp = TempDir::new().unwrap();
    let a = write_source(temp.path(), "project/A.sol", "pragma solidity 0.5.3;");

    let compiler = compiler(&temp.path().join("home"), Arc::new(StaticReleases(Vec::new())), false);
    assert_eq!(compiler.resolve_version(&[a]).unwrap(), v("0.5.3"));
}

// =============================================================================
// Build Preconditions
// =============================================================================

#[test]
fn test_empty_project_fails_before_resolution() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    fs::create_dir_all(project.join("node_modules/zeppelin-solidity")).unwrap();
    write_source(
        &project,
        "node_modules/zeppelin-solidity/Ownable.sol",
        "pragma solidity ^0.4.24;",
    );
    write_source(&project, "test/Helper.sol", "pragma solidity ^0.4.24;");

    let compiler = compiler(&temp.path().join("home"), Arc::new(Unreachable), false);
    assert!(matches!(
        compiler.compile_project(&project),
        Err(Error::NoSourceModules(root)) if root == project
    ));
}

#[test]
fn test_unpublished_version_is_not_substituted() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    write_source(&project, "A.sol", "pragma solidity 0.4.24;");

    let compiler = compiler(&temp.path().join("home"), published(), false);
    match compiler.compile_project(&project) {
        Err(Error::ToolchainInstallFailed { version, .. }) => assert_eq!(version, v("0.4.24")),
        other => panic!("expected ToolchainInstallFailed, got {other:?}"),
    }
}
