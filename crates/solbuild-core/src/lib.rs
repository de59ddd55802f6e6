//! Core engine for solbuild.
//!
//! This crate provides:
//! - Compiler version resolution from `pragma solidity` constraints
//! - A cached catalog of installable `solc` releases
//! - Provisioning of `solc` binaries
//! - Compilation and normalization of build artifacts (solc and truffle)

pub mod compile;
pub mod error;
pub mod paths;
pub mod project;
pub mod toolchain;
pub mod version;

pub use compile::{ArtifactCollection, BuildConfig, CompiledArtifact, SolcCompiler};
pub use error::{Error, Result};
pub use paths::ToolchainHome;
pub use project::{Project, SolcProject, TruffleProject};
pub use toolchain::{HttpReleaseSource, ReleaseSource, ToolchainProvisioner};
pub use version::{Constraint, Op, SolcVersion, VersionCatalog};
