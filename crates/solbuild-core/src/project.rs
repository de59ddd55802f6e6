//! Project drivers.
//!
//! A project knows how to turn its sources into an [`ArtifactCollection`]:
//! plain projects are compiled with `solc` directly, truffle projects are
//! built with truffle and their per-contract artifacts merged.

use std::path::{Path, PathBuf};

use crate::compile::{
    ArtifactCollection, SolcCompiler, find_dependency_dir, merge_build_dir, run_truffle_compile,
    truffle::TRUFFLE_BUILD_DIR,
};
use crate::error::Result;

/// A buildable Solidity project.
pub trait Project {
    /// Project root directory.
    fn root(&self) -> &Path;

    /// Build the project and return its artifacts.
    fn compile(&self) -> Result<ArtifactCollection>;
}

/// Project compiled by invoking `solc` on every source file.
pub struct SolcProject {
    root: PathBuf,
    compiler: SolcCompiler,
}

impl SolcProject {
    pub fn new(root: impl Into<PathBuf>, compiler: SolcCompiler) -> Self {
        Self {
            root: root.into(),
            compiler,
        }
    }

    pub fn compiler(&self) -> &SolcCompiler {
        &self.compiler
    }
}

impl Project for SolcProject {
    fn root(&self) -> &Path {
        &self.root
    }

    fn compile(&self) -> Result<ArtifactCollection> {
        self.compiler.compile_project(&self.root)
    }
}

/// Project built with `truffle compile`.
pub struct TruffleProject {
    root: PathBuf,
    build_dir: PathBuf,
    run_build: bool,
}

impl TruffleProject {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            build_dir: root.join(TRUFFLE_BUILD_DIR),
            root,
            run_build: true,
        }
    }

    /// Merge existing artifacts without running truffle first.
    pub fn skip_build(mut self) -> Self {
        self.run_build = false;
        self
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }
}

impl Project for TruffleProject {
    fn root(&self) -> &Path {
        &self.root
    }

    fn compile(&self) -> Result<ArtifactCollection> {
        if self.run_build {
            run_truffle_compile(&self.root)?;
        }

        let dependency_dir = find_dependency_dir(&self.root);
        merge_build_dir(&self.root, &self.build_dir, dependency_dir.as_deref())
    }
}
