//! Compilation pipeline for solbuild.
//!
//! This module provides:
//! - Source and `node_modules` discovery (remappings for library imports)
//! - `solc` invocation with version resolution and provisioning
//! - Decoding of `--combined-json` output into artifacts
//! - Merging of per-contract truffle artifacts into the same schema
//!
//! # Architecture
//!
//! ```text
//! project/
//!  │
//!  ├── *.sol ──► pragmas ──► resolver ──► provisioner ──► solc ──► CombinedOutput ──┐
//!  │                                                                                ├─► artifacts
//!  └── build/contracts/*.json (truffle) ──► merge_build_dir ────────────────────────┘
//! ```

mod output;
mod solc;
pub mod sources;
pub mod truffle;
mod types;

pub use output::{CombinedOutput, RawContract, RawSource};
pub use solc::{SolcCompiler, SolcInvocation};
pub use sources::{Remapping, discover_sources, find_dependency_dir, project_remappings, remappings};
pub use truffle::{merge_build_dir, run_truffle_compile};
pub use types::{
    ArtifactCollection, BuildConfig, CompiledArtifact, DEFAULT_OUTPUT_VALUES,
    DEFAULT_REMAP_WHITELIST, artifact_key, collection_to_json, strip_hex_prefix, write_collection,
};
