//! Compiler version handling.
//!
//! This module provides:
//! - Version values and pragma constraints (`^`, `>=`, `<`, ...)
//! - Pragma parsing from Solidity source headers
//! - Resolution of a single compiler version for a whole build
//! - The catalog of installable versions and its refresh policy
//!
//! # Architecture
//!
//! ```text
//! *.sol ──► pragma::parse_file ──► Vec<Constraint> ──┐
//!                                                    ├──► resolver::resolve ──► SolcVersion
//! ReleaseSource ──► VersionCatalog::refreshed ───────┘
//! ```

mod catalog;
pub mod pragma;
pub mod resolver;
mod types;

pub use catalog::{
    MIN_SUPPORTED_VERSION, SharedCatalog, VersionCatalog, default_ttl, fallback_versions,
};
pub use pragma::PragmaScan;
pub use resolver::{collect_constraints, resolve, resolve_sources};
pub use types::{Constraint, Op, SolcVersion, satisfies_all};
