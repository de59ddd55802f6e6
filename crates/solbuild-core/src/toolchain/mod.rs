//! Compiler toolchain management.
//!
//! Downloads `solc` release binaries into the solbuild home and hands out
//! their paths.

mod provisioner;
mod release;

pub use provisioner::{InstallReport, ToolchainProvisioner};
pub use release::{DEFAULT_MIRROR, HttpReleaseSource, ReleaseList, ReleaseSource, platform_dir};
