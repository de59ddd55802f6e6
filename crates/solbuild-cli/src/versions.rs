//! Versions command implementation for solbuild CLI.

use solbuild_core::{BuildConfig, SolcCompiler};

use crate::colors;

/// List catalog versions, newest first, marking installed ones.
pub fn execute(offline: bool) -> anyhow::Result<()> {
    let compiler = SolcCompiler::from_config(BuildConfig::default().offline(offline))?;
    let catalog = compiler.available_versions()?;

    if catalog.is_empty() {
        println!("{}No compiler versions known.{}", colors::YELLOW, colors::RESET);
        return Ok(());
    }

    for version in catalog.entries().iter().rev() {
        if compiler.provisioner().is_installed(version) {
            println!("{version}  {}installed{}", colors::GREEN, colors::RESET);
        } else {
            println!("{version}");
        }
    }

    if let Some(at) = catalog.last_refreshed() {
        eprintln!(
            "{}Release list fetched {}{}",
            colors::DIM,
            at.format("%Y-%m-%d %H:%M UTC"),
            colors::RESET
        );
    }

    Ok(())
}
