//! Resolve command implementation for solbuild CLI.

use std::path::Path;

use solbuild_core::compile::discover_sources;
use solbuild_core::{BuildConfig, Error, SolcCompiler};

/// Print the compiler version selected for the project's pragmas.
pub fn execute(project: &str, offline: bool) -> anyhow::Result<()> {
    let root = Path::new(project);
    if !root.is_dir() {
        anyhow::bail!("Project directory not found: {}", project);
    }

    let sources = discover_sources(root)?;
    if sources.is_empty() {
        return Err(Error::NoSourceModules(root.to_path_buf()).into());
    }

    let compiler = SolcCompiler::from_config(BuildConfig::default().offline(offline))?;
    let version = compiler.resolve_version(&sources)?;

    println!("{version}");
    Ok(())
}
