//! Install command implementation for solbuild CLI.
//!
//! Downloads solc binaries into the solbuild home ahead of a build.

use solbuild_core::{BuildConfig, SolcCompiler, SolcVersion};

use crate::colors;

/// Execute the install command.
pub fn execute(version: Option<&str>, all: bool, latest: bool) -> anyhow::Result<()> {
    let config = BuildConfig::default();
    let floor = config.min_version;
    let compiler = SolcCompiler::from_config(config)?;
    let provisioner = compiler.provisioner();

    if let Some(version) = version {
        let version = SolcVersion::parse(version)?;
        let path = provisioner.ensure(version)?;
        println!("{}", path.display());
        return Ok(());
    }

    if !all && !latest {
        anyhow::bail!("Nothing to install: pass a VERSION, --latest or --all");
    }

    let catalog = compiler.available_versions()?;

    if latest {
        let path = provisioner.install_latest(&catalog)?;
        println!("{}", path.display());
        return Ok(());
    }

    let report = provisioner.install_all(&catalog, floor);
    let mut installed = 0;
    for (version, outcome) in &report {
        match outcome {
            Ok(path) => {
                installed += 1;
                println!(
                    "  {}✓{} {} {}{}{}",
                    colors::GREEN,
                    colors::RESET,
                    version,
                    colors::DIM,
                    path.display(),
                    colors::RESET
                );
            }
            Err(e) => println!("  {}✗{} {} {}", colors::RED, colors::RESET, version, e),
        }
    }

    println!(
        "\n{}Installed{} {}/{} version(s)",
        colors::BOLD,
        colors::RESET,
        installed,
        report.len()
    );

    if installed == 0 && !report.is_empty() {
        anyhow::bail!("No compiler could be installed");
    }
    Ok(())
}
