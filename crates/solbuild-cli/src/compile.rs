//! Compile command implementation for solbuild CLI.
//!
//! Builds a project with solc or truffle and writes the merged artifact
//! collection as JSON.

use std::path::Path;
use std::time::Instant;

use solbuild_core::compile::{collection_to_json, write_collection};
use solbuild_core::{
    ArtifactCollection, BuildConfig, Project, SolcCompiler, SolcProject, SolcVersion,
    TruffleProject,
};

use crate::colors;

/// Flags of the compile command.
pub struct CompileOptions<'a> {
    pub truffle: bool,
    pub skip_build: bool,
    pub solc: Option<&'a str>,
    pub offline: bool,
}

/// Execute the compile command.
pub fn execute(project: &str, output: &str, options: &CompileOptions<'_>) -> anyhow::Result<()> {
    let root = Path::new(project);
    if !root.is_dir() {
        anyhow::bail!("Project directory not found: {}", project);
    }

    let start = Instant::now();
    let artifacts = build(root, options)?;

    if output == "-" {
        println!("{}", collection_to_json(&artifacts)?);
        return Ok(());
    }

    write_collection(&artifacts, Path::new(output))?;
    eprintln!(
        "{}Compiled{} {} contract(s) into {} {}({:.2}s){}",
        colors::GREEN,
        colors::RESET,
        artifacts.len(),
        output,
        colors::DIM,
        start.elapsed().as_secs_f64(),
        colors::RESET
    );

    Ok(())
}

fn build(root: &Path, options: &CompileOptions<'_>) -> anyhow::Result<ArtifactCollection> {
    if options.truffle {
        let mut project = TruffleProject::new(root);
        if options.skip_build {
            project = project.skip_build();
        }
        return Ok(project.compile()?);
    }

    let version = options.solc.map(SolcVersion::parse).transpose()?;
    let config = BuildConfig::default()
        .solc_version(version)
        .offline(options.offline);
    let compiler = SolcCompiler::from_config(config)?;

    Ok(SolcProject::new(root, compiler).compile()?)
}
