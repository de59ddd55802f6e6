//! solbuild CLI - Solidity build front end for static analysis.

mod colors;
mod compile;
mod install;
mod resolve;
mod versions;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "solbuild")]
#[command(about = "Resolve, install and run the right solc for a Solidity project")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a project into a single artifact JSON document
    Compile {
        /// Project root directory
        project: String,

        /// Output file, or `-` for stdout
        #[arg(short, long, default_value = "-")]
        output: String,

        /// Build with truffle and merge build/contracts/*.json
        #[arg(long)]
        truffle: bool,

        /// Merge existing truffle artifacts without running truffle
        #[arg(long, requires = "truffle")]
        skip_build: bool,

        /// Compile with this solc version instead of resolving pragmas
        #[arg(long, value_name = "VERSION", conflicts_with = "truffle")]
        solc: Option<String>,

        /// Only use compilers that are already installed
        #[arg(long)]
        offline: bool,
    },

    /// Print the solc version a project would be compiled with
    Resolve {
        /// Project root directory
        project: String,

        /// Only consider compilers that are already installed
        #[arg(long)]
        offline: bool,
    },

    /// Install solc binaries into the solbuild home
    Install {
        /// Version to install
        #[arg(conflicts_with_all = ["all", "latest"])]
        version: Option<String>,

        /// Install every known version down to the minimum supported one
        #[arg(long, conflicts_with = "latest")]
        all: bool,

        /// Install the newest known version
        #[arg(long)]
        latest: bool,
    },

    /// List known compiler versions
    Versions {
        /// List installed compilers only
        #[arg(long)]
        offline: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Helper to format solbuild-core errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(solbuild_err) = err.downcast_ref::<solbuild_core::Error>() {
            anyhow::anyhow!("{}", solbuild_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Compile {
            project,
            output,
            truffle,
            skip_build,
            solc,
            offline,
        } => {
            let options = compile::CompileOptions {
                truffle,
                skip_build,
                solc: solc.as_deref(),
                offline,
            };
            compile::execute(&project, &output, &options).map_err(format_error)?;
        }

        Commands::Resolve { project, offline } => {
            resolve::execute(&project, offline).map_err(format_error)?;
        }

        Commands::Install {
            version,
            all,
            latest,
        } => {
            install::execute(version.as_deref(), all, latest).map_err(format_error)?;
        }

        Commands::Versions { offline } => {
            versions::execute(offline).map_err(format_error)?;
        }
    }

    Ok(())
}
