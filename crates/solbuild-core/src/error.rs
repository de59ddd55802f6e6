//! Error types for solbuild-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::version::{Constraint, SolcVersion};

/// Result type for solbuild-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in solbuild-core.
#[derive(Debug, Error)]
pub enum Error {
    /// A `pragma solidity` line was found but carries no version token.
    #[error("malformed version pragma in {}: {line}", path.display())]
    MalformedDeclaration { path: PathBuf, line: String },

    /// Text that should have been a compiler version could not be parsed.
    #[error("invalid compiler version: {0}")]
    InvalidVersion(String),

    /// No known compiler version satisfies every declared constraint.
    #[error("no compiler version satisfies {}", format_constraints(constraints))]
    UnsatisfiableVersionConstraints { constraints: Vec<Constraint> },

    /// The version catalog is empty (offline with nothing cached).
    #[error("no compiler versions available")]
    NoCompilerAvailable,

    /// Downloading or installing a specific compiler failed.
    #[error("failed to install solc {version}: {reason}")]
    ToolchainInstallFailed { version: SolcVersion, reason: String },

    /// Fetching the release list or a compiler binary failed.
    #[error("download failed for {url}: {message}")]
    Download { url: String, message: String },

    /// No prebuilt compiler binaries are published for this platform.
    #[error("no prebuilt solc binaries for {0}")]
    UnsupportedPlatform(String),

    /// The compiler exited with an error or produced unreadable output.
    #[error("solc {version} failed to compile {} file(s):\n{diagnostics}", files.len())]
    CompilationFailed {
        files: Vec<PathBuf>,
        version: SolcVersion,
        diagnostics: String,
    },

    /// An external build tool (e.g. truffle) failed.
    #[error("{tool} failed:\n{diagnostics}")]
    BuildToolFailed { tool: String, diagnostics: String },

    /// The project root contains no Solidity sources.
    #[error("no Solidity sources found in {}", .0.display())]
    NoSourceModules(PathBuf),

    /// A build artifact names a source file that cannot be located.
    #[error("cannot locate source {source_path} for contract {contract}")]
    MissingArtifactSource {
        contract: String,
        source_path: String,
    },

    /// Serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Render the error followed by a short recovery hint, if one applies.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Self::MalformedDeclaration { .. } => {
                Some("write the pragma as e.g. `pragma solidity ^0.4.24;`")
            }
            Self::UnsatisfiableVersionConstraints { .. } => Some(
                "the pragmas of all files are combined; align them or pin a version with --solc",
            ),
            Self::NoCompilerAvailable => {
                Some("run `solbuild versions` while online to populate the catalog")
            }
            Self::ToolchainInstallFailed { .. } => {
                Some("check network access or install the binary manually into the solbuild home")
            }
            Self::NoSourceModules(_) => Some("files under node_modules/ and test/ are ignored"),
            Self::MissingArtifactSource { .. } => {
                Some("run `npm install` so that library sources exist under node_modules/")
            }
            _ => None,
        };

        match hint {
            Some(hint) => format!("{self}\n  hint: {hint}"),
            None => self.to_string(),
        }
    }
}

fn format_constraints(constraints: &[Constraint]) -> String {
    if constraints.is_empty() {
        return "<none>".to_string();
    }
    constraints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
