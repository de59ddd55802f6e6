//! solbuild home directory layout.
//!
//! Installed compilers and the cached release catalog live in one directory,
//! shared by every project:
//!
//! ```text
//! $SOLBUILD_HOME/           (default: <data dir>/solbuild)
//! ├── bin/
//! │   ├── solc-v0.4.24
//! │   └── solc-v0.5.3
//! └── catalog.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::version::SolcVersion;

/// Environment variable that overrides the home directory.
pub const HOME_ENV_VAR: &str = "SOLBUILD_HOME";

/// Directory structure of a solbuild home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainHome {
    /// The home directory itself.
    pub root: PathBuf,

    /// Installed compiler binaries.
    pub bin_dir: PathBuf,

    /// Persisted version catalog.
    pub catalog_file: PathBuf,
}

impl ToolchainHome {
    /// Layout rooted at `root`. Nothing is created on disk.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            bin_dir: root.join("bin"),
            catalog_file: root.join("catalog.json"),
            root,
        }
    }

    /// Locate the home: `$SOLBUILD_HOME`, else the platform data directory.
    pub fn discover() -> Self {
        if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
            return Self::at(dir);
        }

        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::at(base.join("solbuild"))
    }

    /// Create the directories if they don't exist.
    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.bin_dir)?;
        Ok(())
    }

    /// Where the binary for `version` is (or would be) installed.
    pub fn binary_path(&self, version: &SolcVersion) -> PathBuf {
        let name = if cfg!(windows) {
            format!("solc-v{version}.exe")
        } else {
            format!("solc-v{version}")
        };
        self.bin_dir.join(name)
    }

    /// Versions with a binary present in `bin/`, oldest first.
    pub fn installed_versions(&self) -> Result<Vec<SolcVersion>> {
        if !self.bin_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for entry in fs::read_dir(&self.bin_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(version) = version_from_binary_name(&entry.path()) {
                versions.push(version);
            }
        }

        versions.sort();
        Ok(versions)
    }
}

fn version_from_binary_name(path: &Path) -> Option<SolcVersion> {
    let stem = path.file_stem()?.to_str()?;
    let name = if cfg!(windows) {
        stem
    } else {
        path.file_name()?.to_str()?
    };
    SolcVersion::parse(name.strip_prefix("solc-v")?).ok()
}
