//! Compiler binary provisioning.
//!
//! Makes the `solc` binary for a resolved version available in the solbuild
//! home, downloading it from a [`ReleaseSource`] when missing.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::paths::ToolchainHome;
use crate::version::{SolcVersion, VersionCatalog};

use super::release::ReleaseSource;

/// Installs and locates `solc` binaries.
#[derive(Clone)]
pub struct ToolchainProvisioner {
    /// Home directory holding installed binaries
    home: ToolchainHome,

    /// Where missing binaries are downloaded from
    source: Arc<dyn ReleaseSource>,

    /// Never touch the network; only report what is installed
    offline: bool,
}

/// Outcome of provisioning one version during a bulk install.
pub type InstallReport = Vec<(SolcVersion, Result<PathBuf>)>;

impl ToolchainProvisioner {
    pub fn new(home: ToolchainHome, source: Arc<dyn ReleaseSource>) -> Self {
        Self {
            home,
            source,
            offline: false,
        }
    }

    /// Disable downloads.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn home(&self) -> &ToolchainHome {
        &self.home
    }

    pub fn is_installed(&self, version: &SolcVersion) -> bool {
        self.home.binary_path(version).is_file()
    }

    /// Published versions according to the release source.
    pub fn fetch_versions(&self) -> Result<Vec<SolcVersion>> {
        if self.offline {
            return Err(Error::Download {
                url: "release list".to_string(),
                message: "offline mode".to_string(),
            });
        }
        Ok(self.source.fetch_releases()?.versions())
    }

    /// Return the binary for `version`, installing it if needed.
    ///
    /// An installed binary is returned without any network access. A failed
    /// install is reported as [`Error::ToolchainInstallFailed`]; no other
    /// version is substituted.
    pub fn ensure(&self, version: SolcVersion) -> Result<PathBuf> {
        let path = self.home.binary_path(&version);
        if path.is_file() {
            tracing::debug!("solc {} available at {}", version, path.display());
            return Ok(path);
        }

        if self.offline {
            return Err(Error::ToolchainInstallFailed {
                version,
                reason: format!("not installed at {} and offline mode is on", path.display()),
            });
        }

        tracing::info!("solc {} not found, downloading...", version);
        self.install(&version)
            .map_err(|reason| Error::ToolchainInstallFailed { version, reason })
    }

    /// Install every catalog version from the newest down to `floor`.
    ///
    /// Failures are logged and recorded; the walk always continues.
    pub fn install_all(&self, catalog: &VersionCatalog, floor: SolcVersion) -> InstallReport {
        catalog
            .entries()
            .iter()
            .rev()
            .take_while(|version| **version >= floor)
            .fold(Vec::new(), |mut report, version| {
                let outcome = self.ensure(*version);
                if let Err(e) = &outcome {
                    tracing::warn!("Skipping solc {}: {}", version, e);
                }
                report.push((*version, outcome));
                report
            })
    }

    /// Install the newest catalog version.
    pub fn install_latest(&self, catalog: &VersionCatalog) -> Result<PathBuf> {
        let latest = catalog.latest().ok_or(Error::NoCompilerAvailable)?;
        self.ensure(latest)
    }

    /// Download `version` and write it into the home.
    fn install(&self, version: &SolcVersion) -> std::result::Result<PathBuf, String> {
        let releases = self
            .source
            .fetch_releases()
            .map_err(|e| format!("Failed to fetch release list: {}", e))?;

        let file_name = releases
            .file_for(version)
            .ok_or_else(|| "version is not published for this platform".to_string())?;

        if file_name.ends_with(".zip") {
            return Err(format!("archived release {} is not supported", file_name));
        }

        let bytes = self
            .source
            .download(file_name)
            .map_err(|e| format!("Failed to download {}: {}", file_name, e))?;

        if bytes.is_empty() {
            return Err(format!("downloaded {} is empty", file_name));
        }

        self.home
            .create()
            .map_err(|e| format!("Failed to create {}: {}", self.home.bin_dir.display(), e))?;

        // Write next to the target and rename so a partial download never
        // looks installed.
        let binary_path = self.home.binary_path(version);
        let mut partial_name = binary_path.clone().into_os_string();
        partial_name.push(".part");
        let partial_path = PathBuf::from(partial_name);

        if let Err(e) = place_executable(&partial_path, &binary_path, &bytes) {
            fs::remove_file(&partial_path).ok();
            return Err(e);
        }

        tracing::info!("solc {} installed to {}", version, binary_path.display());
        Ok(binary_path)
    }
}

/// Write `bytes` to `partial_path`, mark it executable and move it to `target`.
fn place_executable(
    partial_path: &Path,
    target: &Path,
    bytes: &[u8],
) -> std::result::Result<(), String> {
    fs::write(partial_path, bytes)
        .map_err(|e| format!("Failed to write {}: {}", partial_path.display(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(partial_path)
            .map_err(|e| format!("Failed to get metadata: {}", e))?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(partial_path, perms)
            .map_err(|e| format!("Failed to set permissions: {}", e))?;
    }

    fs::rename(partial_path, target)
        .map_err(|e| format!("Failed to move binary into place: {}", e))
}
