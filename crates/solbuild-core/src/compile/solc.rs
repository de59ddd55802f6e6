//! `solc` invocation and build orchestration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use chrono::Utc;

use crate::error::{Error, Result};
use crate::toolchain::{HttpReleaseSource, ReleaseSource, ToolchainProvisioner};
use crate::version::{SharedCatalog, SolcVersion, VersionCatalog, resolve_sources};

use super::output::CombinedOutput;
use super::sources::{Remapping, discover_sources, project_remappings};
use super::types::{ArtifactCollection, BuildConfig};

/// One `solc` command line.
#[derive(Debug, Clone)]
pub struct SolcInvocation {
    binary: PathBuf,
    version: SolcVersion,
    output_values: Vec<String>,
    allow_paths: Option<PathBuf>,
    remappings: Vec<Remapping>,
    sources: Vec<PathBuf>,
}

impl SolcInvocation {
    pub fn new(binary: impl Into<PathBuf>, version: SolcVersion) -> Self {
        Self {
            binary: binary.into(),
            version,
            output_values: Vec::new(),
            allow_paths: None,
            remappings: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn output_values<S: AsRef<str>>(mut self, values: &[S]) -> Self {
        self.output_values = values.iter().map(|v| v.as_ref().to_string()).collect();
        self
    }

    pub fn allow_paths(mut self, root: impl Into<PathBuf>) -> Self {
        self.allow_paths = Some(root.into());
        self
    }

    pub fn remappings(mut self, remappings: &[Remapping]) -> Self {
        self.remappings = remappings.to_vec();
        self
    }

    pub fn sources(mut self, sources: &[PathBuf]) -> Self {
        self.sources = sources.to_vec();
        self
    }

    /// Arguments passed to the binary, in order.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        if !self.output_values.is_empty() {
            args.push("--combined-json".into());
            args.push(self.output_values.join(",").into());
        }

        if let Some(root) = &self.allow_paths {
            args.push("--allow-paths".into());
            args.push(root.as_os_str().to_owned());
        }

        args.extend(self.remappings.iter().map(|r| OsString::from(r.to_string())));
        args.extend(self.sources.iter().map(|s| s.as_os_str().to_owned()));
        args
    }

    fn failure(&self, diagnostics: impl Into<String>) -> Error {
        Error::CompilationFailed {
            files: self.sources.clone(),
            version: self.version,
            diagnostics: diagnostics.into(),
        }
    }

    /// Run the compiler and decode its output.
    pub fn run(&self) -> Result<ArtifactCollection> {
        tracing::debug!("Running {} {:?}", self.binary.display(), self.args());

        let output = Command::new(&self.binary)
            .args(self.args())
            .output()
            .map_err(|e| self.failure(format!("Failed to run {}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(stderr.trim_end()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let artifacts = CombinedOutput::from_json(&stdout)
            .and_then(CombinedOutput::into_artifacts)
            .map_err(|e| self.failure(e))?;

        tracing::info!(
            "solc {} compiled {} source(s) into {} contract(s)",
            self.version,
            self.sources.len(),
            artifacts.len()
        );
        Ok(artifacts)
    }
}

/// Resolves, provisions and runs the compiler for a set of sources.
pub struct SolcCompiler {
    /// Build configuration
    config: BuildConfig,

    /// Installs compiler binaries on demand
    provisioner: ToolchainProvisioner,

    /// Known compiler versions
    catalog: Arc<SharedCatalog>,
}

impl SolcCompiler {
    pub fn new(
        config: BuildConfig,
        provisioner: ToolchainProvisioner,
        catalog: Arc<SharedCatalog>,
    ) -> Self {
        Self {
            config,
            provisioner,
            catalog,
        }
    }

    /// Compiler wired to `source`, seeded with the catalog cached in the home.
    pub fn with_source(config: BuildConfig, source: Arc<dyn ReleaseSource>) -> Self {
        let cached = match VersionCatalog::load(&config.home.catalog_file) {
            Ok(cached) => cached.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable catalog cache: {e}");
                VersionCatalog::default()
            }
        };

        let cached = VersionCatalog::new(
            cached.entries().iter().copied(),
            config.min_version,
            cached.last_refreshed(),
        );
        let catalog = SharedCatalog::new(cached, config.catalog_ttl, config.min_version);
        let provisioner =
            ToolchainProvisioner::new(config.home.clone(), source).offline(config.offline);
        Self::new(config, provisioner, Arc::new(catalog))
    }

    /// Compiler downloading from the official binary mirror.
    pub fn from_config(config: BuildConfig) -> Result<Self> {
        let source = HttpReleaseSource::new()?;
        Ok(Self::with_source(config, Arc::new(source)))
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn provisioner(&self) -> &ToolchainProvisioner {
        &self.provisioner
    }

    /// The versions builds may choose from.
    ///
    /// Online, this is the shared catalog, refreshed when stale and persisted
    /// to the home. Offline, only installed versions qualify.
    pub fn available_versions(&self) -> Result<Arc<VersionCatalog>> {
        if self.config.offline {
            let installed = self.config.home.installed_versions()?;
            return Ok(Arc::new(VersionCatalog::new(
                installed,
                self.config.min_version,
                None,
            )));
        }

        let before = self.catalog.snapshot();
        let after = self
            .catalog
            .refresh_with(Utc::now(), || self.provisioner.fetch_versions());

        if !Arc::ptr_eq(&before, &after) && after.last_refreshed().is_some() {
            if let Err(e) = after.save(&self.config.home.catalog_file) {
                tracing::warn!("Failed to cache compiler catalog: {e}");
            }
        }

        Ok(after)
    }

    /// Pick the compiler version for `sources` from their pragmas.
    pub fn resolve_version(&self, sources: &[PathBuf]) -> Result<SolcVersion> {
        let catalog = self.available_versions()?;
        resolve_sources(sources, catalog.entries())
    }

    /// Compile `sources` with a single compiler.
    ///
    /// Without a `version` (and no pinned version in the config) the
    /// version is resolved from the sources' pragmas.
    pub fn compile(
        &self,
        project_root: &Path,
        sources: &[PathBuf],
        remappings: &[Remapping],
        version: Option<SolcVersion>,
    ) -> Result<ArtifactCollection> {
        if sources.is_empty() {
            return Err(Error::NoSourceModules(project_root.to_path_buf()));
        }

        let version = match version.or(self.config.solc_version) {
            Some(version) => version,
            None => self.resolve_version(sources)?,
        };

        let binary = self.provisioner.ensure(version)?;

        SolcInvocation::new(binary, version)
            .output_values(&self.config.output_values)
            .allow_paths(project_root)
            .remappings(remappings)
            .sources(sources)
            .run()
    }

    /// Discover the sources and remappings of `project_root` and compile them.
    pub fn compile_project(&self, project_root: &Path) -> Result<ArtifactCollection> {
        let sources = discover_sources(project_root)?;
        if sources.is_empty() {
            return Err(Error::NoSourceModules(project_root.to_path_buf()));
        }

        let remappings = project_remappings(project_root, &self.config.remap_whitelist);
        self.compile(project_root, &sources, &remappings, None)
    }
}
