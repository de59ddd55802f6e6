//! Published compiler releases.
//!
//! Releases are read from the official binary mirror, which publishes one
//! `list.json` per platform mapping each version to a file name.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::version::SolcVersion;

/// Base URL of the official solc binary mirror.
pub const DEFAULT_MIRROR: &str = "https://binaries.soliditylang.org";

/// Published releases for one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseList {
    releases: BTreeMap<SolcVersion, String>,
}

/// Shape of the mirror's `list.json`; only the fields solbuild reads.
#[derive(Debug, Deserialize)]
struct RawReleaseList {
    releases: BTreeMap<String, String>,
}

impl ReleaseList {
    pub fn new(releases: BTreeMap<SolcVersion, String>) -> Self {
        Self { releases }
    }

    /// Decode a `list.json` document. Keys that are not plain versions are skipped.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawReleaseList = serde_json::from_str(json)?;
        let releases = raw
            .releases
            .into_iter()
            .filter_map(|(version, file)| match SolcVersion::parse(&version) {
                Ok(version) => Some((version, file)),
                Err(_) => {
                    tracing::debug!("Skipping unrecognized release key {version}");
                    None
                }
            })
            .collect();
        Ok(Self { releases })
    }

    /// All published versions, oldest first.
    pub fn versions(&self) -> Vec<SolcVersion> {
        self.releases.keys().copied().collect()
    }

    /// File name of the binary for `version`.
    pub fn file_for(&self, version: &SolcVersion) -> Option<&str> {
        self.releases.get(version).map(String::as_str)
    }
}

/// Where compiler releases come from.
pub trait ReleaseSource: Send + Sync {
    /// Fetch the list of published releases.
    fn fetch_releases(&self) -> Result<ReleaseList>;

    /// Download a release file named in the list.
    fn download(&self, file_name: &str) -> Result<Vec<u8>>;
}

/// [`ReleaseSource`] backed by the HTTP binary mirror.
pub struct HttpReleaseSource {
    client: reqwest::blocking::Client,
    mirror: String,
    platform: Option<&'static str>,
}

impl HttpReleaseSource {
    /// Source for the current platform on the official mirror.
    pub fn new() -> Result<Self> {
        Self::with_mirror(DEFAULT_MIRROR)
    }

    /// Source for the current platform on a custom mirror.
    ///
    /// On a platform without published binaries the source is still created;
    /// every request then fails with [`Error::UnsupportedPlatform`].
    ///
    /// Requests have no deadline of their own; a slow download runs until the
    /// network stack gives up.
    pub fn with_mirror(mirror: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("solbuild/", env!("CARGO_PKG_VERSION")))
            .timeout(None)
            .build()
            .map_err(|e| Error::Download {
                url: mirror.to_string(),
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            mirror: mirror.trim_end_matches('/').to_string(),
            platform: platform_dir(),
        })
    }

    /// URL of `file_name` in this platform's mirror directory.
    fn url(&self, file_name: &str) -> Result<String> {
        let platform = self.platform.ok_or_else(|| {
            Error::UnsupportedPlatform(format!(
                "{}-{}",
                std::env::consts::OS,
                std::env::consts::ARCH
            ))
        })?;
        Ok(format!("{}/{}/{}", self.mirror, platform, file_name))
    }

    fn get(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {url}");

        let response = self.client.get(url).send().map_err(|e| Error::Download {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(Error::Download {
                url: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes().map_err(|e| Error::Download {
            url: url.to_string(),
            message: format!("Failed to read response: {e}"),
        })?;
        Ok(bytes.to_vec())
    }
}

impl ReleaseSource for HttpReleaseSource {
    fn fetch_releases(&self) -> Result<ReleaseList> {
        let url = self.url("list.json")?;
        let body = self.get(&url)?;
        let text = String::from_utf8_lossy(&body);
        ReleaseList::from_json(&text)
    }

    fn download(&self, file_name: &str) -> Result<Vec<u8>> {
        self.get(&self.url(file_name)?)
    }
}

/// Mirror directory holding binaries for the current platform.
pub fn platform_dir() -> Option<&'static str> {
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    {
        Some("linux-amd64")
    }
    #[cfg(target_os = "macos")]
    {
        Some("macosx-amd64")
    }
    #[cfg(all(target_os = "windows", target_arch = "x86_64"))]
    {
        Some("windows-amd64")
    }
    #[cfg(not(any(
        all(target_os = "linux", target_arch = "x86_64"),
        target_os = "macos",
        all(target_os = "windows", target_arch = "x86_64"),
    )))]
    {
        None
    }
}
