//! Catalog of installable compiler versions.
//!
//! The catalog is a plain value: refreshing it produces a new catalog from
//! the old one and the current time. [`SharedCatalog`] holds the process-wide
//! copy and swaps in refreshed values atomically, so readers always see a
//! complete snapshot.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::types::SolcVersion;

/// Oldest compiler release solbuild will select or install.
pub const MIN_SUPPORTED_VERSION: SolcVersion = SolcVersion::new(0, 4, 11);

/// How long a fetched release list is trusted before it is fetched again.
pub fn default_ttl() -> TimeDelta {
    TimeDelta::hours(1)
}

/// Releases known without network access: 0.4.11 - 0.4.25 and 0.5.0 - 0.5.3.
pub fn fallback_versions() -> Vec<SolcVersion> {
    (11..=25)
        .map(|patch| SolcVersion::new(0, 4, patch))
        .chain((0..=3).map(|patch| SolcVersion::new(0, 5, patch)))
        .collect()
}

/// An ordered set of installable versions and when it was last fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCatalog {
    entries: BTreeSet<SolcVersion>,
    last_refreshed: Option<DateTime<Utc>>,
}

impl VersionCatalog {
    /// Build a catalog from `versions`, dropping anything below `floor`.
    pub fn new(
        versions: impl IntoIterator<Item = SolcVersion>,
        floor: SolcVersion,
        last_refreshed: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            entries: versions.into_iter().filter(|v| *v >= floor).collect(),
            last_refreshed,
        }
    }

    /// The hardcoded catalog, never refreshed.
    pub fn fallback() -> Self {
        Self::new(fallback_versions(), MIN_SUPPORTED_VERSION, None)
    }

    pub fn entries(&self) -> &BTreeSet<SolcVersion> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, version: &SolcVersion) -> bool {
        self.entries.contains(version)
    }

    /// Newest known version.
    pub fn latest(&self) -> Option<SolcVersion> {
        self.entries.last().copied()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    /// Whether the catalog should be fetched again at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        match self.last_refreshed {
            Some(at) => now.signed_duration_since(at) >= ttl,
            None => true,
        }
    }

    /// Return the catalog as it should look at `now`.
    ///
    /// A fresh catalog is returned unchanged and `fetch` is not called.
    /// Otherwise `fetch` supplies the new version list. If it fails or
    /// returns nothing usable, the current entries are kept (or the
    /// hardcoded list when there are none) and the timestamp is left alone
    /// so the next call tries again.
    pub fn refreshed<F>(
        &self,
        now: DateTime<Utc>,
        ttl: TimeDelta,
        floor: SolcVersion,
        fetch: F,
    ) -> Self
    where
        F: FnOnce() -> Result<Vec<SolcVersion>>,
    {
        if !self.is_stale(now, ttl) {
            return self.clone();
        }

        match fetch() {
            Ok(versions) => {
                let fetched = Self::new(versions, floor, Some(now));
                if !fetched.is_empty() {
                    tracing::debug!("Catalog refreshed with {} versions", fetched.entries.len());
                    return fetched;
                }
                tracing::warn!(
                    "Release list contained no versions >= {floor}, keeping cached catalog"
                );
            }
            Err(e) => {
                tracing::warn!("Failed to refresh compiler catalog, keeping cached list: {e}");
            }
        }

        if self.is_empty() {
            Self::new(fallback_versions(), floor, None)
        } else {
            self.clone()
        }
    }

    /// Load a catalog saved with [`VersionCatalog::save`]. A missing file is `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Process-wide catalog with timestamp-gated refresh.
///
/// Concurrent refreshes may both fetch; whichever finishes last wins, and
/// both results are valid catalogs.
#[derive(Debug)]
pub struct SharedCatalog {
    current: RwLock<Arc<VersionCatalog>>,
    ttl: TimeDelta,
    floor: SolcVersion,
}

impl SharedCatalog {
    pub fn new(initial: VersionCatalog, ttl: TimeDelta, floor: SolcVersion) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            ttl,
            floor,
        }
    }

    /// The catalog as of the last completed refresh.
    pub fn snapshot(&self) -> Arc<VersionCatalog> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Refresh if stale at `now` and return the resulting snapshot.
    pub fn refresh_with<F>(&self, now: DateTime<Utc>, fetch: F) -> Arc<VersionCatalog>
    where
        F: FnOnce() -> Result<Vec<SolcVersion>>,
    {
        let current = self.snapshot();
        if !current.is_stale(now, self.ttl) {
            return current;
        }

        let next = Arc::new(current.refreshed(now, self.ttl, self.floor, fetch));
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::clone(&next);
        next
    }
}

impl Default for SharedCatalog {
    fn default() -> Self {
        Self::new(VersionCatalog::default(), default_ttl(), MIN_SUPPORTED_VERSION)
    }
}
