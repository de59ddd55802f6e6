//! Project layout discovery: Solidity sources and `node_modules` remappings.

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::Result;

/// Directory name holding third-party packages.
pub const DEPENDENCY_DIR_NAME: &str = "node_modules";

/// An import prefix substitution passed to `solc` as `name=path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remapping {
    pub name: String,
    pub path: PathBuf,
}

impl fmt::Display for Remapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.path.display())
    }
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && matches!(entry.file_name().to_str(), Some(DEPENDENCY_DIR_NAME) | Some("test"))
}

/// All `.sol` files under `root`, sorted.
///
/// Anything below a `node_modules` or `test` directory is skipped.
pub fn discover_sources(root: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e))
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "sol")
        {
            sources.push(entry.into_path());
        }
    }

    tracing::debug!("Found {} source(s) under {}", sources.len(), root.display());
    Ok(sources)
}

/// The first `node_modules` directory found walking down from `root`.
pub fn find_dependency_dir(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != DEPENDENCY_DIR_NAME)
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().join(DEPENDENCY_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Remappings for the whitelisted packages present in `dependency_dir`.
pub fn remappings<S: AsRef<str>>(dependency_dir: &Path, whitelist: &[S]) -> Vec<Remapping> {
    let base = std::path::absolute(dependency_dir).unwrap_or_else(|_| dependency_dir.to_path_buf());

    whitelist
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|name| {
            let path = base.join(name);
            path.is_dir().then(|| Remapping {
                name: name.to_string(),
                path,
            })
        })
        .collect()
}

/// Remappings for the project at `root`, empty when it has no `node_modules`.
pub fn project_remappings<S: AsRef<str>>(root: &Path, whitelist: &[S]) -> Vec<Remapping> {
    match find_dependency_dir(root) {
        Some(dir) => {
            let found = remappings(&dir, whitelist);
            tracing::debug!("{} remapping(s) from {}", found.len(), dir.display());
            found
        }
        None => Vec::new(),
    }
}
