//! Compiler version resolution.
//!
//! A build is compiled by a single `solc`, so the constraints of every
//! source are conjoined. Among the catalog versions that satisfy all of them
//! the oldest one is chosen.

use std::path::Path;

use crate::error::{Error, Result};

use super::pragma;
use super::types::{Constraint, SolcVersion, satisfies_all};

/// Pick the oldest catalog version satisfying every constraint.
///
/// `catalog` does not need to be sorted or deduplicated.
pub fn resolve<'a, I>(constraints: &[Constraint], catalog: I) -> Result<SolcVersion>
where
    I: IntoIterator<Item = &'a SolcVersion>,
{
    let mut catalog = catalog.into_iter().peekable();
    if catalog.peek().is_none() {
        return Err(Error::NoCompilerAvailable);
    }

    catalog
        .filter(|candidate| satisfies_all(candidate, constraints))
        .min()
        .copied()
        .ok_or_else(|| Error::UnsatisfiableVersionConstraints {
            constraints: constraints.to_vec(),
        })
}

/// Collect the constraints declared by every source, in the given order.
pub fn collect_constraints<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<Constraint>> {
    let mut constraints = Vec::new();
    for source in sources {
        constraints.extend(pragma::parse_file(source.as_ref())?);
    }
    Ok(constraints)
}

/// Parse every source and resolve the union of their constraints.
pub fn resolve_sources<'a, P, I>(sources: &[P], catalog: I) -> Result<SolcVersion>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a SolcVersion>,
{
    let constraints = collect_constraints(sources)?;
    let version = resolve(&constraints, catalog)?;

    tracing::info!(
        "Resolved solc {} for {} source(s) ({} constraint(s))",
        version,
        sources.len(),
        constraints.len()
    );

    Ok(version)
}
