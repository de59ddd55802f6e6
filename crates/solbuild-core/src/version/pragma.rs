//! Version pragma parsing for Solidity sources.
//!
//! Reads the compiler requirement a source file declares in its header:
//!
//! ```text
//! pragma solidity >=0.4.11 <0.5.0;
//! pragma solidity ^0.4.24;
//! pragma solidity 0.4.24;
//! ```
//!
//! Only the first `pragma solidity` line counts. `pragma experimental ...`
//! lines are ignored.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

use super::types::{Constraint, Op, SolcVersion};

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*pragma\s+solidity\b([^;]*)").expect("declaration pattern is valid")
});

static VERSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\^|>=|<=|>|<|=)?\s*v?(\d+)\.(\d+)(?:\.(\d+))?")
        .expect("version token pattern is valid")
});

/// Outcome of scanning one source for a version pragma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PragmaScan {
    /// The source has no `pragma solidity` line; any compiler will do.
    NoDeclaration,

    /// The constraints of the first declaration line, in source order.
    Declaration(Vec<Constraint>),

    /// A declaration line without a single version token.
    Malformed { line: String },
}

/// Scan source text for its version pragma.
pub fn scan_source(source: &str) -> PragmaScan {
    for line in source.lines() {
        if line.contains("experimental") {
            continue;
        }

        let Some(captures) = DECLARATION.captures(line) else {
            continue;
        };
        let body = captures.get(1).map_or("", |m| m.as_str());

        let constraints = parse_constraints(body);
        if constraints.is_empty() {
            return PragmaScan::Malformed {
                line: line.trim().to_string(),
            };
        }
        return PragmaScan::Declaration(constraints);
    }

    PragmaScan::NoDeclaration
}

/// Extract every `OPERATOR? MAJOR.MINOR[.PATCH]` token from a pragma body.
fn parse_constraints(body: &str) -> Vec<Constraint> {
    VERSION_TOKEN
        .captures_iter(body)
        .filter_map(|caps| {
            let op = Op::from_token(caps.get(1).map_or("", |m| m.as_str()))?;
            let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
            let version = SolcVersion::new(number(2)?, number(3)?, number(4).unwrap_or(0));
            Some(Constraint::new(op, version))
        })
        .collect()
}

/// Read a source file and return its declared constraints.
///
/// A file without a pragma yields an empty list. A pragma line that carries
/// no version is an error.
pub fn parse_file(path: &Path) -> Result<Vec<Constraint>> {
    let source = fs::read_to_string(path)?;

    match scan_source(&source) {
        PragmaScan::NoDeclaration => {
            tracing::debug!("{}: no version pragma", path.display());
            Ok(Vec::new())
        }
        PragmaScan::Declaration(constraints) => Ok(constraints),
        PragmaScan::Malformed { line } => Err(Error::MalformedDeclaration {
            path: path.to_path_buf(),
            line,
        }),
    }
}
