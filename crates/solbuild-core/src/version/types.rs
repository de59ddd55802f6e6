//! Compiler versions and the constraints placed on them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A `solc` release, `major.minor.patch`.
///
/// Ordering is the tuple order of the three components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SolcVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SolcVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version, accepting a leading `v`, a missing patch component
    /// (read as `.0`) and a trailing `+commit...` build suffix.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let body = body.split('+').next().unwrap_or(body);

        let parts: Vec<&str> = body.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(Error::InvalidVersion(text.to_string()));
        }

        let number = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| Error::InvalidVersion(text.to_string()))
        };

        Ok(Self {
            major: number(parts[0])?,
            minor: number(parts[1])?,
            patch: match parts.get(2) {
                Some(patch) => number(patch)?,
                None => 0,
            },
        })
    }
}

impl fmt::Display for SolcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SolcVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SolcVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SolcVersion> for String {
    fn from(version: SolcVersion) -> Self {
        version.to_string()
    }
}

/// Relational operator of a pragma constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// No operator, or `=`.
    Exact,
    Lt,
    Le,
    Gt,
    Ge,
    /// `^x.y.z`: same major, `(minor, patch) >= (y, z)`.
    Compatible,
}

impl Op {
    /// Map an operator token to its `Op`. The empty token means exact match.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "" | "=" => Some(Self::Exact),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "^" => Some(Self::Compatible),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Exact => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Compatible => "^",
        }
    }
}

/// A single `(operator, version)` requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub op: Op,
    pub version: SolcVersion,
}

impl Constraint {
    pub const fn new(op: Op, version: SolcVersion) -> Self {
        Self { op, version }
    }

    /// Whether `candidate` meets this requirement.
    pub fn satisfied_by(&self, candidate: &SolcVersion) -> bool {
        let v = &self.version;
        match self.op {
            Op::Exact => candidate == v,
            Op::Lt => candidate < v,
            Op::Le => candidate <= v,
            Op::Gt => candidate > v,
            Op::Ge => candidate >= v,
            // Same major even when it is 0; not semver caret.
            Op::Compatible => {
                candidate.major == v.major
                    && (candidate.minor, candidate.patch) >= (v.minor, v.patch)
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.version)
    }
}

/// Whether `candidate` satisfies every constraint. An empty set accepts anything.
pub fn satisfies_all(candidate: &SolcVersion, constraints: &[Constraint]) -> bool {
    constraints.iter().all(|c| c.satisfied_by(candidate))
}
