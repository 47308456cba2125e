//! Three-component release versions
//!
//! Mod releases are tagged `X.Y.Z` or `vX.Y.Z`. The ordering decides whether
//! an installed archive is outdated and whether the modding tools need an
//! update.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A `major.minor.patch` version, ordered component by component.
/// Components have no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    components: [Number; 3],
}

/// Decimal digits without leading zeros, `"0"` for zero
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Number(String);

impl Number {
    fn from_digits(digits: &str) -> Self {
        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            Number("0".to_string())
        } else {
            Number(significant.to_string())
        }
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            components: [major, minor, patch].map(|n| Number(n.to_string())),
        }
    }

    /// Parse `X.Y.Z`, allowing one leading `v`
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: String| Error::Parse {
            input: input.to_string(),
            reason,
        };

        let stripped = input.strip_prefix('v').unwrap_or(input);
        let parts: Vec<&str> = stripped.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(invalid(format!(
                "there must be exactly three components, {} received",
                parts.len()
            )));
        };

        let number = |i: usize, part: &str| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(format!("component {} is not a number", i)));
            }
            Ok(Number::from_digits(part))
        };

        Ok(Self {
            components: [number(0, *major)?, number(1, *minor)?, number(2, *patch)?],
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch] = &self.components;
        write!(f, "{}.{}.{}", major.0, minor.0, patch.0)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}
