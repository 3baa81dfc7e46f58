//! Loose version parsing and comparison.
//!
//! Version strings found in package files are not always strict
//! `major.minor.patch`; `"2"` and `"1.2"` are accepted too. Trailing zero
//! components carry no meaning, so `"2.0.0"`, `"2.0"` and `"2"` are equal.

use super::{Version, parse_component};
use crate::core::{Result, SapError};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A dotted version of any length, compared without its trailing zeros.
#[derive(Debug, Clone)]
pub struct LooseVersion {
    original: String,
    components: Vec<u64>,
}

impl LooseVersion {
    /// Parses a dotted version string.
    ///
    /// # Errors
    ///
    /// Returns [`SapError::InvalidVersion`] for an empty string or any component
    /// that is not a non-negative integer.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SapError::InvalidVersion {
                version: s.to_string(),
                reason: "empty version".to_string(),
            });
        }

        let mut components = trimmed
            .split('.')
            .map(|part| parse_component(s, part))
            .collect::<Result<Vec<_>>>()?;

        while components.last() == Some(&0) {
            components.pop();
        }

        Ok(Self {
            original: trimmed.to_string(),
            components,
        })
    }

    /// The normalized components, trailing zeros removed.
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// The version as it was written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl FromStr for LooseVersion {
    type Err = SapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Version> for LooseVersion {
    fn from(version: Version) -> Self {
        // Display output is always a valid loose version
        let mut components = vec![version.major, version.minor, version.patch];
        while components.last() == Some(&0) {
            components.pop();
        }
        Self {
            original: version.to_string(),
            components,
        }
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| {
                let a = self.components.get(i).copied().unwrap_or(0);
                let b = other.components.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for LooseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LooseVersion {}

impl Hash for LooseVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

/// Compares two version strings.
///
/// # Errors
///
/// Returns [`SapError::InvalidVersion`] if either string is not a dotted
/// integer version.
///
/// # Examples
///
/// ```rust,no_run
/// use sap_cli::version::compare_versions;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_versions("2.0.0", "1.9.9").unwrap(), Ordering::Greater);
/// assert_eq!(compare_versions("2.0.0", "2").unwrap(), Ordering::Equal);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    Ok(LooseVersion::parse(a)?.cmp(&LooseVersion::parse(b)?))
}
