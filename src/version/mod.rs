//! Version parsing and ordering for SAP packages.
//!
//! SAP versions are dotted non-negative integers. Two forms exist:
//!
//! - [`Version`] - the strict `major.minor.patch` form, required wherever a
//!   version is bumped (see [`Version::increment`])
//! - [`comparison::LooseVersion`] - any number of components, compared after
//!   dropping trailing zero components, so `"1.2.0"` equals `"1.2"`
//!
//! Ordering is exposed through [`Ord`] and [`compare_versions`], which returns a
//! plain [`std::cmp::Ordering`].
//!
//! # Module Organization
//!
//! - [`comparison`] - loose parsing and tri-state comparison
//! - [`requirement`] - `>=`, `<=`, `==`, `!=` requirements used when picking a
//!   package version to install
//!
//! # Examples
//!
//! ```rust,no_run
//! use sap_cli::version::{Version, compare_versions};
//! use std::cmp::Ordering;
//!
//! # fn example() -> sap_cli::core::Result<()> {
//! assert_eq!(compare_versions("1.2.0", "1.2")?, Ordering::Equal);
//! assert_eq!(compare_versions("1.9.0", "1.10.0")?, Ordering::Less);
//!
//! let mut version: Version = "0.0.1".parse()?;
//! version.increment(0, 0, 1)?;
//! assert_eq!(version.to_string(), "0.0.2");
//! # Ok(())
//! # }
//! ```

pub mod comparison;
pub mod requirement;

pub use comparison::{LooseVersion, compare_versions};
pub use requirement::{RequirementOp, VersionRequirement};

use crate::core::SapError;
use std::fmt;
use std::str::FromStr;

/// A strict three-component version.
///
/// Field order makes the derived ordering component-wise, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Adds the given deltas to the respective components.
    ///
    /// Lower components are not reset: `1.2.3` incremented by `(0, 1, 0)`
    /// becomes `1.3.3`. The version is left unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns [`SapError::InvalidVersion`] if a component would overflow.
    pub fn increment(&mut self, major: u64, minor: u64, patch: u64) -> Result<(), SapError> {
        let overflow = || SapError::InvalidVersion {
            version: self.to_string(),
            reason: "component too large to increment".to_string(),
        };
        let bumped = Self {
            major: self.major.checked_add(major).ok_or_else(overflow)?,
            minor: self.minor.checked_add(minor).ok_or_else(overflow)?,
            patch: self.patch.checked_add(patch).ok_or_else(overflow)?,
        };
        *self = bumped;
        Ok(())
    }

    /// Returns the version with its patch component bumped by one.
    ///
    /// This is the default bump applied when a package is recommitted without
    /// an explicit version.
    ///
    /// # Errors
    ///
    /// Returns [`SapError::InvalidVersion`] if the patch component overflows.
    pub fn next_patch(mut self) -> Result<Self, SapError> {
        self.increment(0, 0, 1)?;
        Ok(self)
    }
}

impl FromStr for Version {
    type Err = SapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() != 3 {
            return Err(SapError::InvalidVersion {
                version: s.to_string(),
                reason: format!("expected major.minor.patch, found {} components", parts.len()),
            });
        }

        let component = |part: &str| parse_component(s, part);

        Ok(Self {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
        })
    }
}

/// Parses one dotted component of `version`: ASCII digits only, so signs and
/// whitespace are rejected.
pub(crate) fn parse_component(version: &str, part: &str) -> Result<u64, SapError> {
    let invalid = |reason: String| SapError::InvalidVersion {
        version: version.to_string(),
        reason,
    };
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!("'{part}' is not a non-negative integer")));
    }
    part.parse::<u64>().map_err(|_| invalid(format!("'{part}' is too large")))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
