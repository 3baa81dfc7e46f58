//! Simple version requirements such as `>=1.0` or `!=2.1.3`.
//!
//! Requirements come from package specifications given on the command line
//! (`sap save demo>=1.2`). They only filter candidate versions; there is no
//! range intersection or dependency resolution.

use super::LooseVersion;
use crate::core::Result;
use std::fmt;

/// Comparison operator of a [`VersionRequirement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementOp {
    GreaterOrEqual,
    LessOrEqual,
    Equal,
    NotEqual,
}

impl RequirementOp {
    /// Operators in the order they are searched for in a package specification.
    pub const ALL: [Self; 4] = [Self::GreaterOrEqual, Self::LessOrEqual, Self::Equal, Self::NotEqual];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

/// An operator plus the version it compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequirement {
    pub op: RequirementOp,
    pub version: LooseVersion,
}

impl VersionRequirement {
    /// Builds a requirement from an operator and a version string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::core::SapError::InvalidVersion`] if `version` is malformed.
    pub fn new(op: RequirementOp, version: &str) -> Result<Self> {
        Ok(Self {
            op,
            version: LooseVersion::parse(version)?,
        })
    }

    /// Whether `candidate` satisfies the requirement.
    #[must_use]
    pub fn matches(&self, candidate: &LooseVersion) -> bool {
        match self.op {
            RequirementOp::GreaterOrEqual => candidate >= &self.version,
            RequirementOp::LessOrEqual => candidate <= &self.version,
            RequirementOp::Equal => candidate == &self.version,
            RequirementOp::NotEqual => candidate != &self.version,
        }
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)
    }
}
