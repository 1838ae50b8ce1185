use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};

use crate::kernel::constants::CORE_API_VERSION;

/// Error type for version parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Version parse error: {0}")]
    ParseError(String),
}

/// Represents a version requirement range using semver constraints.
#[derive(Debug, Clone)]
pub struct VersionRange {
    /// The original constraint string (e.g., "^1.2.3", ">=2.0")
    constraint: String,
    /// The parsed semver requirement
    req: VersionReq,
}

impl VersionRange {
    /// Creates a new version range from a constraint string.
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let req = VersionReq::parse(constraint).map_err(|e| {
            VersionError::ParseError(format!("Invalid version constraint '{}': {}", constraint, e))
        })?;
        Ok(Self {
            constraint: constraint.to_string(),
            req,
        })
    }

    /// Checks if a specific `semver::Version` satisfies this range.
    pub fn includes(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    /// Parses `version` and checks it against this range.
    pub fn includes_str(&self, version: &str) -> Result<bool, VersionError> {
        let parsed = Version::parse(version.trim())
            .map_err(|e| VersionError::ParseError(format!("Invalid version '{}': {}", version, e)))?;
        Ok(self.includes(&parsed))
    }

    /// Returns the original constraint string.
    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }
}

/// Implement Display to show the original constraint string.
impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

/// Allow parsing directly from a string slice.
impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::from_constraint(s)
    }
}

/// The range of core API versions a plugin declaration may be built against.
///
/// Caret semantics: for a 0.x core only the same minor series is accepted.
pub fn core_api_requirement() -> VersionRange {
    let constraint = format!("^{}", CORE_API_VERSION);
    match VersionRange::from_constraint(&constraint) {
        Ok(range) => range,
        // CORE_API_VERSION is a valid literal
        Err(_) => VersionRange {
            constraint,
            req: VersionReq::STAR,
        },
    }
}
