//! Release version validation.
//!
//! The requested version must follow semantic versioning and be strictly
//! greater than the version currently recorded for the root project.

use std::fmt;

use semver::Version;
use thiserror::Error;

/// One of the three numeric components of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionComponent::Major => "Major",
            VersionComponent::Minor => "Minor",
            VersionComponent::Patch => "Patch",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error(
        "Version \"{0}\" must follow Semantic Versioning. For details please see: https://semver.org/"
    )]
    Invalid(String),

    #[error("Same Version Error - The version specified ({0}) is the same as the current version.")]
    Same(String),

    #[error(
        "{component} Version Error - The version specified ({requested}) is lower than current version ({current})."
    )]
    Regression {
        component: VersionComponent,
        current: String,
        requested: String,
    },
}

/// Version checks - pure functions, no I/O.
pub struct VersionCheck;

impl VersionCheck {
    /// Parse a version against the `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]` grammar.
    pub fn parse(raw: &str) -> Result<Version, VersionError> {
        Version::parse(raw).map_err(|_| VersionError::Invalid(raw.to_string()))
    }

    /// Check that `requested` may replace `current`.
    ///
    /// Only major, minor and patch are compared, in that order. Pre-release and
    /// build suffixes are ignored, so `1.2.3-beta` is accepted over `1.2.3`.
    pub fn check_upgrade(current: &str, requested: &str) -> Result<(), VersionError> {
        let cur = Self::parse(current)?;
        let req = Self::parse(requested)?;

        if cur == req {
            return Err(VersionError::Same(requested.to_string()));
        }

        let regression = |component| VersionError::Regression {
            component,
            current: current.to_string(),
            requested: requested.to_string(),
        };

        if cur.major > req.major {
            return Err(regression(VersionComponent::Major));
        }
        if cur.major == req.major {
            if cur.minor > req.minor {
                return Err(regression(VersionComponent::Minor));
            }
            if cur.minor == req.minor && cur.patch > req.patch {
                return Err(regression(VersionComponent::Patch));
            }
        }
        Ok(())
    }
}
