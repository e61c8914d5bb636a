//! Platform and client version handling.
//!
//! Versions follow the Vespa release scheme `major.minor.patch`, optionally
//! followed by a qualifier (`8.0.0-devel`). Missing minor or patch components
//! default to zero.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

/// Errors raised when parsing a version string.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum VersionError {
    /// The input was empty after trimming.
    #[error("version string is empty")]
    Empty,
    /// A numeric component could not be parsed.
    #[error("invalid version '{value}': component '{component}' is not a number")]
    InvalidComponent { value: String, component: String },
    /// More than three numeric components were supplied.
    #[error("invalid version '{value}': expected at most three numeric components")]
    TooManyComponents { value: String },
}

/// Semantic version reported by a client build or a platform node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Version {
    major: u32,
    minor: u32,
    patch: u32,
    qualifier: Option<String>,
}

impl Version {
    pub(crate) const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            qualifier: None,
        }
    }

    /// Whether this is the placeholder version of an unreleased build.
    pub(crate) const fn is_zero(&self) -> bool {
        self.major == 0 && self.minor == 0 && self.patch == 0
    }

    /// The same release line with the patch level bumped by one.
    #[must_use]
    pub(crate) const fn next_patch(&self) -> Self {
        Self::new(self.major, self.minor, self.patch.saturating_add(1))
    }

    /// Check `self` against a minimum, returning the mismatch when `self` is older.
    pub(crate) fn require(&self, minimum: &Self) -> Result<(), IncompatibleVersion> {
        if self < minimum {
            Err(IncompatibleVersion {
                current: self.clone(),
                minimum: minimum.clone(),
            })
        } else {
            Ok(())
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let value = input.trim();
        let value = value.strip_prefix('v').unwrap_or(value);
        if value.is_empty() {
            return Err(VersionError::Empty);
        }

        let (numbers, qualifier) = match value.split_once('-') {
            Some((numbers, qualifier)) => (numbers, Some(qualifier.to_string())),
            None => (value, None),
        };

        let mut components = [0_u32; 3];
        for (index, part) in numbers.split('.').enumerate() {
            let slot = components
                .get_mut(index)
                .ok_or_else(|| VersionError::TooManyComponents {
                    value: value.to_string(),
                })?;
            *slot = part
                .parse::<u32>()
                .map_err(|_| VersionError::InvalidComponent {
                    value: value.to_string(),
                    component: part.to_string(),
                })?;
        }

        let [major, minor, patch] = components;
        Ok(Self {
            major,
            minor,
            patch,
            qualifier: qualifier.filter(|q| !q.is_empty()),
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.qualifier, &other.qualifier) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(left), Some(right)) => left.cmp(right),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Version {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(qualifier) = &self.qualifier {
            write!(formatter, "-{qualifier}")?;
        }
        Ok(())
    }
}

/// A version observed on one side of a connection was older than required.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("platform version is older than required version: {current} < {minimum}")]
pub(crate) struct IncompatibleVersion {
    pub(crate) current: Version,
    pub(crate) minimum: Version,
}

/// Pair of versions that must satisfy `current >= minimum`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VersionRequirement {
    pub(crate) current: Version,
    pub(crate) minimum: Version,
}

impl VersionRequirement {
    pub(crate) fn check(&self) -> Result<(), IncompatibleVersion> {
        self.current.require(&self.minimum)
    }
}

/// How the minimum platform version for a local target is derived from the
/// version the node reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LocalMinimum {
    /// A fixed release is required regardless of what the node reports.
    Fixed(Version),
    /// The node must be at least one patch level beyond what it reports.
    NextPatch,
    /// The reported version is accepted as-is.
    Reported,
}

impl LocalMinimum {
    /// First platform release serving logs through the config server.
    pub(crate) const DEFAULT: Version = Version::new(8, 359, 0);

    pub(crate) fn minimum_for(&self, reported: &Version) -> Version {
        match self {
            Self::Fixed(version) => version.clone(),
            Self::NextPatch => reported.next_patch(),
            Self::Reported => reported.clone(),
        }
    }
}

impl Default for LocalMinimum {
    fn default() -> Self {
        Self::Fixed(Self::DEFAULT)
    }
}

impl FromStr for LocalMinimum {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "next-patch" => Ok(Self::NextPatch),
            "reported" => Ok(Self::Reported),
            other => other.parse().map(Self::Fixed),
        }
    }
}
