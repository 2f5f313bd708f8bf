use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::VersionError;

/// The identifier of the version component a release bumps.
///
/// Core identifiers order as `major > minor > patch`; any other identifier is
/// a prerelease qualifier and sorts below all core identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bump {
    Major,
    Minor,
    Patch,
    Prerelease(String),
}

impl Bump {
    fn rank(&self) -> u8 {
        match self {
            Self::Major => 3,
            Self::Minor => 2,
            Self::Patch => 1,
            Self::Prerelease(_) => 0,
        }
    }

    /// The highest bump identifier, used when a commit is marked breaking.
    #[must_use]
    pub fn highest() -> Self {
        Self::Major
    }

    #[must_use]
    pub fn is_core(&self) -> bool {
        !matches!(self, Self::Prerelease(_))
    }
}

impl Ord for Bump {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Prerelease(a), Self::Prerelease(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Bump {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Bump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
            Self::Prerelease(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for Bump {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            _ => {
                let valid = !s.is_empty()
                    && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
                if valid {
                    Ok(Self::Prerelease(s.to_string()))
                } else {
                    Err(VersionError::MalformedBump {
                        value: s.to_string(),
                    })
                }
            }
        }
    }
}

impl Serialize for Bump {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Bump {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
