use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The versioning scheme a version string is interpreted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Semver,
    Maven,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Semver => "semver",
            Self::Maven => "maven",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Scheme {
    type Err = UnknownScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "semver" => Ok(Self::Semver),
            "maven" => Ok(Self::Maven),
            _ => Err(UnknownScheme {
                name: s.to_string(),
            }),
        }
    }
}

/// Raised when a scheme name does not match any supported scheme.
#[derive(Debug, thiserror::Error)]
#[error("unknown versioning scheme '{name}'")]
pub struct UnknownScheme {
    pub name: String,
}
