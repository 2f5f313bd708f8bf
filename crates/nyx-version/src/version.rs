use std::cmp::Ordering;
use std::fmt;

use semver::Prerelease;

use crate::maven::MavenVersion;
use crate::{Bump, Scheme, VersionError};

/// A version value tagged by the scheme it was parsed under.
///
/// Values are immutable; every bump operation produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Version {
    Semver(semver::Version),
    Maven(MavenVersion),
}

impl Version {
    /// # Errors
    ///
    /// Returns [`VersionError::Malformed`] if `value` does not parse under
    /// `scheme`.
    pub fn parse(scheme: Scheme, value: &str) -> Result<Self, VersionError> {
        match scheme {
            Scheme::Semver => semver::Version::parse(value)
                .map(Self::Semver)
                .map_err(|_| VersionError::Malformed {
                    value: value.to_string(),
                    scheme,
                }),
            Scheme::Maven => MavenVersion::parse(value).map(Self::Maven),
        }
    }

    /// Parses tolerating an arbitrary textual prefix (`v1.2.3`, `rel-1.2.3`).
    /// The prefix is dropped and never reproduced when rendering.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Malformed`] if no parseable version follows
    /// the prefix.
    pub fn parse_lenient(scheme: Scheme, value: &str) -> Result<Self, VersionError> {
        let start = value
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit())
            .map(|(i, _)| i)
            .ok_or_else(|| VersionError::Malformed {
                value: value.to_string(),
                scheme,
            })?;
        Self::parse(scheme, &value[start..]).map_err(|_| VersionError::Malformed {
            value: value.to_string(),
            scheme,
        })
    }

    #[must_use]
    pub fn valid(scheme: Scheme, value: &str) -> bool {
        Self::parse(scheme, value).is_ok()
    }

    /// The initial version used when the repository has no release tags yet.
    #[must_use]
    pub fn default_initial(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Semver => Self::Semver(semver::Version::new(0, 1, 0)),
            Scheme::Maven => Self::Maven(MavenVersion::from_digits(vec![0, 1, 0])),
        }
    }

    #[must_use]
    pub fn scheme(&self) -> Scheme {
        match self {
            Self::Semver(_) => Scheme::Semver,
            Self::Maven(_) => Scheme::Maven,
        }
    }

    /// Applies `bump` and returns the new value.
    ///
    /// Core bumps reset the lower components and drop any prerelease tail.
    /// A prerelease bump increments the numeric tail of the matching
    /// qualifier, or attaches `<id>.1` leaving the core untouched.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::MalformedPrerelease`] if the qualifier cannot
    /// form a legal prerelease identifier under the scheme.
    pub fn bump(&self, bump: &Bump) -> Result<Self, VersionError> {
        match self {
            // A prerelease that already sits on the target boundary is
            // completed rather than bumped past it (1.3.0-alpha.2 + minor
            // yields 1.3.0, not 1.4.0).
            Self::Semver(v) => match bump {
                Bump::Major => {
                    if !v.pre.is_empty() && v.minor == 0 && v.patch == 0 {
                        Ok(Self::Semver(semver::Version::new(v.major, 0, 0)))
                    } else {
                        Ok(Self::Semver(semver::Version::new(v.major + 1, 0, 0)))
                    }
                }
                Bump::Minor => {
                    if !v.pre.is_empty() && v.patch == 0 {
                        Ok(Self::Semver(semver::Version::new(v.major, v.minor, 0)))
                    } else {
                        Ok(Self::Semver(semver::Version::new(v.major, v.minor + 1, 0)))
                    }
                }
                Bump::Patch => {
                    if v.pre.is_empty() {
                        Ok(Self::Semver(semver::Version::new(
                            v.major,
                            v.minor,
                            v.patch + 1,
                        )))
                    } else {
                        Ok(Self::Semver(semver::Version::new(v.major, v.minor, v.patch)))
                    }
                }
                Bump::Prerelease(id) => {
                    let next = match split_prerelease(v.pre.as_str()) {
                        Some((tag, number)) if tag == id.as_str() => number + 1,
                        _ => 1,
                    };
                    self.with_prerelease(id, next)
                }
            },
            Self::Maven(v) => match bump {
                Bump::Major => Ok(Self::Maven(v.bump_digit(0))),
                Bump::Minor => Ok(Self::Maven(v.bump_digit(1))),
                Bump::Patch => Ok(Self::Maven(v.bump_digit(2))),
                Bump::Prerelease(id) => {
                    let next = match v
                        .qualifier()
                        .and_then(|q| split_qualifier(q, '-'))
                    {
                        Some((tag, number)) if tag == id.as_str() => number + 1,
                        _ => 1,
                    };
                    Ok(Self::Maven(v.with_qualifier(&format!("{id}-{next}"))))
                }
            },
        }
    }

    /// Replaces the prerelease tail with `<qualifier>.<number>`.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::MalformedPrerelease`] if the qualifier cannot
    /// form a legal prerelease identifier under the scheme.
    pub fn with_prerelease(&self, qualifier: &str, number: u64) -> Result<Self, VersionError> {
        match self {
            Self::Semver(v) => {
                let tail = format!("{qualifier}.{number}");
                let pre = Prerelease::new(&tail).map_err(|_| {
                    VersionError::MalformedPrerelease {
                        value: tail.clone(),
                    }
                })?;
                let mut next = v.clone();
                next.pre = pre;
                next.build = semver::BuildMetadata::EMPTY;
                Ok(Self::Semver(next))
            }
            Self::Maven(v) => Ok(Self::Maven(
                v.with_qualifier(&format!("{qualifier}-{number}")),
            )),
        }
    }

    /// The numeric tail of the prerelease when its qualifier matches, `0`
    /// when the tail is the bare qualifier, `None` otherwise.
    #[must_use]
    pub fn prerelease_number(&self, qualifier: &str) -> Option<u64> {
        match self {
            Self::Semver(v) => {
                if v.pre.as_str() == qualifier {
                    return Some(0);
                }
                match split_prerelease(v.pre.as_str()) {
                    Some((tag, number)) if tag == qualifier => Some(number),
                    _ => None,
                }
            }
            Self::Maven(v) => {
                let q = v.qualifier()?;
                if q == qualifier {
                    return Some(0);
                }
                match split_qualifier(q, '-') {
                    Some((tag, number)) if tag == qualifier => Some(number),
                    _ => None,
                }
            }
        }
    }

    /// The version with any prerelease tail and build metadata stripped.
    #[must_use]
    pub fn core(&self) -> Self {
        match self {
            Self::Semver(v) => Self::Semver(semver::Version::new(v.major, v.minor, v.patch)),
            Self::Maven(v) => Self::Maven(v.without_qualifier()),
        }
    }

    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        match self {
            Self::Semver(v) => !v.pre.is_empty(),
            Self::Maven(v) => v.qualifier().is_some(),
        }
    }

    /// Selects the greatest among the candidates that pass the filter.
    pub fn most_recent<I, F>(candidates: I, mut filter: F) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
        F: FnMut(&Self) -> bool,
    {
        candidates.into_iter().filter(|v| filter(v)).max()
    }
}

fn split_prerelease(pre: &str) -> Option<(&str, u64)> {
    split_qualifier(pre, '.')
}

fn split_qualifier(value: &str, separator: char) -> Option<(&str, u64)> {
    let (tag, tail) = value.rsplit_once(separator)?;
    let number = tail.parse::<u64>().ok()?;
    Some((tag, number))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semver(v) => write!(f, "{v}"),
            Self::Maven(v) => write!(f, "{v}"),
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // SemVer precedence first (build metadata is opaque to ordering),
            // full comparison only as an equality-consistent tie break
            (Self::Semver(a), Self::Semver(b)) => {
                a.cmp_precedence(b).then_with(|| a.cmp(b))
            }
            (Self::Maven(a), Self::Maven(b)) => a.cmp(b),
            (Self::Semver(_), Self::Maven(_)) => Ordering::Less,
            (Self::Maven(_), Self::Semver(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
