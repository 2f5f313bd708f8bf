use std::cmp::Ordering;
use std::fmt;

use crate::{Scheme, VersionError};

/// A Maven-style version: a dot-separated numeric core with an optional
/// textual qualifier after the first dash (`1.2.3-beta-2`).
///
/// Cores of different lengths compare with zero extension, and a qualified
/// version sorts below the same core without a qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenVersion {
    digits: Vec<u64>,
    qualifier: Option<String>,
}

impl MavenVersion {
    pub(crate) fn from_digits(digits: Vec<u64>) -> Self {
        Self {
            digits,
            qualifier: None,
        }
    }

    pub fn parse(value: &str) -> Result<Self, VersionError> {
        let malformed = || VersionError::Malformed {
            value: value.to_string(),
            scheme: Scheme::Maven,
        };

        let (core, qualifier) = match value.split_once('-') {
            Some((core, qualifier)) if !qualifier.is_empty() => {
                (core, Some(qualifier.to_string()))
            }
            Some(_) => return Err(malformed()),
            None => (value, None),
        };

        if core.is_empty() {
            return Err(malformed());
        }

        let digits = core
            .split('.')
            .map(|field| {
                if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
                    Err(malformed())
                } else {
                    field.parse::<u64>().map_err(|_| malformed())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { digits, qualifier })
    }

    #[must_use]
    pub fn digit(&self, index: usize) -> u64 {
        self.digits.get(index).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Bumps the numeric component at `index`, resetting lower components and
    /// dropping any qualifier. The core is extended with zeros when shorter
    /// than the bumped position.
    #[must_use]
    pub fn bump_digit(&self, index: usize) -> Self {
        let mut digits = self.digits.clone();
        if digits.len() <= index {
            digits.resize(index + 1, 0);
        }
        digits[index] += 1;
        for lower in digits.iter_mut().skip(index + 1) {
            *lower = 0;
        }
        Self {
            digits,
            qualifier: None,
        }
    }

    #[must_use]
    pub fn with_qualifier(&self, qualifier: &str) -> Self {
        Self {
            digits: self.digits.clone(),
            qualifier: Some(qualifier.to_string()),
        }
    }

    #[must_use]
    pub fn without_qualifier(&self) -> Self {
        Self {
            digits: self.digits.clone(),
            qualifier: None,
        }
    }
}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self
            .digits
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        match &self.qualifier {
            Some(qualifier) => write!(f, "{core}-{qualifier}"),
            None => write!(f, "{core}"),
        }
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let fields = self.digits.len().max(other.digits.len());
        for i in 0..fields {
            match self.digit(i).cmp(&other.digit(i)) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        // a qualified version precedes the bare core
        match (&self.qualifier, &other.qualifier) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
