//! Semantic version tags of the form `vMAJOR.MINOR.PATCH`.
//!
//! Only that exact shape is accepted: a lowercase `v`, three dot-separated
//! runs of ASCII digits, nothing before or after. Pre-release suffixes,
//! two-component versions and unprefixed numbers are not version tags.

use std::fmt;
use std::str::FromStr;

/// A parsed `vMAJOR.MINOR.PATCH` tag.
///
/// Ordering compares the numeric `(major, minor, patch)` triple, so
/// `v1.9.0 < v1.10.0`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTag {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// Error returned when a string is not a version tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a vMAJOR.MINOR.PATCH tag: {0:?}")]
pub struct ParseTagError(pub String);

impl VersionTag {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// The same version with the patch component incremented by one.
    pub fn bump_patch(self) -> Self {
        Self {
            patch: self.patch.saturating_add(1),
            ..self
        }
    }
}

impl FromStr for VersionTag {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTagError(s.to_string());

        let rest = s.strip_prefix('v').ok_or_else(err)?;
        let mut parts = rest.split('.');
        let mut component = || -> Result<u64, ParseTagError> {
            let part = parts.next().ok_or_else(err)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            part.parse().map_err(|_| err())
        };

        let major = component()?;
        let minor = component()?;
        let patch = component()?;
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The greatest valid version tag among `tags`, or `v0.0.0` if there is none.
///
/// Entries that are not version tags are skipped.
pub fn latest<I, S>(tags: I) -> VersionTag
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .filter_map(|tag| {
            let tag = tag.as_ref();
            match tag.parse::<VersionTag>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::debug!(tag, "Ignoring non-version tag");
                    None
                }
            }
        })
        .max()
        .unwrap_or_default()
}
