//! Version selection and build metadata.
//!
//! [`select_version`] is a pure function of the tag list and the version
//! settings. [`resolve`] wires it to a [`SourceControl`] and a build time to
//! produce the [`BuildMetadata`] that ends up in the header.

use std::fmt;

use fwstamp_config::VersionConfig;
use tracing::info;

use crate::scm::{self, SourceControl};
use crate::semver::{self, VersionTag};

/// The version a build is stamped with, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedVersion {
    /// Explicit override, used verbatim.
    Override(String),
    /// Latest existing version tag.
    Latest(VersionTag),
    /// Latest version tag with the patch component incremented.
    Bumped(VersionTag),
}

impl ResolvedVersion {
    /// The version tag that should be created for this build, if any.
    ///
    /// Only a bumped version is new; an override or the latest tag is not.
    pub fn new_tag(&self) -> Option<VersionTag> {
        match self {
            Self::Bumped(tag) => Some(*tag),
            Self::Override(_) | Self::Latest(_) => None,
        }
    }

    /// Short label describing the origin of the version, for logs.
    pub fn source(&self) -> &'static str {
        match self {
            Self::Override(_) => "override",
            Self::Latest(_) => "latest tag",
            Self::Bumped(_) => "bumped patch",
        }
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override(s) => f.write_str(s),
            Self::Latest(tag) | Self::Bumped(tag) => fmt::Display::fmt(tag, f),
        }
    }
}

/// Everything embedded in the generated header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMetadata {
    pub version: ResolvedVersion,
    /// Short commit hash, or [`UNKNOWN_COMMIT`](scm::UNKNOWN_COMMIT).
    pub commit: String,
    pub build_time: String,
}

/// Pick the version for a build from the known tags.
///
/// An override wins outright. Otherwise the latest valid tag is used, with
/// its patch bumped when `config.bump` is set.
pub fn select_version<S: AsRef<str>>(tags: &[S], config: &VersionConfig) -> ResolvedVersion {
    if let Some(value) = override_value(config) {
        return ResolvedVersion::Override(value.to_string());
    }
    let latest = semver::latest(tags);
    if config.bump {
        ResolvedVersion::Bumped(latest.bump_patch())
    } else {
        ResolvedVersion::Latest(latest)
    }
}

fn override_value(config: &VersionConfig) -> Option<&str> {
    config
        .version_override
        .as_deref()
        .filter(|value| !value.is_empty())
}

/// Resolve the build metadata.
///
/// Tags are only read when no override is configured. Source-control
/// failures degrade to fallbacks, so this never fails.
pub async fn resolve(
    config: &VersionConfig,
    scm: &dyn SourceControl,
    build_time: String,
) -> BuildMetadata {
    let version = if override_value(config).is_some() {
        select_version::<&str>(&[], config)
    } else {
        let tags = scm::discover_tags(scm).await;
        select_version(&tags, config)
    };
    let commit = scm::commit_or_unknown(scm).await;

    info!(
        version = %version,
        source = version.source(),
        commit = %commit,
        "Resolved build version"
    );

    BuildMetadata {
        version,
        commit,
        build_time,
    }
}
