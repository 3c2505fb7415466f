//! The `version` flow end to end: resolve, write the header, tag, inject.

use std::path::Path;

use fwstamp_config::VersionConfig;
use tracing::debug;

use crate::build_env::{self, BuildEnv};
use crate::header::{self, HeaderError, WriteOutcome};
use crate::scm::SourceControl;
use crate::tagging::{self, TagOutcome};
use crate::version::{self, BuildMetadata};

/// What a stamping run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampReport {
    pub metadata: BuildMetadata,
    pub header: WriteOutcome,
    /// `None` when no tag was due (no bump, an override, or tagging disabled).
    pub tag: Option<TagOutcome>,
}

/// Stamp the project in `project_dir`.
///
/// Only a failure to write the header is returned as an error. Tagging runs
/// after the header is in place and cannot fail the call.
pub async fn stamp(
    config: &VersionConfig,
    project_dir: &Path,
    scm: &dyn SourceControl,
    build_time: String,
    env: Option<&mut dyn BuildEnv>,
) -> Result<StampReport, HeaderError> {
    let metadata = version::resolve(config, scm, build_time).await;

    let header_path = project_dir.join(&config.header_path);
    let header = header::write_header_if_changed(&header_path, &metadata).await?;

    let tag = match metadata.version.new_tag() {
        Some(new_tag) if config.push_tags => {
            Some(tagging::tag_and_push(scm, &new_tag.to_string(), &config.remote).await)
        }
        Some(new_tag) => {
            debug!(tag = %new_tag, "Tagging disabled");
            None
        }
        None => None,
    };

    build_env::inject(env, &metadata);

    Ok(StampReport {
        metadata,
        header,
        tag,
    })
}
