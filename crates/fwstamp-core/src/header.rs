//! Version header rendering.
//!
//! The header layout is consumed by the firmware build and must stay
//! byte-for-byte stable:
//!
//! ```c
//! #pragma once
//!
//! #define FIRMWARE_VERSION "v1.4.2"
//! #define FIRMWARE_COMMIT  "3f9c2ab"
//! #define FIRMWARE_BUILD   "2025-06-15 23:40:44 (+02:00)"
//! ```
//!
//! The file is only rewritten when its content changes, so an unchanged
//! header never triggers a rebuild.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::version::BuildMetadata;

/// Macro carrying the version string.
pub const DEFINE_VERSION: &str = "FIRMWARE_VERSION";
/// Macro carrying the short commit hash.
pub const DEFINE_COMMIT: &str = "FIRMWARE_COMMIT";
/// Macro carrying the build timestamp.
pub const DEFINE_BUILD: &str = "FIRMWARE_BUILD";

/// Errors writing the header.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Whether a write actually touched the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Escape `value` for use inside a C string literal.
pub fn c_string_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Render the header text for `meta`.
pub fn render_header(meta: &BuildMetadata) -> String {
    let version = c_string_escape(&meta.version.to_string());
    let commit = c_string_escape(&meta.commit);
    let build = c_string_escape(&meta.build_time);
    format!(
        "#pragma once\n\
         \n\
         #define {DEFINE_VERSION} \"{version}\"\n\
         #define {DEFINE_COMMIT}  \"{commit}\"\n\
         #define {DEFINE_BUILD}   \"{build}\"\n"
    )
}

/// Write `content` to `path` unless the file already holds exactly that.
///
/// Missing parent directories are created.
pub async fn write_if_changed(path: &Path, content: &str) -> Result<WriteOutcome, HeaderError> {
    match tokio::fs::read(path).await {
        Ok(existing) if existing == content.as_bytes() => return Ok(WriteOutcome::Unchanged),
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Existing header unreadable, rewriting");
        }
    }

    let to_err = |source| HeaderError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(to_err)?;
    }
    tokio::fs::write(path, content).await.map_err(to_err)?;
    Ok(WriteOutcome::Written)
}

/// Render the header for `meta` and write it to `path` if it changed.
pub async fn write_header_if_changed(
    path: &Path,
    meta: &BuildMetadata,
) -> Result<WriteOutcome, HeaderError> {
    let content = render_header(meta);
    let outcome = write_if_changed(path, &content).await?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match outcome {
        WriteOutcome::Written => info!(
            "Generating {name} with version {}, commit {}",
            meta.version, meta.commit
        ),
        WriteOutcome::Unchanged => info!("{name} already up to date"),
    }
    Ok(outcome)
}
