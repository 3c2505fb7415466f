#![deny(unsafe_code)]

//! fwstamp core: build-time helpers for ESP32/PlatformIO firmware.
//!
//! Two independent operations live here. Version stamping resolves a
//! semantic version from the repository's tags, renders it into a C header
//! together with the commit hash and build time, and optionally tags and
//! pushes the next patch release. Config materialization picks the device
//! configuration for the selected profile, checks its required keys, and
//! writes it where the filesystem image expects it.

use std::future::Future;
use std::pin::Pin;

/// A boxed `Send` future, returned by the
/// [`SourceControl`](scm::SourceControl) methods so the trait stays usable
/// as `&dyn SourceControl`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Host build-system integration (PlatformIO / Cargo defines).
pub mod build_env;
/// Version header rendering and idempotent writes.
pub mod header;
/// Device configuration selection, validation, and materialization.
pub mod materialize;
/// Source-control access with best-effort fallbacks.
pub mod scm;
/// `vMAJOR.MINOR.PATCH` tags.
pub mod semver;
/// The complete version-stamping flow.
pub mod stamp;
/// Best-effort creation and push of release tags.
pub mod tagging;
/// Build timestamp formatting.
pub mod timestamp;
/// Version selection and build metadata.
pub mod version;

pub use build_env::{BuildEnv, CargoBuildEnv, PlatformIoFlags};
pub use header::WriteOutcome;
pub use materialize::{ConfigDocument, MaterializeError, Materialized};
pub use scm::{GitCli, ScmError, SourceControl};
pub use semver::VersionTag;
pub use stamp::{StampReport, stamp};
pub use tagging::TagOutcome;
pub use version::{BuildMetadata, ResolvedVersion};
