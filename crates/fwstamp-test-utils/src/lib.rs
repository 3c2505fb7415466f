#![deny(unsafe_code)]

//! Shared test utilities for the fwstamp workspace.
//!
//! Provides config builders, an in-memory source-control fake, temporary
//! project directories, and a log capture layer so that individual crate tests
//! stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! fwstamp-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod fake_scm;
pub mod log_capture;
pub mod project;

pub use config::TestConfigBuilder;
pub use fake_scm::{FakeScm, ScmCall};
pub use log_capture::{LogCapture, LogReader};
pub use project::TestProject;
