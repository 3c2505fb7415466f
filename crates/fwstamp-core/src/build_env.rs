//! Host build-system integration.
//!
//! When fwstamp runs under a build system that accepts extra defines, the
//! resolved version is also handed over as a define so compiled code can
//! use it without including the generated header. The host is an optional
//! collaborator: with no [`BuildEnv`] the step is skipped.

use std::io::{self, Write};

use fwstamp_config::EmitTarget;
use tracing::{debug, warn};

use crate::header::{DEFINE_VERSION, c_string_escape};
use crate::version::BuildMetadata;

/// A build system that accepts string defines.
pub trait BuildEnv {
    /// Expose `name` with the string value `value` to the build.
    fn define(&mut self, name: &str, value: &str) -> io::Result<()>;
}

/// PlatformIO dynamic build flags.
///
/// Used as `build_flags = !fwstamp version --emit platformio`; PlatformIO
/// reads the command's stdout as compiler flags.
pub struct PlatformIoFlags<W> {
    out: W,
}

impl<W: Write> PlatformIoFlags<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> BuildEnv for PlatformIoFlags<W> {
    fn define(&mut self, name: &str, value: &str) -> io::Result<()> {
        writeln!(self.out, "'-D{name}=\"{}\"'", c_string_escape(value))
    }
}

/// Cargo build-script environment (`cargo:rustc-env`).
///
/// For Rust firmware whose `build.rs` runs fwstamp; the value becomes
/// available through `env!`.
pub struct CargoBuildEnv<W> {
    out: W,
}

impl<W: Write> CargoBuildEnv<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> BuildEnv for CargoBuildEnv<W> {
    fn define(&mut self, name: &str, value: &str) -> io::Result<()> {
        if value.contains(['\n', '\r']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cargo:rustc-env values cannot span lines",
            ));
        }
        writeln!(self.out, "cargo:rustc-env={name}={value}")
    }
}

/// Build the host integration for `target`, writing to stdout.
pub fn stdout_env(target: EmitTarget) -> Option<Box<dyn BuildEnv>> {
    match target {
        EmitTarget::None => None,
        EmitTarget::PlatformIo => Some(Box::new(PlatformIoFlags::new(io::stdout()))),
        EmitTarget::Cargo => Some(Box::new(CargoBuildEnv::new(io::stdout()))),
    }
}

/// Hand the resolved version to `env`, if there is one.
///
/// Failures are logged; this never aborts the build.
pub fn inject(env: Option<&mut dyn BuildEnv>, meta: &BuildMetadata) {
    let Some(env) = env else {
        debug!("No build environment, skipping define injection");
        return;
    };
    let version = meta.version.to_string();
    if let Err(e) = env.define(DEFINE_VERSION, &version) {
        warn!(error = %e, "Failed to expose version to the build environment");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semver::VersionTag;
    use crate::version::ResolvedVersion;
    use pretty_assertions::assert_eq;

    fn meta(version: ResolvedVersion) -> BuildMetadata {
        BuildMetadata {
            version,
            commit: "abc1234".to_string(),
            build_time: "2025-06-15 23:40:44".to_string(),
        }
    }

    #[test]
    fn test_platformio_flag_line() {
        let mut env = PlatformIoFlags::new(Vec::new());
        inject(
            Some(&mut env),
            &meta(ResolvedVersion::Bumped(VersionTag::new(1, 0, 1))),
        );
        let out = String::from_utf8(env.into_inner()).unwrap();
        assert_eq!(out, "'-DFIRMWARE_VERSION=\"v1.0.1\"'\n");
    }

    #[test]
    fn test_cargo_env_line() {
        let mut env = CargoBuildEnv::new(Vec::new());
        inject(
            Some(&mut env),
            &meta(ResolvedVersion::Override("v9.9.9".to_string())),
        );
        let out = String::from_utf8(env.into_inner()).unwrap();
        assert_eq!(out, "cargo:rustc-env=FIRMWARE_VERSION=v9.9.9\n");
    }

    #[test]
    fn test_cargo_env_rejects_multiline_value() {
        let mut env = CargoBuildEnv::new(Vec::new());
        assert!(env.define("FIRMWARE_VERSION", "v1\nv2").is_err());
        inject(
            Some(&mut env),
            &meta(ResolvedVersion::Override("v1\nv2".to_string())),
        );
        assert!(env.into_inner().is_empty());
    }

    #[test]
    fn test_no_env_is_skipped() {
        inject(None, &meta(ResolvedVersion::Latest(VersionTag::default())));
    }

    #[test]
    fn test_stdout_env_selection() {
        assert!(stdout_env(EmitTarget::None).is_none());
        assert!(stdout_env(EmitTarget::PlatformIo).is_some());
        assert!(stdout_env(EmitTarget::Cargo).is_some());
    }
}
