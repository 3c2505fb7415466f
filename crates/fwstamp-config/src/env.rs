//! Build-environment variables read once at startup.
//!
//! The overlay is captured through a lookup function so that nothing below
//! the CLI entry point touches the process environment.

/// PlatformIO environment name, e.g. `esp32-prod`.
pub const ENV_PROFILE: &str = "ENV";

/// Boolean-like flag selecting patch-bump mode.
pub const ENV_BUMP: &str = "USE_NEXT_VERSION";

/// Explicit version string that bypasses tag discovery.
pub const ENV_OVERRIDE: &str = "FIRMWARE_VERSION_OVERRIDE";

/// Raw values of the build-environment variables.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvOverlay {
    /// Value of [`ENV_PROFILE`].
    pub environment: Option<String>,
    /// Value of [`ENV_BUMP`].
    pub use_next_version: Option<String>,
    /// Value of [`ENV_OVERRIDE`].
    pub version_override: Option<String>,
}

impl EnvOverlay {
    /// Capture the overlay using an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            environment: lookup(ENV_PROFILE),
            use_next_version: lookup(ENV_BUMP),
            version_override: lookup(ENV_OVERRIDE),
        }
    }

    /// Capture the overlay from the current process environment.
    pub fn from_process_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

/// Interpret a boolean-like environment value.
///
/// `1`, `true`, `yes` and `on` (any case, surrounding whitespace ignored) are
/// true; everything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
