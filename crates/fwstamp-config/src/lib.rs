#![deny(unsafe_code)]

//! Configuration loading and validation for fwstamp.
//!
//! Loads the optional `fwstamp.toml` file and validates it. Provides the
//! [`ToolConfig`] type as the single configuration value that every fwstamp
//! operation receives, and the [`env`] module that folds the build
//! environment (`ENV`, `USE_NEXT_VERSION`, `FIRMWARE_VERSION_OVERRIDE`) into it.

/// Build-environment overlay.
pub mod env;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use env::EnvOverlay;

/// Placeholder substituted by the profile token in
/// [`MaterializeConfig::source_template`].
pub const PROFILE_PLACEHOLDER: &str = "{profile}";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level tool configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Version header generation and tagging.
    #[serde(default)]
    pub version: VersionConfig,

    /// Device configuration materialization.
    #[serde(default)]
    pub materialize: MaterializeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How the build timestamp is annotated with its time zone.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    /// Local time followed by the UTC offset, e.g. `2025-06-15 23:40:44 (+02:00)`.
    ///
    /// The suffix is always the numeric offset, never a zone abbreviation
    /// such as `CEST`.
    #[default]
    Offset,
    /// UTC time followed by `(UTC)`.
    Utc,
    /// Bare local time.
    None,
}

/// Host build system that receives the resolved version as a define.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitTarget {
    /// No host integration.
    #[default]
    None,
    /// PlatformIO dynamic build flags (`-D` on stdout).
    PlatformIo,
    /// Cargo build script (`cargo:rustc-env=` on stdout).
    Cargo,
}

/// Version header and tagging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
    /// Generated header, relative to the project directory.
    #[serde(default = "default_header_path")]
    pub header_path: String,

    /// Remote that new tags are pushed to.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Whether bump mode creates and pushes the new tag.
    #[serde(default = "default_push_tags")]
    pub push_tags: bool,

    /// Time zone annotation of the build timestamp.
    #[serde(default)]
    pub timestamp_zone: TimestampZone,

    /// Host build system to expose the version to.
    #[serde(default)]
    pub emit: EmitTarget,

    /// Resolve to the latest tag with its patch component incremented.
    #[serde(default)]
    pub bump: bool,

    /// Explicit version used verbatim, bypassing tag discovery.
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    pub version_override: Option<String>,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            header_path: default_header_path(),
            remote: default_remote(),
            push_tags: default_push_tags(),
            timestamp_zone: TimestampZone::default(),
            emit: EmitTarget::default(),
            bump: false,
            version_override: None,
        }
    }
}

fn default_header_path() -> String {
    "src/version_auto.h".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_push_tags() -> bool {
    true
}

/// Device configuration materialization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializeConfig {
    /// Source path template; `{profile}` is replaced by the profile token.
    #[serde(default = "default_source_template")]
    pub source_template: String,

    /// Materialized configuration file, relative to the project directory.
    #[serde(default = "default_target_path")]
    pub target_path: String,

    /// Profile used when no environment is selected.
    #[serde(default = "default_profile")]
    pub default_profile: String,

    /// Prefix stripped from the environment name to obtain the profile token.
    #[serde(default = "default_profile_prefix")]
    pub profile_prefix: String,

    /// Keys that must be present, non-empty and non-null in the source.
    #[serde(default = "default_required_keys")]
    pub required_keys: Vec<String>,

    /// Selected profile token. Usually filled from the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            source_template: default_source_template(),
            target_path: default_target_path(),
            default_profile: default_profile(),
            profile_prefix: default_profile_prefix(),
            required_keys: default_required_keys(),
            profile: None,
        }
    }
}

fn default_source_template() -> String {
    "data/config.{profile}.json".to_string()
}

fn default_target_path() -> String {
    "data/config.json".to_string()
}

fn default_profile() -> String {
    "example".to_string()
}

fn default_profile_prefix() -> String {
    "esp32-".to_string()
}

fn default_required_keys() -> Vec<String> {
    [
        "wifi_ssid",
        "wifi_password",
        "mqtt_broker",
        "mqtt_username",
        "mqtt_password",
        "mqtt_port",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl MaterializeConfig {
    /// The profile token in effect: the selected one, else the default.
    pub fn profile_token(&self) -> &str {
        self.profile.as_deref().unwrap_or(&self.default_profile)
    }

    /// Derive a profile token from an environment name.
    ///
    /// Strips [`profile_prefix`](Self::profile_prefix) when present. Returns
    /// `None` for an empty name so the default profile applies.
    pub fn profile_from_env_name(&self, env_name: &str) -> Option<String> {
        if env_name.is_empty() {
            return None;
        }
        let token = env_name
            .strip_prefix(self.profile_prefix.as_str())
            .unwrap_or(env_name);
        Some(token.to_string())
    }

    /// Source path for the current profile, relative to the project directory.
    pub fn source_path(&self) -> String {
        self.source_template
            .replace(PROFILE_PLACEHOLDER, self.profile_token())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ToolConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: ToolConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: ToolConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Fold the build environment into this configuration.
    ///
    /// Variables that are unset leave the file values untouched.
    pub fn apply_env(&mut self, overlay: &EnvOverlay) {
        if let Some(name) = overlay.environment.as_deref() {
            if let Some(token) = self.materialize.profile_from_env_name(name) {
                tracing::debug!(env = name, profile = %token, "Profile selected from environment");
                self.materialize.profile = Some(token);
            }
        }
        if let Some(flag) = overlay.use_next_version.as_deref() {
            self.version.bump = env::parse_flag(flag);
        }
        if let Some(value) = overlay.version_override.as_deref() {
            if !value.is_empty() {
                self.version.version_override = Some(value.to_string());
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.header_path.is_empty() {
            return Err(ConfigError::Validation(
                "version.header_path must not be empty".to_string(),
            ));
        }
        if self.version.remote.is_empty() {
            return Err(ConfigError::Validation(
                "version.remote must not be empty".to_string(),
            ));
        }
        if let Some(value) = &self.version.version_override {
            if value.is_empty() {
                return Err(ConfigError::Validation(
                    "version.override must not be empty when set".to_string(),
                ));
            }
        }

        let m = &self.materialize;
        if !m.source_template.contains(PROFILE_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "materialize.source_template must contain {PROFILE_PLACEHOLDER:?}, got {:?}",
                m.source_template
            )));
        }
        if m.target_path.is_empty() {
            return Err(ConfigError::Validation(
                "materialize.target_path must not be empty".to_string(),
            ));
        }
        if m.default_profile.is_empty() {
            return Err(ConfigError::Validation(
                "materialize.default_profile must not be empty".to_string(),
            ));
        }
        for (i, key) in m.required_keys.iter().enumerate() {
            if key.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "materialize.required_keys[{i}] must not be empty"
                )));
            }
        }

        Ok(())
    }
}
