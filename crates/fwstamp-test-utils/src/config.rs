//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`ToolConfig`] values without
//! repeating boilerplate across crate boundaries.

use fwstamp_config::{TimestampZone, ToolConfig};

/// Fluent builder for [`ToolConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .bump(true)
///     .profile("prod")
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: ToolConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ToolConfig::default(),
        }
    }

    pub fn bump(mut self, bump: bool) -> Self {
        self.config.version.bump = bump;
        self
    }

    pub fn version_override(mut self, value: &str) -> Self {
        self.config.version.version_override = Some(value.to_string());
        self
    }

    pub fn header_path(mut self, path: &str) -> Self {
        self.config.version.header_path = path.to_string();
        self
    }

    pub fn remote(mut self, remote: &str) -> Self {
        self.config.version.remote = remote.to_string();
        self
    }

    pub fn push_tags(mut self, enabled: bool) -> Self {
        self.config.version.push_tags = enabled;
        self
    }

    pub fn timestamp_zone(mut self, zone: TimestampZone) -> Self {
        self.config.version.timestamp_zone = zone;
        self
    }

    pub fn profile(mut self, profile: &str) -> Self {
        self.config.materialize.profile = Some(profile.to_string());
        self
    }

    pub fn required_keys(mut self, keys: &[&str]) -> Self {
        self.config.materialize.required_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn target_path(mut self, path: &str) -> Self {
        self.config.materialize.target_path = path.to_string();
        self
    }

    pub fn build(self) -> ToolConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
