//! Temporary firmware project directories.
//!
//! [`TestProject`] owns a temp directory laid out like a PlatformIO project
//! (`src/`, `data/`). It is deleted when the value is dropped, even on panic.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A device configuration carrying every required key.
pub const COMPLETE_DEVICE_CONFIG: &str = r#"{
  "wifi_ssid": "greenhouse",
  "wifi_password": "s3cret-wifi",
  "mqtt_broker": "broker.example.net",
  "mqtt_username": "pump-01",
  "mqtt_password": "s3cret-mqtt",
  "mqtt_port": 8883,
  "sensor_pin": 32,
  "use_pump": true
}"#;

/// A device configuration lacking `wifi_password` (empty) and `mqtt_port` (absent).
pub const INCOMPLETE_DEVICE_CONFIG: &str = r#"{
  "wifi_ssid": "greenhouse",
  "wifi_password": "",
  "mqtt_broker": "broker.example.net",
  "mqtt_username": "pump-01",
  "mqtt_password": "s3cret-mqtt"
}"#;

/// A throwaway project directory.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `rel` inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, content).expect("failed to write test file");
        path
    }

    /// Write a device configuration for `profile` at the default source path.
    pub fn write_profile(&self, profile: &str, content: &str) -> PathBuf {
        self.write(&format!("data/config.{profile}.json"), content)
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("failed to read test file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
