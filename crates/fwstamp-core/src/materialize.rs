//! Device configuration materialization.
//!
//! The firmware reads a single `data/config.json` from its filesystem image.
//! Each deployment profile keeps its own `data/config.<profile>.json`; this
//! module picks the one for the selected profile, checks that every required
//! key carries a value, and writes it out pretty-printed.
//!
//! A required key is missing when it is absent, an empty string, or `null`.
//! All missing keys are reported at once.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use fwstamp_config::MaterializeConfig;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Errors that stop materialization.
#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("file {} not found", .path.display())]
    SourceMissing { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        source: DocumentError,
    },

    #[error("missing required keys in {}:{}", .path.display(), itemize(.keys))]
    MissingKeys { path: PathBuf, keys: Vec<String> },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn itemize(keys: &[String]) -> String {
    keys.iter().map(|k| format!("\n - {k}")).collect()
}

/// Problems with the content of a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("top level must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Keys holding ESP32 GPIO numbers.
const GPIO_PIN_KEYS: [&str; 5] = ["led_pin", "sensor_pin", "pump_pin", "relay_pin", "battery_pin"];

/// GPIOs addressable on the ESP32.
const GPIO_RANGE: RangeInclusive<i64> = 0..=39;

/// GPIOs wired to the SPI flash/PSRAM.
const FLASH_PINS: RangeInclusive<i64> = 6..=11;

/// Non-negative integer settings and their upper bound, if any.
const INTEGER_LIMITS: [(&str, Option<i64>); 5] = [
    ("moisture_threshold", Some(100)),
    ("pump_duration", Some(3600)),
    ("sleep_hours", Some(24)),
    ("measurement_interval", None),
    ("webserver_timeout", None),
];

/// A flat key/value configuration document. Key order is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument(Map<String, Value>);

impl ConfigDocument {
    /// Parse a JSON object.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DocumentError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Required keys that are absent, `""` or `null`, in the order given.
    pub fn missing_keys<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        required
            .iter()
            .map(AsRef::<str>::as_ref)
            .filter(|key| match self.0.get(*key) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            })
            .map(str::to_string)
            .collect()
    }

    /// Non-fatal observations about known fields.
    ///
    /// These mirror the checks the firmware runs at boot, where a single
    /// failure discards the whole file in favour of built-in defaults. Each
    /// check only applies when its key is present.
    pub fn advisories(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if let Some(port) = self.get("mqtt_port") {
            let valid = match port {
                Value::Number(n) => n.as_u64().is_some_and(|p| (1..=65535).contains(&p)),
                Value::String(s) => s.parse::<u16>().is_ok_and(|p| p != 0),
                _ => false,
            };
            if !valid {
                notes.push(format!(
                    "mqtt_port should be an integer in 1..=65535, got {port}"
                ));
            }
        }

        for key in GPIO_PIN_KEYS {
            match self.integer(key) {
                None => {}
                Some(Err(value)) => {
                    notes.push(format!("{key} should be an integer GPIO number, got {value}"))
                }
                Some(Ok(pin)) if !GPIO_RANGE.contains(&pin) => notes.push(format!(
                    "{key} should be a GPIO in {}..={}, got {pin}",
                    GPIO_RANGE.start(),
                    GPIO_RANGE.end()
                )),
                Some(Ok(pin)) if FLASH_PINS.contains(&pin) => notes.push(format!(
                    "{key} uses GPIO {pin}, which is reserved for flash/PSRAM"
                )),
                Some(Ok(_)) => {}
            }
        }

        for (key, max) in INTEGER_LIMITS {
            match self.integer(key) {
                None => {}
                Some(Err(value)) => notes.push(format!("{key} should be an integer, got {value}")),
                Some(Ok(n)) if n < 0 => {
                    notes.push(format!("{key} must not be negative, got {n}"))
                }
                Some(Ok(n)) => {
                    if let Some(max) = max.filter(|max| n > *max) {
                        notes.push(format!("{key} should be in 0..={max}, got {n}"));
                    }
                }
            }
        }
        notes
    }

    /// `None` when `key` is absent, the raw value when it is not an integer.
    fn integer(&self, key: &str) -> Option<Result<i64, &Value>> {
        let value = self.get(key)?;
        Some(value.as_i64().ok_or(value))
    }

    /// Pretty-printed JSON with two-space indentation and a trailing newline.
    pub fn to_pretty_string(&self) -> String {
        format!("{:#}\n", Value::Object(self.0.clone()))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A validated source document.
#[derive(Debug, Clone)]
pub struct Validated {
    pub source: PathBuf,
    pub document: ConfigDocument,
}

/// Result of a successful materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Select, read and validate the source document without writing anything.
pub async fn check(
    config: &MaterializeConfig,
    project_dir: &Path,
) -> Result<Validated, MaterializeError> {
    let source = project_dir.join(config.source_path());
    debug!(profile = config.profile_token(), source = %source.display(), "Selected config source");

    if !tokio::fs::try_exists(&source).await.unwrap_or(false) {
        return Err(MaterializeError::SourceMissing { path: source });
    }

    let text = match tokio::fs::read_to_string(&source).await {
        Ok(text) => text,
        Err(e) => {
            return Err(MaterializeError::Read {
                path: source,
                source: e,
            });
        }
    };
    let document = match ConfigDocument::parse(&text) {
        Ok(doc) => doc,
        Err(e) => {
            return Err(MaterializeError::Invalid {
                path: source,
                source: e,
            });
        }
    };

    let missing = document.missing_keys(&config.required_keys);
    if !missing.is_empty() {
        return Err(MaterializeError::MissingKeys {
            path: source,
            keys: missing,
        });
    }
    for note in document.advisories() {
        warn!(source = %source.display(), "{note}");
    }

    Ok(Validated { source, document })
}

/// Validate the selected source and write it to the target path.
///
/// The target is always rewritten.
pub async fn materialize(
    config: &MaterializeConfig,
    project_dir: &Path,
) -> Result<Materialized, MaterializeError> {
    let Validated { source, document } = check(config, project_dir).await?;
    let target = project_dir.join(&config.target_path);

    let to_err = |e| MaterializeError::Write {
        path: target.clone(),
        source: e,
    };
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(to_err)?;
    }
    tokio::fs::write(&target, document.to_pretty_string())
        .await
        .map_err(to_err)?;

    info!(
        source = %source.display(),
        target = %target.display(),
        keys = document.len(),
        "Materialized device configuration"
    );
    Ok(Materialized { source, target })
}
