//! Fuzz target for the `fwstamp.toml` parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_tool_config
//!
//! Feeds arbitrary text through `ToolConfig::parse()`, which covers both TOML
//! decoding and validation. Any accepted config must also survive the
//! environment overlay and profile path derivation.

#![no_main]

use fwstamp_config::{EnvOverlay, ToolConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(mut config) = ToolConfig::parse(s) {
        config.apply_env(&EnvOverlay {
            environment: Some(s.chars().take(16).collect()),
            ..EnvOverlay::default()
        });
        let _ = config.materialize.source_path();
    }
});
