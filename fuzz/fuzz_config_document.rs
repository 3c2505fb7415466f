//! Fuzz target for device configuration documents.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_document
//!
//! Parses arbitrary JSON as a `ConfigDocument`, runs the required-key and
//! advisory checks, and re-parses the pretty-printed output, which must
//! yield the same document.

#![no_main]

use fwstamp_core::ConfigDocument;
use libfuzzer_sys::fuzz_target;

const REQUIRED: [&str; 6] = [
    "wifi_ssid",
    "wifi_password",
    "mqtt_broker",
    "mqtt_username",
    "mqtt_password",
    "mqtt_port",
];

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(doc) = ConfigDocument::parse(s) else {
        return;
    };

    let missing = doc.missing_keys(&REQUIRED);
    assert!(missing.len() <= REQUIRED.len());
    let _ = doc.advisories();

    let reparsed = ConfigDocument::parse(&doc.to_pretty_string()).expect("pretty output must parse");
    assert_eq!(reparsed, doc);
});
