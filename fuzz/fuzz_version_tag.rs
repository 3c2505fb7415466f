//! Fuzz target for version tag parsing and selection.
//!
//! Run with: cargo +nightly fuzz run fuzz_version_tag
//!
//! Splits the input into lines the way `git tag` output is split, then
//! checks that every accepted tag reparses from its printed form and that the
//! latest tag is never smaller than any accepted one.

#![no_main]

use fwstamp_core::VersionTag;
use fwstamp_core::semver;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let lines: Vec<&str> = s.lines().collect();
    let latest = semver::latest(&lines);

    for line in &lines {
        if let Ok(tag) = line.parse::<VersionTag>() {
            assert_eq!(tag.to_string().parse::<VersionTag>(), Ok(tag));
            assert!(tag <= latest);
            assert!(tag.bump_patch() >= tag);
        }
    }
});
