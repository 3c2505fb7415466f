//! End-to-end tests for the version-stamping flow against an in-memory
//! source control.

use fwstamp_config::TimestampZone;
use fwstamp_core::header::render_header;
use fwstamp_core::scm::UNKNOWN_COMMIT;
use fwstamp_core::timestamp::build_timestamp;
use fwstamp_core::{
    PlatformIoFlags, ResolvedVersion, TagOutcome, VersionTag, WriteOutcome, stamp,
};
use fwstamp_test_utils::{FakeScm, LogCapture, ScmCall, TestConfigBuilder, TestProject};
use pretty_assertions::assert_eq;
use tracing::Level;

const BUILD_TIME: &str = "2025-06-15 23:40:44 (+02:00)";

fn build_time() -> String {
    BUILD_TIME.to_string()
}

#[test_log::test(tokio::test)]
async fn test_latest_tag_is_written_to_header() {
    let project = TestProject::new();
    let scm = FakeScm::new().with_tags(["v1.2.0", "v1.10.0", "v1.9.5", "release-1", "v1.2"]);
    let config = TestConfigBuilder::new().build();

    let report = stamp(&config.version, project.root(), &scm, build_time(), None)
        .await
        .unwrap();

    assert_eq!(
        report.metadata.version,
        ResolvedVersion::Latest(VersionTag::new(1, 10, 0))
    );
    assert_eq!(report.header, WriteOutcome::Written);
    assert_eq!(report.tag, None);
    assert_eq!(
        project.read("src/version_auto.h"),
        "#pragma once\n\
         \n\
         #define FIRMWARE_VERSION \"v1.10.0\"\n\
         #define FIRMWARE_COMMIT  \"abc1234\"\n\
         #define FIRMWARE_BUILD   \"2025-06-15 23:40:44 (+02:00)\"\n"
    );
    assert_eq!(scm.created_tags(), Vec::<String>::new());
}

#[test_log::test(tokio::test)]
async fn test_identical_metadata_writes_once() {
    let project = TestProject::new();
    let scm = FakeScm::new().with_tags(["v0.4.0"]);
    let config = TestConfigBuilder::new().build();

    let first = stamp(&config.version, project.root(), &scm, build_time(), None)
        .await
        .unwrap();
    let (logs, _guard) = LogCapture::install();
    let second = stamp(&config.version, project.root(), &scm, build_time(), None)
        .await
        .unwrap();

    assert_eq!(first.header, WriteOutcome::Written);
    assert_eq!(second.header, WriteOutcome::Unchanged);
    assert!(logs.contains("version_auto.h already up to date"));
}

#[test_log::test(tokio::test)]
async fn test_bump_tags_and_pushes_new_version() {
    let project = TestProject::new();
    let scm = FakeScm::new().with_tags(["v2.5.9", "v2.4.0"]);
    let config = TestConfigBuilder::new().bump(true).build();

    let report = stamp(&config.version, project.root(), &scm, build_time(), None)
        .await
        .unwrap();

    assert_eq!(report.metadata.version.to_string(), "v2.5.10");
    assert_eq!(report.tag, Some(TagOutcome::Created { pushed: true }));
    assert_eq!(scm.created_tags(), vec!["v2.5.10"]);
    assert!(scm.calls().contains(&ScmCall::PushTag {
        remote: "origin".to_string(),
        name: "v2.5.10".to_string(),
    }));
    assert!(project.read("src/version_auto.h").contains("\"v2.5.10\""));
}

#[tokio::test]
async fn test_existing_tag_is_not_created_or_pushed_again() {
    let scm = FakeScm::new().with_tags(["v1.0.0"]);

    let first = fwstamp_core::tagging::tag_and_push(&scm, "v1.0.1", "origin").await;
    let (logs, _guard) = LogCapture::install();
    let second = fwstamp_core::tagging::tag_and_push(&scm, "v1.0.1", "origin").await;

    assert_eq!(first, TagOutcome::Created { pushed: true });
    assert_eq!(second, TagOutcome::AlreadyExists);
    assert_eq!(scm.created_tags(), vec!["v1.0.1"]);
    assert_eq!(scm.pushed_tags(), vec!["v1.0.1"]);
    assert!(logs.contains("skipping"));
}

#[test_log::test(tokio::test)]
async fn test_override_skips_discovery_bump_and_tagging() {
    let project = TestProject::new();
    let scm = FakeScm::new().with_tags(["v10.0.0"]);
    let config = TestConfigBuilder::new()
        .bump(true)
        .version_override("v9.9.9")
        .build();

    let report = stamp(&config.version, project.root(), &scm, build_time(), None)
        .await
        .unwrap();

    assert_eq!(report.metadata.version.to_string(), "v9.9.9");
    assert_eq!(report.tag, None);
    assert!(!scm.calls().contains(&ScmCall::ListTags));
    assert_eq!(scm.calls(), vec![ScmCall::ShortCommit]);
}

#[test_log::test(tokio::test)]
async fn test_unavailable_git_degrades_to_fallbacks() {
    let project = TestProject::new();
    let scm = FakeScm::unavailable();
    let config = TestConfigBuilder::new().build();

    let report = stamp(&config.version, project.root(), &scm, build_time(), None)
        .await
        .unwrap();

    assert_eq!(report.metadata.version.to_string(), "v0.0.0");
    assert_eq!(report.metadata.commit, UNKNOWN_COMMIT);
    assert_eq!(report.header, WriteOutcome::Written);
    assert_eq!(
        project.read("src/version_auto.h"),
        render_header(&report.metadata)
    );
}

#[tokio::test]
async fn test_bump_with_unavailable_git_still_writes_header() {
    let project = TestProject::new();
    let scm = FakeScm::unavailable();
    let config = TestConfigBuilder::new().bump(true).build();

    let (logs, _guard) = LogCapture::install();
    let report = stamp(&config.version, project.root(), &scm, build_time(), None)
        .await
        .unwrap();

    assert_eq!(report.metadata.version.to_string(), "v0.0.1");
    assert_eq!(report.tag, Some(TagOutcome::Failed));
    assert!(project.exists("src/version_auto.h"));
    assert_eq!(logs.count(Level::WARN, "Failed to create tag"), 1);
}

#[tokio::test]
async fn test_failed_push_is_reported_not_raised() {
    let project = TestProject::new();
    let scm = FakeScm::new().with_tags(["v0.1.0"]).failing_push();
    let config = TestConfigBuilder::new().bump(true).remote("backup").build();

    let (logs, _guard) = LogCapture::install();
    let report = stamp(&config.version, project.root(), &scm, build_time(), None)
        .await
        .unwrap();

    assert_eq!(report.tag, Some(TagOutcome::Created { pushed: false }));
    assert_eq!(scm.created_tags(), vec!["v0.1.1"]);
    assert_eq!(logs.count(Level::WARN, "Failed to push tag"), 1);
}

#[test_log::test(tokio::test)]
async fn test_tagging_can_be_disabled() {
    let project = TestProject::new();
    let scm = FakeScm::new().with_tags(["v0.1.0"]);
    let config = TestConfigBuilder::new().bump(true).push_tags(false).build();

    let report = stamp(&config.version, project.root(), &scm, build_time(), None)
        .await
        .unwrap();

    assert_eq!(report.metadata.version.to_string(), "v0.1.1");
    assert_eq!(report.tag, None);
    assert!(scm.created_tags().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_build_env_receives_version() {
    let project = TestProject::new();
    let scm = FakeScm::new().with_tags(["v3.1.4"]);
    let config = TestConfigBuilder::new().build();
    let mut flags = PlatformIoFlags::new(Vec::new());

    stamp(
        &config.version,
        project.root(),
        &scm,
        build_time(),
        Some(&mut flags),
    )
    .await
    .unwrap();

    assert_eq!(
        String::from_utf8(flags.into_inner()).unwrap(),
        "'-DFIRMWARE_VERSION=\"v3.1.4\"'\n"
    );
}

#[test_log::test(tokio::test)]
async fn test_custom_header_path_is_created() {
    let project = TestProject::new();
    let scm = FakeScm::new();
    let config = TestConfigBuilder::new()
        .header_path("include/generated/fw_version.h")
        .build();

    stamp(&config.version, project.root(), &scm, build_time(), None)
        .await
        .unwrap();

    assert!(project.exists("include/generated/fw_version.h"));
    assert!(!project.exists("src/version_auto.h"));
}

#[test_log::test(tokio::test)]
async fn test_configured_zone_reaches_header() {
    let project = TestProject::new();
    let scm = FakeScm::new().with_tags(["v1.0.0"]);
    let config = TestConfigBuilder::new()
        .timestamp_zone(TimestampZone::Utc)
        .build();

    let build_time = build_timestamp(config.version.timestamp_zone);
    let report = stamp(&config.version, project.root(), &scm, build_time, None)
        .await
        .unwrap();

    assert!(report.metadata.build_time.ends_with(" (UTC)"));
    let header = project.read("src/version_auto.h");
    let build_line = header
        .lines()
        .find(|line| line.starts_with("#define FIRMWARE_BUILD"))
        .unwrap();
    assert!(build_line.ends_with(" (UTC)\""), "got {build_line}");
}
