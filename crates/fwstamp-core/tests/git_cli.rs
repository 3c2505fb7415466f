//! `GitCli` against a real repository. Skipped when `git` is not on `PATH`.

use std::path::Path;
use std::process::Command;

use fwstamp_core::scm::{self, UNKNOWN_COMMIT};
use fwstamp_core::tagging::tag_and_push;
use fwstamp_core::{GitCli, SourceControl, TagOutcome, VersionTag, semver};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=fwstamp",
            "-c",
            "user.email=fwstamp@example.invalid",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(output.status.success(), "git {args:?} failed: {output:?}");
}

fn tagged_repo() -> TempDir {
    let tmp = TempDir::new().unwrap();
    git(tmp.path(), &["init", "-q"]);
    git(tmp.path(), &["commit", "-q", "--allow-empty", "-m", "initial"]);
    for tag in ["v1.9.0", "v1.10.0", "junk"] {
        git(tmp.path(), &["tag", tag]);
    }
    tmp
}

#[test_log::test(tokio::test)]
async fn test_tags_are_listed_and_ordered_numerically() {
    if !git_available() {
        eprintln!("git not on PATH, skipping");
        return;
    }
    let repo = tagged_repo();
    let git = GitCli::in_dir(repo.path());

    let mut tags = git.list_tags().await.unwrap();
    tags.sort();
    assert_eq!(tags, vec!["junk", "v1.10.0", "v1.9.0"]);
    assert_eq!(semver::latest(&tags), VersionTag::new(1, 10, 0));
}

#[test_log::test(tokio::test)]
async fn test_tag_exists_matches_whole_names() {
    if !git_available() {
        eprintln!("git not on PATH, skipping");
        return;
    }
    let repo = tagged_repo();
    let git = GitCli::in_dir(repo.path());

    assert!(git.tag_exists("v1.10.0").await.unwrap());
    assert!(!git.tag_exists("v1.1").await.unwrap());
    assert!(!git.tag_exists("v1.10").await.unwrap());
}

#[test_log::test(tokio::test)]
async fn test_tagging_twice_creates_once_without_remote() {
    if !git_available() {
        eprintln!("git not on PATH, skipping");
        return;
    }
    let repo = tagged_repo();
    let git = GitCli::in_dir(repo.path());

    let first = tag_and_push(&git, "v1.10.1", "origin").await;
    let second = tag_and_push(&git, "v1.10.1", "origin").await;

    assert_eq!(first, TagOutcome::Created { pushed: false });
    assert_eq!(second, TagOutcome::AlreadyExists);
    assert!(git.list_tags().await.unwrap().contains(&"v1.10.1".to_string()));
}

#[test_log::test(tokio::test)]
async fn test_short_commit_is_read() {
    if !git_available() {
        eprintln!("git not on PATH, skipping");
        return;
    }
    let repo = tagged_repo();
    let git = GitCli::in_dir(repo.path());

    let commit = scm::commit_or_unknown(&git).await;
    assert_ne!(commit, UNKNOWN_COMMIT);
    assert!(commit.len() >= 4);
    assert!(commit.bytes().all(|b| b.is_ascii_hexdigit()));
}
