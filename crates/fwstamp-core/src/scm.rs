//! Source-control access.
//!
//! [`SourceControl`] is the seam between version stamping and git. The
//! [`GitCli`] implementation shells out to the `git` binary. Reads go
//! through [`discover_tags`] and [`commit_or_unknown`], which turn any
//! failure into a fallback value so a missing or broken git never stops a
//! build.

use std::path::PathBuf;
use std::process::Output;

use tracing::{debug, warn};

use crate::BoxFuture;

/// Commit placeholder used when the hash cannot be determined.
pub const UNKNOWN_COMMIT: &str = "unknown";

/// Errors from a source-control command.
#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited with status {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("`{command}` produced non UTF-8 output")]
    Utf8 { command: String },
}

/// Operations version stamping needs from source control.
pub trait SourceControl: Send + Sync {
    /// All tag names, one per entry, in no particular order.
    fn list_tags(&self) -> BoxFuture<'_, Result<Vec<String>, ScmError>>;

    /// Abbreviated hash of the checked-out commit.
    fn short_commit(&self) -> BoxFuture<'_, Result<String, ScmError>>;

    /// Whether a tag with exactly this name exists.
    fn tag_exists<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool, ScmError>>;

    /// Create a lightweight tag at the checked-out commit.
    fn create_tag<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<(), ScmError>>;

    /// Push a single tag to `remote`.
    fn push_tag<'a>(&'a self, remote: &'a str, name: &'a str)
    -> BoxFuture<'a, Result<(), ScmError>>;
}

/// Tag names from `scm`, or an empty list if they cannot be read.
pub async fn discover_tags(scm: &dyn SourceControl) -> Vec<String> {
    match scm.list_tags().await {
        Ok(tags) => {
            debug!(count = tags.len(), "Discovered tags");
            tags
        }
        Err(e) => {
            warn!(error = %e, "Tag discovery unavailable, assuming no tags");
            Vec::new()
        }
    }
}

/// Short commit hash from `scm`, or [`UNKNOWN_COMMIT`].
pub async fn commit_or_unknown(scm: &dyn SourceControl) -> String {
    match scm.short_commit().await {
        Ok(hash) if !hash.is_empty() => hash,
        Ok(_) => UNKNOWN_COMMIT.to_string(),
        Err(e) => {
            warn!(error = %e, "Commit hash unavailable");
            UNKNOWN_COMMIT.to_string()
        }
    }
}

/// [`SourceControl`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    /// Git binary path.
    git_bin: PathBuf,
    /// Working tree the commands run in.
    repo_dir: PathBuf,
}

impl GitCli {
    /// Use `git_bin` inside `repo_dir`.
    pub fn new(git_bin: impl Into<PathBuf>, repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            git_bin: git_bin.into(),
            repo_dir: repo_dir.into(),
        }
    }

    /// Use `git` from `PATH` inside `repo_dir`.
    pub fn in_dir(repo_dir: impl Into<PathBuf>) -> Self {
        Self::new("git", repo_dir)
    }

    async fn output(&self, args: &[&str]) -> Result<Output, ScmError> {
        let command = format!("git {}", args.join(" "));
        debug!(%command, dir = %self.repo_dir.display(), "Running git");

        let output = tokio::process::Command::new(&self.git_bin)
            .args(args)
            .current_dir(&self.repo_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ScmError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ScmError::Failed {
                command,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    async fn stdout(&self, args: &[&str]) -> Result<String, ScmError> {
        let output = self.output(args).await?;
        String::from_utf8(output.stdout).map_err(|_| ScmError::Utf8 {
            command: format!("git {}", args.join(" ")),
        })
    }
}

impl SourceControl for GitCli {
    fn list_tags(&self) -> BoxFuture<'_, Result<Vec<String>, ScmError>> {
        Box::pin(async move {
            let out = self.stdout(&["tag"]).await?;
            Ok(out.lines().map(str::to_string).collect())
        })
    }

    fn short_commit(&self) -> BoxFuture<'_, Result<String, ScmError>> {
        Box::pin(async move {
            let out = self.stdout(&["rev-parse", "--short", "HEAD"]).await?;
            Ok(out.trim().to_string())
        })
    }

    fn tag_exists<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool, ScmError>> {
        Box::pin(async move {
            let out = self.stdout(&["tag", "--list", name]).await?;
            Ok(out.lines().any(|line| line == name))
        })
    }

    fn create_tag<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<(), ScmError>> {
        Box::pin(async move {
            self.output(&["tag", name]).await?;
            Ok(())
        })
    }

    fn push_tag<'a>(
        &'a self,
        remote: &'a str,
        name: &'a str,
    ) -> BoxFuture<'a, Result<(), ScmError>> {
        Box::pin(async move {
            self.output(&["push", remote, name]).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_git_binary_is_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let git = GitCli::new("/nonexistent/bin/git", tmp.path());
        let err = git.list_tags().await.unwrap_err();
        assert!(matches!(err, ScmError::Spawn { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fallbacks_when_git_is_missing() {
        let tmp = TempDir::new().unwrap();
        let git = GitCli::new("/nonexistent/bin/git", tmp.path());
        assert!(discover_tags(&git).await.is_empty());
        assert_eq!(commit_or_unknown(&git).await, UNKNOWN_COMMIT);
    }

    #[test]
    fn test_scm_error_display() {
        let err = ScmError::Failed {
            command: "git tag".to_string(),
            code: 128,
            stderr: "fatal: not a git repository".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`git tag` exited with status 128: fatal: not a git repository"
        );
    }
}
