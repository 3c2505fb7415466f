//! In-memory source control.
//!
//! [`FakeScm`] implements [`SourceControl`] over a tag list held in memory
//! and records every call, so tests can assert exactly which git operations
//! a flow performed without touching a real repository.

use std::io;
use std::sync::{Mutex, MutexGuard};

use fwstamp_core::BoxFuture;
use fwstamp_core::scm::{ScmError, SourceControl};

/// A recorded source-control call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScmCall {
    ListTags,
    ShortCommit,
    TagExists(String),
    CreateTag(String),
    PushTag { remote: String, name: String },
}

#[derive(Debug, Default)]
struct FakeState {
    tags: Vec<String>,
    commit: Option<String>,
    unavailable: bool,
    fail_create: bool,
    fail_push: bool,
    calls: Vec<ScmCall>,
    created: Vec<String>,
}

/// Scriptable [`SourceControl`] for tests.
#[derive(Debug, Default)]
pub struct FakeScm {
    state: Mutex<FakeState>,
}

impl FakeScm {
    /// A repository with no tags and commit `abc1234`.
    pub fn new() -> Self {
        Self::default().with_commit("abc1234")
    }

    /// A source control whose every command fails as if git were not installed.
    pub fn unavailable() -> Self {
        let scm = Self::default();
        scm.lock().unavailable = true;
        scm
    }

    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_commit(self, commit: &str) -> Self {
        self.lock().commit = Some(commit.to_string());
        self
    }

    pub fn failing_create(self) -> Self {
        self.lock().fail_create = true;
        self
    }

    pub fn failing_push(self) -> Self {
        self.lock().fail_push = true;
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ScmCall> {
        self.lock().calls.clone()
    }

    /// Current tag list, including tags created through the fake.
    pub fn tags(&self) -> Vec<String> {
        self.lock().tags.clone()
    }

    /// Tags created successfully through the fake.
    pub fn created_tags(&self) -> Vec<String> {
        self.lock().created.clone()
    }

    /// Names passed to `push_tag` calls, successful or not.
    pub fn pushed_tags(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ScmCall::PushTag { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake scm state poisoned")
    }

    fn record(&self, call: ScmCall) -> Result<MutexGuard<'_, FakeState>, ScmError> {
        let mut state = self.lock();
        let command = describe(&call);
        state.calls.push(call);
        if state.unavailable {
            return Err(ScmError::Spawn {
                command,
                source: io::Error::new(io::ErrorKind::NotFound, "git: command not found"),
            });
        }
        Ok(state)
    }
}

fn describe(call: &ScmCall) -> String {
    match call {
        ScmCall::ListTags => "git tag".to_string(),
        ScmCall::ShortCommit => "git rev-parse --short HEAD".to_string(),
        ScmCall::TagExists(name) => format!("git tag --list {name}"),
        ScmCall::CreateTag(name) => format!("git tag {name}"),
        ScmCall::PushTag { remote, name } => format!("git push {remote} {name}"),
    }
}

fn failed(command: String, stderr: &str) -> ScmError {
    ScmError::Failed {
        command,
        code: 1,
        stderr: stderr.to_string(),
    }
}

impl SourceControl for FakeScm {
    fn list_tags(&self) -> BoxFuture<'_, Result<Vec<String>, ScmError>> {
        Box::pin(async move {
            let state = self.record(ScmCall::ListTags)?;
            Ok(state.tags.clone())
        })
    }

    fn short_commit(&self) -> BoxFuture<'_, Result<String, ScmError>> {
        Box::pin(async move {
            let state = self.record(ScmCall::ShortCommit)?;
            state
                .commit
                .clone()
                .ok_or_else(|| failed(describe(&ScmCall::ShortCommit), "no commits yet"))
        })
    }

    fn tag_exists<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool, ScmError>> {
        Box::pin(async move {
            let state = self.record(ScmCall::TagExists(name.to_string()))?;
            Ok(state.tags.iter().any(|t| t == name))
        })
    }

    fn create_tag<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<(), ScmError>> {
        Box::pin(async move {
            let call = ScmCall::CreateTag(name.to_string());
            let command = describe(&call);
            let mut state = self.record(call)?;
            if state.fail_create {
                return Err(failed(command, "tag creation refused"));
            }
            if state.tags.iter().any(|t| t == name) {
                return Err(failed(command, &format!("tag '{name}' already exists")));
            }
            state.tags.push(name.to_string());
            state.created.push(name.to_string());
            Ok(())
        })
    }

    fn push_tag<'a>(
        &'a self,
        remote: &'a str,
        name: &'a str,
    ) -> BoxFuture<'a, Result<(), ScmError>> {
        Box::pin(async move {
            let call = ScmCall::PushTag {
                remote: remote.to_string(),
                name: name.to_string(),
            };
            let command = describe(&call);
            let state = self.record(call)?;
            if state.fail_push {
                return Err(failed(command, "could not read from remote repository"));
            }
            Ok(())
        })
    }
}
