//! Scripted doubles for the process and comment seams.
//!
//! # Thread Safety
//!
//! Both types are `Send + Sync + Clone`; clones share state through
//! `Arc<RwLock<_>>`, so a test can keep a handle and inspect what the code
//! under test recorded.

use crate::errors::{CommentError, ExecutionError};
use crate::io::traits::{Comment, CommentApi, Invocation, ProcessOutput, ProcessRunner};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
enum Script {
    Exit(ProcessOutput),
    SpawnError(String),
}

/// A [`ProcessRunner`] that answers from canned outputs keyed by working
/// directory.
///
/// Directories without a script fail to spawn.
///
/// # Example
///
/// ```rust
/// use terragrunt_runner::io::{Invocation, ProcessRunner};
/// use terragrunt_runner::testkit::ScriptedRunner;
///
/// let runner = ScriptedRunner::new().succeed_in("/repo/a", "No changes.");
/// let out = runner
///     .run(&Invocation {
///         program: "terragrunt".into(),
///         args: vec!["plan".into()],
///         cwd: "/repo/a".into(),
///         env: vec![],
///     })
///     .unwrap();
/// assert!(out.success);
/// assert_eq!(runner.invocations().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    scripts: Arc<RwLock<HashMap<PathBuf, Script>>>,
    invocations: Arc<RwLock<Vec<Invocation>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_script(self, dir: impl AsRef<Path>, script: Script) -> Self {
        self.scripts
            .write()
            .expect("Lock poisoned")
            .insert(dir.as_ref().to_path_buf(), script);
        self
    }

    /// Exit 0 in `dir` with `stdout`.
    pub fn succeed_in(self, dir: impl AsRef<Path>, stdout: &str) -> Self {
        self.with_script(
            dir,
            Script::Exit(ProcessOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                success: true,
                code: Some(0),
            }),
        )
    }

    /// Exit with `code` in `dir`, printing `stderr`.
    pub fn fail_in(self, dir: impl AsRef<Path>, code: i32, stderr: &str) -> Self {
        self.with_script(
            dir,
            Script::Exit(ProcessOutput {
                stdout: String::new(),
                stderr: stderr.to_string(),
                success: false,
                code: Some(code),
            }),
        )
    }

    /// Return exactly `output` in `dir`.
    pub fn respond_in(self, dir: impl AsRef<Path>, output: ProcessOutput) -> Self {
        self.with_script(dir, Script::Exit(output))
    }

    /// Fail to start in `dir`.
    pub fn spawn_error_in(self, dir: impl AsRef<Path>, message: &str) -> Self {
        self.with_script(dir, Script::SpawnError(message.to_string()))
    }

    /// Every invocation received, in call order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.read().expect("Lock poisoned").clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, ExecutionError> {
        self.invocations
            .write()
            .expect("Lock poisoned")
            .push(invocation.clone());

        let script = self
            .scripts
            .read()
            .expect("Lock poisoned")
            .get(&invocation.cwd)
            .cloned();

        match script {
            Some(Script::Exit(output)) => Ok(output),
            Some(Script::SpawnError(message)) => Err(ExecutionError::Spawn {
                program: invocation.program.clone(),
                dir: invocation.cwd.clone(),
                message,
            }),
            None => Err(ExecutionError::Spawn {
                program: invocation.program.clone(),
                dir: invocation.cwd.clone(),
                message: "no script for directory".to_string(),
            }),
        }
    }
}

#[derive(Debug, Default)]
struct CommentState {
    comments: Vec<(u64, Comment)>,
    next_id: u64,
    deleted: Vec<u64>,
    failing_deletes: HashSet<u64>,
    fail_creates: bool,
}

/// An in-memory [`CommentApi`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryComments {
    state: Arc<RwLock<CommentState>>,
}

impl InMemoryComments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing comment on `pull_request`.
    pub fn with_comment(self, pull_request: u64, user_login: &str, body: &str) -> Self {
        {
            let mut state = self.state.write().expect("Lock poisoned");
            state.next_id += 1;
            let id = state.next_id;
            state.comments.push((
                pull_request,
                Comment {
                    id,
                    user_login: user_login.to_string(),
                    body: body.to_string(),
                },
            ));
        }
        self
    }

    /// Make deleting comment `id` fail.
    pub fn failing_delete(self, id: u64) -> Self {
        self.state
            .write()
            .expect("Lock poisoned")
            .failing_deletes
            .insert(id);
        self
    }

    /// Make every create call fail.
    pub fn failing_creates(self) -> Self {
        self.state.write().expect("Lock poisoned").fail_creates = true;
        self
    }

    /// Bodies currently on `pull_request`, oldest first.
    pub fn bodies(&self, pull_request: u64) -> Vec<String> {
        self.state
            .read()
            .expect("Lock poisoned")
            .comments
            .iter()
            .filter(|(pr, _)| *pr == pull_request)
            .map(|(_, c)| c.body.clone())
            .collect()
    }

    /// Ids of successfully deleted comments.
    pub fn deleted(&self) -> Vec<u64> {
        self.state.read().expect("Lock poisoned").deleted.clone()
    }
}

impl CommentApi for InMemoryComments {
    fn list_comments(&self, pull_request: u64) -> Result<Vec<Comment>, CommentError> {
        Ok(self
            .state
            .read()
            .expect("Lock poisoned")
            .comments
            .iter()
            .filter(|(pr, _)| *pr == pull_request)
            .map(|(_, c)| c.clone())
            .collect())
    }

    fn delete_comment(&self, id: u64) -> Result<(), CommentError> {
        let mut state = self.state.write().expect("Lock poisoned");
        if state.failing_deletes.contains(&id) {
            return Err(CommentError::Status {
                action: "delete comment",
                status: 403,
                body: "Resource not accessible by integration".to_string(),
            });
        }
        state.comments.retain(|(_, c)| c.id != id);
        state.deleted.push(id);
        Ok(())
    }

    fn create_comment(&self, pull_request: u64, body: &str) -> Result<u64, CommentError> {
        let mut state = self.state.write().expect("Lock poisoned");
        if state.fail_creates {
            return Err(CommentError::Status {
                action: "create comment",
                status: 500,
                body: "Internal Server Error".to_string(),
            });
        }
        state.next_id += 1;
        let id = state.next_id;
        state.comments.push((
            pull_request,
            Comment {
                id,
                user_login: "github-actions[bot]".to_string(),
                body: body.to_string(),
            },
        ));
        Ok(id)
    }
}
