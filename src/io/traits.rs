//! I/O seams used by the runner.
//!
//! Subprocesses, git, and the pull request API sit behind these traits so the
//! execution and publishing logic can be exercised with the scripted doubles
//! in [`crate::testkit`].

use crate::errors::{CommentError, ExecutionError};
use std::path::{Path, PathBuf};

/// One subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Binary name, resolved on `PATH`
    pub program: String,
    pub args: Vec<String>,
    /// Absolute working directory
    pub cwd: PathBuf,
    /// Variables layered over the inherited environment
    pub env: Vec<(String, String)>,
}

impl Invocation {
    /// Render as a shell-like string for logs.
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

impl ProcessOutput {
    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut out = String::with_capacity(self.stdout.len() + self.stderr.len());
        out.push_str(&self.stdout);
        out.push_str(&self.stderr);
        out
    }
}

/// Runs external processes to completion.
///
/// Implementations must be thread-safe (`Send + Sync`); the engine calls
/// `run` from several worker threads at once.
pub trait ProcessRunner: Send + Sync {
    /// Run the process and capture both streams.
    ///
    /// A process that starts and exits non-zero is `Ok` with
    /// `success == false`.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::ToolNotFound` or `ExecutionError::Spawn` when
    /// the process could not be started at all.
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, ExecutionError>;
}

/// Repository-level discovery backed by version control.
pub trait RepoDiscovery {
    /// Working-tree root of the repository containing `start`.
    fn repository_root(&self, start: &Path) -> anyhow::Result<PathBuf>;

    /// Paths changed between the previous commit and the working tree,
    /// relative to the repository root.
    fn changed_files(&self, root: &Path) -> anyhow::Result<Vec<String>>;
}

/// A pull request comment as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    pub user_login: String,
    pub body: String,
}

/// Pull request comment operations.
pub trait CommentApi {
    /// Every comment on the pull request, across all pages.
    fn list_comments(&self, pull_request: u64) -> Result<Vec<Comment>, CommentError>;

    fn delete_comment(&self, id: u64) -> Result<(), CommentError>;

    /// Create a comment and return its id.
    fn create_comment(&self, pull_request: u64, body: &str) -> Result<u64, CommentError>;
}
