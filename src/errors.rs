//! Error types for terragrunt-runner.
//!
//! Errors are split by how far they are allowed to propagate:
//!
//! - [`ConfigError`]: invalid configuration, fails the run before any
//!   subprocess starts
//! - [`SanitizeError`]: forbidden token in the extra arguments, fails only the
//!   execution units that would have received them
//! - [`ExecutionError`]: spawn failures and non-zero exits, recorded on the
//!   unit's result and never fatal to sibling units
//! - [`CommentError`]: pull request API failures, logged by the publisher
//!
//! Parsing ambiguity never produces an error; the transcript stages degrade to
//! heuristics instead.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems detected while building [`crate::config::RunnerConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value is absent
    #[error("missing required config: {0}")]
    Missing(&'static str),

    /// Repository slug is not `owner/name`
    #[error("invalid repository format: {0:?}")]
    InvalidRepository(String),

    /// Folder escapes the workspace root
    #[error("invalid folder: {0}")]
    InvalidFolder(String),

    /// Parallelism outside the accepted range
    #[error("invalid max-parallel: {value} (expected 0..={max})")]
    InvalidParallelism { value: usize, max: usize },

    /// Empty or whitespace-only tool command
    #[error("invalid command: {0:?}")]
    InvalidCommand(String),

    /// More folders than the configured run limit
    #[error("exceeds max runs: {folders} folders vs {limit} limit")]
    TooManyFolders { folders: usize, limit: usize },
}

/// Rejection of the free-form extra-arguments string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("forbidden pattern {pattern:?} in arg: {token}")]
    ForbiddenPattern {
        token: String,
        pattern: &'static str,
    },
}

/// Failure of one execution unit.
///
/// Kept `Clone` so it can live inside [`crate::execution::ExecutionResult`]
/// and be rendered into several comment chunks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Extra arguments were rejected before the tool was started
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),

    /// The tool binary could not be found on `PATH`
    #[error("{program} not found on PATH: {message}")]
    ToolNotFound { program: String, message: String },

    /// The process could not be started
    #[error("failed to start {program} in {}: {message}", .dir.display())]
    Spawn {
        program: String,
        dir: PathBuf,
        message: String,
    },

    /// The process ran and exited unsuccessfully
    #[error("{}", describe_exit(*.code))]
    ExitStatus { code: Option<i32> },
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Pull request comment API failures.
#[derive(Debug, Error)]
pub enum CommentError {
    /// Transport-level failure
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("GitHub API returned {status} for {action}: {body}")]
    Status {
        action: &'static str,
        status: u16,
        body: String,
    },
}

/// Result type alias for configuration building
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
