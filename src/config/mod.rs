//! Runner configuration.
//!
//! A [`RunnerConfig`] is built once from [`RunnerSettings`] and then passed by
//! reference to every component. Nothing mutates it after validation.

mod folders;
mod parallel;
pub mod validation;

use std::path::PathBuf;

pub use folders::{clean_path, parse_folders, unique_folders};
pub use parallel::{ParallelConfig, MAX_PARALLELISM};

use crate::errors::{ConfigError, ConfigResult};
use crate::execution::command;

/// Which rows of an aggregate run get their own comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CommentScope {
    /// Only the synthetic whole-run row
    #[default]
    Aggregate,
    /// The whole-run row plus one comment per module
    PerUnit,
}

/// What to run and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Tool subcommand, e.g. `plan` or `run --all plan`
    pub command: String,
    /// Whitespace-separated extra arguments, sanitized per unit
    pub extra_args: String,
    /// Cleaned, deduplicated folders relative to `repo_root`
    pub folders: Vec<String>,
    pub parallel: ParallelConfig,
    /// Working directory for `run --all`, relative to `repo_root`
    pub root_dir: String,
    pub repo_root: PathBuf,
    /// Binary looked up on `PATH`
    pub tool_binary: String,
}

impl ExecutionConfig {
    /// Whether the command asks the tool to fan out over folders itself.
    pub fn is_run_all(&self) -> bool {
        command::is_run_all(&self.command)
    }
}

/// The pull request results are reported to.
#[derive(Clone, PartialEq, Eq)]
pub struct PullRequestTarget {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl std::fmt::Debug for PullRequestTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PullRequestTarget")
            .field("token", &"***")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("number", &self.number)
            .finish()
    }
}

/// Validated configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub execution: ExecutionConfig,
    pub pull_request: PullRequestTarget,
    pub delete_old_comments: bool,
    pub comment_scope: CommentScope,
    /// Folder limit, 0 = unlimited
    pub max_runs: usize,
    /// Render comments to stdout instead of posting them
    pub dry_run: bool,
}

/// Default folder limit.
pub const DEFAULT_MAX_RUNS: usize = 20;

/// Unvalidated inputs, as gathered from flags and the environment.
#[derive(Debug, Clone, Default)]
pub struct RunnerSettings {
    pub github_token: String,
    /// `owner/name`, or just `name` when `owner` is given
    pub repository: String,
    pub owner: Option<String>,
    pub pull_request: u64,
    pub folders: Vec<String>,
    pub command: String,
    pub root_dir: String,
    pub extra_args: String,
    pub parallel: ParallelConfig,
    pub delete_old_comments: bool,
    pub comment_scope: CommentScope,
    pub max_runs: usize,
    pub tool_binary: String,
    pub dry_run: bool,
}

impl RunnerConfig {
    /// Clean, validate and freeze the settings.
    pub fn build(settings: RunnerSettings, repo_root: PathBuf) -> ConfigResult<Self> {
        let (owner, repo) = split_repository(&settings.repository, settings.owner.as_deref())?;
        let config = Self {
            execution: ExecutionConfig {
                command: command::rewrite_legacy(settings.command.trim()),
                extra_args: settings.extra_args,
                folders: unique_folders(&settings.folders),
                parallel: settings.parallel,
                root_dir: clean_path(&settings.root_dir),
                repo_root,
                tool_binary: settings.tool_binary,
            },
            pull_request: PullRequestTarget {
                token: settings.github_token,
                owner,
                repo,
                number: settings.pull_request,
            },
            delete_old_comments: settings.delete_old_comments,
            comment_scope: settings.comment_scope,
            max_runs: settings.max_runs,
            dry_run: settings.dry_run,
        };
        validation::validate_config_result(&config)?;
        Ok(config)
    }

    /// A valid config for `folders` with placeholder repository values.
    pub fn for_folders<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            execution: ExecutionConfig {
                command: "plan".into(),
                extra_args: String::new(),
                folders: unique_folders(folders),
                parallel: ParallelConfig::default(),
                root_dir: "live".into(),
                repo_root: PathBuf::from("."),
                tool_binary: "terragrunt".into(),
            },
            pull_request: PullRequestTarget {
                token: "token".into(),
                owner: "owner".into(),
                repo: "repo".into(),
                number: 1,
            },
            delete_old_comments: true,
            comment_scope: CommentScope::default(),
            max_runs: DEFAULT_MAX_RUNS,
            dry_run: false,
        }
    }
}

/// Split `owner/name`; a bare `name` takes its owner from `owner`.
fn split_repository(repository: &str, owner: Option<&str>) -> ConfigResult<(String, String)> {
    let repository = repository.trim();
    if repository.is_empty() {
        return Err(ConfigError::Missing("repository"));
    }
    match repository.split_once('/') {
        Some((owner, name)) => Ok((owner.to_string(), name.to_string())),
        None => match owner.filter(|o| !o.is_empty()) {
            Some(owner) => Ok((owner.to_string(), repository.to_string())),
            None => Err(ConfigError::InvalidRepository(repository.to_string())),
        },
    }
}
