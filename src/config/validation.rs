//! Validation with error accumulation for runner configuration.
//!
//! [`validate_config`] collects every problem so a misconfigured workflow
//! shows all of them in one run; [`validate_config_result`] is the fail-fast
//! wrapper used when building [`RunnerConfig`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::folders::has_parent_segment;
use super::parallel::MAX_PARALLELISM;
use super::RunnerConfig;
use crate::errors::{ConfigError, ConfigResult};

/// Absolute folders are only accepted under this prefix.
pub const WORKSPACE_PREFIX: &str = "/workspace";

static REPOSITORY_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9\-_.]*$").expect("repository pattern is valid")
});

/// Validate the entire config, accumulating all errors.
///
/// # Example
///
/// ```rust
/// use terragrunt_runner::config::validation::validate_config;
/// use terragrunt_runner::config::RunnerConfig;
///
/// let config = RunnerConfig::for_folders(["live/a"]);
/// assert!(validate_config(&config).is_empty());
/// ```
pub fn validate_config(config: &RunnerConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    let target = &config.pull_request;
    let execution = &config.execution;

    if !config.dry_run {
        if target.token.is_empty() {
            errors.push(ConfigError::Missing("github token"));
        }
        if target.number == 0 {
            errors.push(ConfigError::Missing("pull request number"));
        }
    }

    errors.extend(validate_repository_part(&target.owner).err());
    errors.extend(validate_repository_part(&target.repo).err());

    if execution.folders.is_empty() {
        errors.push(ConfigError::Missing("folders"));
    }
    errors.extend(
        execution
            .folders
            .iter()
            .filter_map(|f| validate_folder(f).err()),
    );
    errors.extend(validate_folder(&execution.root_dir).err());

    if execution.parallel.max_parallel > MAX_PARALLELISM {
        errors.push(ConfigError::InvalidParallelism {
            value: execution.parallel.max_parallel,
            max: MAX_PARALLELISM,
        });
    }

    if execution.command.trim().is_empty() {
        errors.push(ConfigError::InvalidCommand(execution.command.clone()));
    }

    if config.max_runs > 0 && execution.folders.len() > config.max_runs {
        errors.push(ConfigError::TooManyFolders {
            folders: execution.folders.len(),
            limit: config.max_runs,
        });
    }

    errors
}

/// Validate and return the first error, if any.
pub fn validate_config_result(config: &RunnerConfig) -> ConfigResult<()> {
    match validate_config(config).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Check one half of an `owner/name` repository slug.
pub fn validate_repository_part(part: &str) -> ConfigResult<()> {
    if REPOSITORY_PART.is_match(part) {
        Ok(())
    } else {
        Err(ConfigError::InvalidRepository(part.to_string()))
    }
}

/// Check that a cleaned folder stays inside the workspace.
pub fn validate_folder(folder: &str) -> ConfigResult<()> {
    let escapes = has_parent_segment(folder);
    let foreign_absolute =
        folder.starts_with('/') && !Path::new(folder).starts_with(WORKSPACE_PREFIX);
    if escapes || foreign_absolute {
        Err(ConfigError::InvalidFolder(folder.to_string()))
    } else {
        Ok(())
    }
}
