//! Converting parsed CLI arguments into typed configuration.

use crate::cli::args::Cli;
use crate::config::{parse_folders, ParallelConfig, RunnerSettings};
use crate::detect::DetectionConfig;

/// Folder list given on the command line, followed by any detected folders.
pub fn requested_folders(cli: &Cli, detected: Vec<String>) -> Vec<String> {
    let mut folders = parse_folders(&cli.folders);
    folders.extend(detected);
    folders
}

/// Auto-detection settings, or `None` when `--auto-detect` is off.
pub fn detection_config(cli: &Cli) -> Option<DetectionConfig> {
    cli.auto_detect.then(|| DetectionConfig {
        file_patterns: cli.file_patterns.clone(),
        marker_file: cli.terragrunt_file.clone(),
        changed_files: cli
            .changed_files
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect(),
        max_walk_up: cli.max_walk_up,
    })
}

/// Raw settings for [`crate::config::RunnerConfig::build`].
pub fn build_settings(cli: &Cli, folders: Vec<String>, pull_request: u64) -> RunnerSettings {
    RunnerSettings {
        github_token: cli.github_token.clone(),
        repository: cli.repository.clone(),
        owner: cli.owner.clone().filter(|o| !o.is_empty()),
        pull_request,
        folders,
        command: cli.command.clone(),
        root_dir: cli.root_dir.clone(),
        extra_args: cli.extra_args.clone(),
        parallel: ParallelConfig {
            enabled: cli.parallel,
            max_parallel: cli.max_parallel,
        },
        delete_old_comments: cli.delete_old_comments,
        comment_scope: cli.run_all_comments,
        max_runs: cli.max_runs,
        tool_binary: cli.tool_binary.clone(),
        dry_run: cli.dry_run,
    }
}
