use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use terragrunt_runner::ci::{self, JobOutputs};
use terragrunt_runner::cli::{self, Cli};
use terragrunt_runner::config::RunnerConfig;
use terragrunt_runner::detect::detect_folders;
use terragrunt_runner::errors::ConfigError;
use terragrunt_runner::execution::{overall_success, ExecutionResult, FolderExecutionEngine};
use terragrunt_runner::github::GitHubClient;
use terragrunt_runner::io::{CommentApi, GitDiscovery, RealProcessRunner, RepoDiscovery};
use terragrunt_runner::publish::{publish, ConsoleComments};
use terragrunt_runner::report::ReportAssembler;
use tracing::{info, warn};

fn main() -> Result<()> {
    let cli = cli::parse_args();
    cli::init_logging();
    cli.color.resolve(|key| std::env::var(key).ok()).apply();

    println!("\n\n{}", cli::version_banner());
    ci::add_mask(&cli.github_token);

    let config = load_config(&cli)?;
    info!(
        command = %config.execution.command,
        folders = config.execution.folders.len(),
        run_all = config.execution.is_run_all(),
        "Starting Terragrunt runner"
    );

    let runner = RealProcessRunner::new();
    let results = FolderExecutionEngine::new(&config.execution, &runner).execute();

    let bodies = ReportAssembler::from_config(&config).assemble(&results);
    let api: Box<dyn CommentApi> = if config.dry_run {
        Box::new(ConsoleComments::new())
    } else {
        Box::new(
            GitHubClient::new(&config.pull_request, &cli.api_url)
                .context("Failed to create GitHub client")?,
        )
    };
    publish(
        api.as_ref(),
        config.pull_request.number,
        &bodies,
        config.delete_old_comments,
    );

    cli::print_console_summary(&results);
    export_outputs(&results);

    if !overall_success(&results) {
        anyhow::bail!("some executions failed");
    }
    Ok(())
}

/// Resolve the repository root, detect folders and build the config.
fn load_config(cli: &Cli) -> Result<RunnerConfig> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let discovery = GitDiscovery::new();
    let repo_root = repository_root(&discovery, &cwd);

    let detected = match cli::detection_config(cli) {
        Some(detection) => match detect_folders(&repo_root, &detection, &discovery) {
            Ok(folders) => {
                if !folders.is_empty() {
                    info!(folders = ?folders, "Auto-detected Terragrunt folders");
                }
                folders
            }
            Err(e) => {
                warn!(error = %e, "Auto-detection failed");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let folders = cli::requested_folders(cli, detected);
    let pull_request = cli
        .pull_request
        .unwrap_or_else(cli::discover_pull_request_from_env);

    RunnerConfig::build(cli::build_settings(cli, folders, pull_request), repo_root).map_err(
        |err| {
            match &err {
                ConfigError::TooManyFolders { folders, limit } => {
                    ci::error(&format!("Too many Terragrunt folders: {folders} > {limit}"));
                }
                other => ci::error(&other.to_string()),
            }
            anyhow::Error::new(err).context("Invalid configuration")
        },
    )
}

fn repository_root(discovery: &dyn RepoDiscovery, cwd: &Path) -> PathBuf {
    discovery.repository_root(cwd).unwrap_or_else(|e| {
        warn!(
            error = %e,
            cwd = %cwd.display(),
            "Could not find git repository, using current directory"
        );
        cwd.to_path_buf()
    })
}

/// Write step outputs and emit threshold warnings.
fn export_outputs(results: &[ExecutionResult]) {
    let outputs = JobOutputs::from_results(results);
    if let Some(path) = std::env::var_os("GITHUB_OUTPUT").filter(|p| !p.is_empty()) {
        if let Err(e) = ci::write_job_outputs(Path::new(&path), &outputs) {
            warn!(error = %e, "Failed to write job outputs");
        }
    }
    for message in ci::risk_warnings(&outputs) {
        ci::warning(&message);
    }
}
