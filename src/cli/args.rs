use crate::ci::ColorMode;
use crate::config::{CommentScope, DEFAULT_MAX_RUNS};
use crate::detect::{DEFAULT_MARKER_FILE, DEFAULT_MAX_WALK_UP};
use crate::github::DEFAULT_API_URL;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "terragrunt-runner")]
#[command(about = "Execute Terragrunt commands and post results to GitHub PR", long_about = None)]
#[command(version)]
pub struct Cli {
    /// GitHub token for API access
    #[arg(long, env = "GITHUB_TOKEN", default_value = "", hide_env_values = true)]
    pub github_token: String,

    /// GitHub repository (owner/repo)
    #[arg(long, env = "GITHUB_REPOSITORY", default_value = "")]
    pub repository: String,

    /// Repository owner, when --repository holds only the name
    #[arg(long, env = "GITHUB_REPOSITORY_OWNER")]
    pub owner: Option<String>,

    /// Pull request number (discovered from the workflow environment if unset)
    #[arg(long)]
    pub pull_request: Option<u64>,

    /// Folders to run Terragrunt in (comma, space, or newline separated)
    #[arg(long, default_value = "")]
    pub folders: String,

    /// Terragrunt CLI command (e.g. 'plan', 'run --all plan')
    #[arg(long, default_value = "plan")]
    pub command: String,

    /// Directory `run --all` is started from
    #[arg(long, default_value = "live")]
    pub root_dir: String,

    /// Additional Terragrunt arguments
    #[arg(long = "args", default_value = "--non-interactive", allow_hyphen_values = true)]
    pub extra_args: String,

    /// Execute folders in parallel
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub parallel: bool,

    /// Maximum parallel executions (0 = unlimited)
    #[arg(long, default_value_t = 5)]
    pub max_parallel: usize,

    /// Delete previous bot comments before posting
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub delete_old_comments: bool,

    /// Auto-detect Terragrunt folders from changed files
    #[arg(long)]
    pub auto_detect: bool,

    /// File patterns tracked for auto-detection
    #[arg(long, value_delimiter = ',', default_value = "*.hcl,*.json,*.yaml,*.yml")]
    pub file_patterns: Vec<String>,

    /// Marker file that identifies a Terragrunt unit
    #[arg(long, default_value = DEFAULT_MARKER_FILE)]
    pub terragrunt_file: String,

    /// Changed files for auto-detection (git diff against HEAD~1 if empty)
    #[arg(long, value_delimiter = ',')]
    pub changed_files: Vec<String>,

    /// Maximum directory levels to walk up when searching for the marker file
    #[arg(long, default_value_t = DEFAULT_MAX_WALK_UP)]
    pub max_walk_up: usize,

    /// Maximum number of folders allowed (0 = unlimited)
    #[arg(long, default_value_t = DEFAULT_MAX_RUNS)]
    pub max_runs: usize,

    /// Tool binary looked up on PATH
    #[arg(long, default_value = "terragrunt")]
    pub tool_binary: String,

    /// Which rows of a `run --all` get their own comment
    #[arg(long, value_enum, default_value_t = CommentScope::Aggregate)]
    pub run_all_comments: CommentScope,

    /// Print comment bodies instead of posting them
    #[arg(long)]
    pub dry_run: bool,

    /// Console colour
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("terragrunt-runner").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--github-token", "t", "--repository", "o/r"]);
        assert_eq!(cli.command, "plan");
        assert_eq!(cli.root_dir, "live");
        assert_eq!(cli.extra_args, "--non-interactive");
        assert!(cli.parallel);
        assert_eq!(cli.max_parallel, 5);
        assert!(cli.delete_old_comments);
        assert_eq!(cli.file_patterns, vec!["*.hcl", "*.json", "*.yaml", "*.yml"]);
        assert_eq!(cli.terragrunt_file, "terragrunt.hcl");
        assert_eq!(cli.max_walk_up, 3);
        assert_eq!(cli.max_runs, 20);
        assert_eq!(cli.run_all_comments, CommentScope::Aggregate);
    }

    #[test]
    fn test_boolean_flags_accept_values() {
        let cli = parse(&["--parallel=false", "--delete-old-comments", "false"]);
        assert!(!cli.parallel);
        assert!(!cli.delete_old_comments);
        assert!(parse(&["--parallel"]).parallel);
    }

    #[test]
    fn test_hyphenated_extra_args() {
        let cli = parse(&["--args", "-lock=false --non-interactive"]);
        assert_eq!(cli.extra_args, "-lock=false --non-interactive");
    }

    #[test]
    fn test_list_flags_split_on_commas() {
        let cli = parse(&["--changed-files", "a/terragrunt.hcl,b/x.yaml", "--file-patterns", "*.tf"]);
        assert_eq!(cli.changed_files, vec!["a/terragrunt.hcl", "b/x.yaml"]);
        assert_eq!(cli.file_patterns, vec!["*.tf"]);
    }

    #[test]
    fn test_run_all_comment_scope() {
        let cli = parse(&["--run-all-comments", "per-unit"]);
        assert_eq!(cli.run_all_comments, CommentScope::PerUnit);
    }
}
