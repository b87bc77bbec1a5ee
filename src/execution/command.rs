//! Command classification and argument vectors.

/// Legacy spelling of `run --all`.
pub const LEGACY_RUN_ALL: &str = "run-all";

/// Flag that makes Terragrunt fan out over units itself.
pub const RUN_ALL_FLAG: &str = "--all";

/// Everything after this token goes to the wrapped planner untouched.
pub const PASSTHROUGH_SEPARATOR: &str = "--";

/// Whether `command` requests an aggregate run.
///
/// ```
/// use terragrunt_runner::execution::command::is_run_all;
///
/// assert!(is_run_all("run --all plan"));
/// assert!(is_run_all("run-all plan"));
/// assert!(!is_run_all("plan"));
/// ```
pub fn is_run_all(command: &str) -> bool {
    command.contains(RUN_ALL_FLAG) || command.trim_start().starts_with(LEGACY_RUN_ALL)
}

/// Rewrite a leading `run-all` into `run --all`.
pub fn rewrite_legacy(command: &str) -> String {
    let mut parts: Vec<&str> = command.split_whitespace().collect();
    if parts.first() == Some(&LEGACY_RUN_ALL) {
        parts.splice(0..1, ["run", RUN_ALL_FLAG]);
    }
    parts.join(" ")
}

/// An aggregate command broken into its three argument groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitCommand {
    /// `run --all` and anything before it
    pub base: Vec<String>,
    /// Planner subcommand and flags, e.g. `plan -out=x`
    pub subcommand: Vec<String>,
    /// Tokens after the separator, passed through verbatim
    pub passthrough: Vec<String>,
}

/// Split an aggregate command at `--all` and at the separator.
pub fn split_command(command: &str) -> SplitCommand {
    let rewritten = rewrite_legacy(command);
    let tokens: Vec<String> = rewritten.split_whitespace().map(str::to_string).collect();

    let (head, passthrough) = match tokens.iter().position(|t| t == PASSTHROUGH_SEPARATOR) {
        Some(idx) => (tokens[..idx].to_vec(), tokens[idx + 1..].to_vec()),
        None => (tokens, Vec::new()),
    };

    let (base, subcommand) = match head.iter().position(|t| t == RUN_ALL_FLAG) {
        Some(idx) => (head[..=idx].to_vec(), head[idx + 1..].to_vec()),
        None => (head, Vec::new()),
    };

    SplitCommand {
        base,
        subcommand,
        passthrough,
    }
}

/// Arguments for a single-folder run: the command then the extra arguments.
pub fn folder_args(command: &str, extra: &[String]) -> Vec<String> {
    command
        .split_whitespace()
        .map(str::to_string)
        .chain(extra.iter().cloned())
        .collect()
}

/// Arguments for an aggregate run.
///
/// Layout: `run --all [--parallelism N] (--queue-include-dir D)*
/// --queue-include-external [extra] [subcommand] [-- passthrough]`.
/// `--parallelism` is omitted when `max_parallel` is zero.
pub fn aggregate_args(
    command: &str,
    include_dirs: &[String],
    max_parallel: usize,
    extra: &[String],
) -> Vec<String> {
    let split = split_command(command);
    let mut args = split.base;

    if max_parallel > 0 {
        args.push("--parallelism".to_string());
        args.push(max_parallel.to_string());
    }
    for dir in include_dirs {
        args.push("--queue-include-dir".to_string());
        args.push(dir.clone());
    }
    args.push("--queue-include-external".to_string());
    args.extend(extra.iter().cloned());
    args.extend(split.subcommand);

    if !split.passthrough.is_empty() {
        args.push(PASSTHROUGH_SEPARATOR.to_string());
        args.extend(split.passthrough);
    }
    args
}
