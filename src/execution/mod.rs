//! Running the tool across folders.
//!
//! Two modes, chosen from the command string:
//!
//! - per folder: one process per folder, at most
//!   [`ParallelConfig::effective_width`] at a time on a dedicated rayon pool;
//!   results arrive through a channel in completion order
//! - aggregate (`run --all`): one process from the root directory that fans
//!   out internally; its transcript is demultiplexed back into one result per
//!   module plus a leading whole-run row
//!
//! A failure in one unit never stops its siblings.
//!
//! [`ParallelConfig::effective_width`]: crate::config::ParallelConfig::effective_width

pub mod command;
pub mod paths;

use crate::ci;
use crate::config::ExecutionConfig;
use crate::errors::ExecutionError;
use crate::io::{Invocation, ProcessOutput, ProcessRunner};
use crate::sanitize::sanitize_args;
use crate::transcript::{
    extract_plan_output, normalize, parse_resource_changes, reconcile_module_name,
    split_output_by_module, DemuxedTranscript, Dialect, ResourceChanges,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Variables forcing non-interactive behavior in every invocation.
pub const AUTOMATION_ENV: [(&str, &str); 2] =
    [("TF_IN_AUTOMATION", "true"), ("TG_NON_INTERACTIVE", "true")];

/// What an [`ExecutionResult`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// One folder, or one module of an aggregate run
    Folder,
    /// The synthetic whole-run row of an aggregate run
    Aggregate,
}

/// Outcome of one execution unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Folder as given by the caller, or the root directory for the
    /// aggregate row
    pub folder: String,
    /// Escape-free transcript, reduced to the plan section for folder rows
    pub output: String,
    pub error: Option<ExecutionError>,
    pub changes: Option<ResourceChanges>,
    pub success: bool,
    pub kind: UnitKind,
}

impl ExecutionResult {
    fn failed(folder: &str, kind: UnitKind, error: ExecutionError) -> Self {
        Self {
            folder: folder.to_string(),
            output: String::new(),
            error: Some(error),
            changes: None,
            success: false,
            kind,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        self.kind == UnitKind::Aggregate
    }

    /// Whether the unit succeeded without pending changes.
    pub fn has_no_changes(&self) -> bool {
        self.changes.is_some_and(|c| c.no_changes)
    }
}

/// True when every unit succeeded.
pub fn overall_success(results: &[ExecutionResult]) -> bool {
    results.iter().all(|r| r.success)
}

/// Runs the configured command and produces one result per unit.
pub struct FolderExecutionEngine<'a> {
    config: &'a ExecutionConfig,
    runner: &'a dyn ProcessRunner,
}

impl<'a> FolderExecutionEngine<'a> {
    pub fn new(config: &'a ExecutionConfig, runner: &'a dyn ProcessRunner) -> Self {
        Self { config, runner }
    }

    /// Run in the mode the command asks for.
    pub fn execute(&self) -> Vec<ExecutionResult> {
        if self.config.is_run_all() {
            self.execute_aggregate()
        } else {
            self.execute_per_folder()
        }
    }

    /// One process per folder.
    ///
    /// Sequential runs keep input order. Parallel runs return results in
    /// completion order.
    pub fn execute_per_folder(&self) -> Vec<ExecutionResult> {
        let folders = &self.config.folders;
        let parallel = self.config.parallel;

        if !parallel.runs_in_parallel(folders.len()) {
            return folders.iter().map(|f| self.execute_in_folder(f)).collect();
        }

        let width = parallel.effective_width(folders.len());
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(width)
            .thread_name(|i| format!("terragrunt-worker-{i}"))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                warn!(error = %e, "Failed to build worker pool, running sequentially");
                return folders.iter().map(|f| self.execute_in_folder(f)).collect();
            }
        };

        debug!(width, folders = folders.len(), "Executing folders in parallel");
        let (tx, rx) = crossbeam::channel::unbounded();
        pool.scope(|scope| {
            for folder in folders {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    // The receiver outlives the scope, so send cannot fail.
                    let _ = tx.send(self.execute_in_folder(folder));
                });
            }
        });
        drop(tx);
        rx.into_iter().collect()
    }

    fn execute_in_folder(&self, folder: &str) -> ExecutionResult {
        let dir = paths::resolve_folder(&self.config.repo_root, folder);
        debug!(folder, dir = %dir.display(), "Execute in folder");

        let extra = match sanitize_args(&self.config.extra_args) {
            Ok(extra) => extra,
            Err(e) => {
                warn!(folder, error = %e, "Rejected extra arguments");
                return ExecutionResult::failed(folder, UnitKind::Folder, e.into());
            }
        };

        let invocation = self.invocation(command::folder_args(&self.config.command, &extra), dir);
        let output = match self.runner.run(&invocation) {
            Ok(output) => output,
            Err(e) => {
                warn!(folder, error = %e, "Failed to start tool");
                return ExecutionResult::failed(folder, UnitKind::Folder, e);
            }
        };

        let raw = output.combined();
        ci::echo_group(&format!("Terragrunt in {folder}"), &raw);

        ExecutionResult {
            folder: folder.to_string(),
            output: extract_plan_output(&raw),
            error: exit_error(&output),
            changes: Some(parse_resource_changes(&raw)),
            success: output.success,
            kind: UnitKind::Folder,
        }
    }

    /// One `run --all` process from the root directory.
    ///
    /// The first result is always the whole-run row.
    pub fn execute_aggregate(&self) -> Vec<ExecutionResult> {
        let config = self.config;
        let run_dir = paths::resolve_folder(&config.repo_root, &config.root_dir);

        let extra = match sanitize_args(&config.extra_args) {
            Ok(extra) => extra,
            Err(e) => {
                warn!(error = %e, "Rejected extra arguments");
                return vec![ExecutionResult::failed(
                    &config.root_dir,
                    UnitKind::Aggregate,
                    e.into(),
                )];
            }
        };

        let relative: Vec<(String, String)> = config
            .folders
            .iter()
            .map(|folder| {
                let rel = paths::relative_to(&config.repo_root, &config.root_dir, folder);
                debug!(original = %folder, relative = %rel, run_dir = %run_dir.display(), "Queue include dir");
                (folder.clone(), rel)
            })
            .collect();
        let include_dirs: Vec<String> = relative.iter().map(|(_, rel)| rel.clone()).collect();

        let args = command::aggregate_args(
            &config.command,
            &include_dirs,
            config.parallel.max_parallel,
            &extra,
        );
        let invocation = self.invocation(args, run_dir.clone());
        info!(command = %invocation.display_command(), dir = %run_dir.display(), "Executing Terragrunt command");

        let (raw, error) = match self.runner.run(&invocation) {
            Ok(output) => (output.combined(), exit_error(&output)),
            Err(e) => {
                warn!(error = %e, "Failed to start tool");
                (String::new(), Some(e))
            }
        };
        ci::echo_group(
            &format!("Terragrunt run --all from {}", run_dir.display()),
            &raw,
        );

        let transcript = normalize(&raw);
        let demuxed = split_output_by_module(&transcript);
        let (units, total) = if demuxed.modules.is_empty() {
            warn!("No module output found, reporting the full transcript per folder");
            self.undivided_results(&transcript, error.as_ref())
        } else {
            module_results(demuxed, &relative, error.as_ref())
        };

        let whole_run = ExecutionResult {
            folder: config.root_dir.clone(),
            output: transcript,
            success: error.is_none(),
            error,
            changes: Some(total),
            kind: UnitKind::Aggregate,
        };
        std::iter::once(whole_run).chain(units).collect()
    }

    /// One result per requested folder, all sharing the whole transcript.
    fn undivided_results(
        &self,
        transcript: &str,
        error: Option<&ExecutionError>,
    ) -> (Vec<ExecutionResult>, ResourceChanges) {
        let changes = parse_resource_changes(transcript);
        let units = self
            .config
            .folders
            .iter()
            .map(|folder| ExecutionResult {
                folder: folder.clone(),
                output: transcript.to_string(),
                error: error.cloned(),
                changes: Some(changes),
                success: error.is_none(),
                kind: UnitKind::Folder,
            })
            .collect();
        (units, changes)
    }

    fn invocation(&self, args: Vec<String>, cwd: PathBuf) -> Invocation {
        Invocation {
            program: self.config.tool_binary.clone(),
            args,
            cwd,
            env: AUTOMATION_ENV
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Results for each demultiplexed module, and their summed changes.
///
/// A module fails when the run failed or its own output carries an error
/// line. Unattributed text is appended to the last module.
fn module_results(
    demuxed: DemuxedTranscript,
    relative: &[(String, String)],
    error: Option<&ExecutionError>,
) -> (Vec<ExecutionResult>, ResourceChanges) {
    let mut total = ResourceChanges::none();
    let mut units: Vec<ExecutionResult> = demuxed
        .modules
        .into_iter()
        .map(|module| {
            let changes = parse_resource_changes(&module.output);
            total += changes;
            let error_prefix = Dialect::detect(&module.output).phrases().error_prefix;
            let success = error.is_none() && !module.output.contains(error_prefix);
            ExecutionResult {
                folder: reconcile_module_name(&module.module, relative),
                output: extract_plan_output(&module.output),
                error: if success { None } else { error.cloned() },
                changes: Some(changes),
                success,
                kind: UnitKind::Folder,
            }
        })
        .collect();

    if let (Some(summary), Some(last)) = (demuxed.unattributed, units.last_mut()) {
        last.output.push_str("\n\n");
        last.output.push_str(&summary);
    }
    (units, total)
}

fn exit_error(output: &ProcessOutput) -> Option<ExecutionError> {
    (!output.success).then_some(ExecutionError::ExitStatus { code: output.code })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParallelConfig, RunnerConfig};
    use crate::testkit::ScriptedRunner;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn execution(folders: &[&str]) -> ExecutionConfig {
        let mut config = RunnerConfig::for_folders(folders).execution;
        config.repo_root = PathBuf::from("/repo");
        config
    }

    #[test]
    fn test_sequential_mixed_outcomes() {
        let mut config = execution(&["a", "b"]);
        config.parallel = ParallelConfig::sequential();
        let runner = ScriptedRunner::new()
            .succeed_in("/repo/a", "Plan: 1 to add, 0 to change, 0 to destroy.\n")
            .fail_in("/repo/b", 1, "Error: bad config\n");

        let results = FolderExecutionEngine::new(&config, &runner).execute();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].folder, "a");
        assert!(results[0].success);
        assert_eq!(results[0].changes.map(|c| c.to_add), Some(1));
        assert_eq!(results[1].folder, "b");
        assert!(!results[1].success);
        assert_eq!(
            results[1].error,
            Some(ExecutionError::ExitStatus { code: Some(1) })
        );
        assert!(!overall_success(&results));
    }

    #[test]
    fn test_parallel_results_keyed_by_folder() {
        let config = execution(&["a", "b", "c", "d"]);
        let runner = ScriptedRunner::new()
            .succeed_in("/repo/a", "Plan: 1 to add, 0 to change, 0 to destroy.")
            .succeed_in("/repo/b", "Plan: 2 to add, 0 to change, 0 to destroy.")
            .succeed_in("/repo/c", "No changes.")
            .fail_in("/repo/d", 2, "Error: boom");

        let results = FolderExecutionEngine::new(&config, &runner).execute();
        let by_folder: BTreeMap<_, _> = results
            .iter()
            .map(|r| (r.folder.as_str(), r.success))
            .collect();

        assert_eq!(
            by_folder,
            BTreeMap::from([("a", true), ("b", true), ("c", true), ("d", false)])
        );
        assert_eq!(runner.invocations().len(), 4);
    }

    #[test]
    fn test_invocation_shape() {
        let mut config = execution(&["live/a"]);
        config.extra_args = "--non-interactive -lock=false".into();
        let runner = ScriptedRunner::new().succeed_in("/repo/live/a", "No changes.");

        FolderExecutionEngine::new(&config, &runner).execute();

        let calls = runner.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "terragrunt");
        assert_eq!(calls[0].cwd, Path::new("/repo/live/a"));
        assert_eq!(calls[0].args, vec!["plan", "--non-interactive", "-lock=false"]);
        assert!(calls[0]
            .env
            .contains(&("TG_NON_INTERACTIVE".to_string(), "true".to_string())));
    }

    #[test]
    fn test_forbidden_args_fail_every_folder_without_spawning() {
        let mut config = execution(&["a", "b"]);
        config.extra_args = "--foo; rm -rf /".into();
        let runner = ScriptedRunner::new();

        let results = FolderExecutionEngine::new(&config, &runner).execute();

        assert_eq!(results.len(), 2);
        assert!(results
            .iter()
            .all(|r| matches!(r.error, Some(ExecutionError::Sanitize(_)))));
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn test_spawn_failure_is_per_folder() {
        let mut config = execution(&["a", "b"]);
        config.parallel = ParallelConfig::sequential();
        let runner = ScriptedRunner::new()
            .spawn_error_in("/repo/a", "permission denied")
            .succeed_in("/repo/b", "No changes.");

        let results = FolderExecutionEngine::new(&config, &runner).execute();

        assert!(matches!(results[0].error, Some(ExecutionError::Spawn { .. })));
        assert!(results[1].success);
    }

    #[test]
    fn test_folder_output_is_extracted() {
        let mut config = execution(&["a"]);
        config.parallel = ParallelConfig::sequential();
        let transcript = indoc! {"
            Initializing the backend...
            Terraform will perform the following actions:
              # aws_s3_bucket.b will be created
            Plan: 1 to add, 0 to change, 0 to destroy.
            Releasing state lock. This may take a few moments...
        "};
        let runner = ScriptedRunner::new().succeed_in("/repo/a", transcript);

        let results = FolderExecutionEngine::new(&config, &runner).execute();

        assert_eq!(
            results[0].output,
            "Terraform will perform the following actions:\n  # aws_s3_bucket.b will be created\nPlan: 1 to add, 0 to change, 0 to destroy."
        );
    }

    fn aggregate_config() -> ExecutionConfig {
        let mut config = execution(&["live/a", "live/b"]);
        config.command = "run --all plan".into();
        config.root_dir = "live".into();
        config
    }

    #[test]
    fn test_aggregate_demux_and_reconcile() {
        let config = aggregate_config();
        let transcript = indoc! {"
            [a] Plan: 1 to add, 0 to change, 0 to destroy.
            [b] No changes. Your infrastructure matches the configuration.
            ❯❯ Run Summary  2 units  3s
               Succeeded    2
        "};
        let runner = ScriptedRunner::new().succeed_in("/repo/live", transcript);

        let results = FolderExecutionEngine::new(&config, &runner).execute();

        assert_eq!(results.len(), 3);
        let whole = &results[0];
        assert!(whole.is_aggregate());
        assert_eq!(whole.folder, "live");
        assert_eq!(whole.output, transcript);
        assert_eq!(whole.changes.map(|c| (c.to_add, c.no_changes)), Some((1, false)));

        assert_eq!(results[1].folder, "live/a");
        assert_eq!(results[1].changes.map(|c| c.to_add), Some(1));
        assert_eq!(results[2].folder, "live/b");
        assert!(results[2].has_no_changes());
        assert!(results[2].output.ends_with("Succeeded    2"));
    }

    #[test]
    fn test_aggregate_invocation() {
        let config = aggregate_config();
        let runner = ScriptedRunner::new().succeed_in("/repo/live", "[a] No changes.");

        FolderExecutionEngine::new(&config, &runner).execute();

        let calls = runner.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].cwd, Path::new("/repo/live"));
        assert_eq!(
            calls[0].args,
            vec![
                "run",
                "--all",
                "--parallelism",
                "5",
                "--queue-include-dir",
                "a",
                "--queue-include-dir",
                "b",
                "--queue-include-external",
                "plan",
            ]
        );
    }

    #[test]
    fn test_aggregate_module_error_line_fails_module_only() {
        let config = aggregate_config();
        let transcript = "[a] Plan: 1 to add, 0 to change, 0 to destroy.\n[b] Error: Unsupported argument\n";
        let runner = ScriptedRunner::new().succeed_in("/repo/live", transcript);

        let results = FolderExecutionEngine::new(&config, &runner).execute();

        assert!(results[0].success);
        assert!(results[1].success);
        assert!(!results[2].success);
        assert_eq!(results[2].error, None);
        assert!(!overall_success(&results));
    }

    #[test]
    fn test_aggregate_undivided_fallback() {
        let config = aggregate_config();
        let transcript = "Plan: 2 to add, 0 to change, 1 to destroy.\n";
        let runner = ScriptedRunner::new().fail_in("/repo/live", 1, transcript);

        let results = FolderExecutionEngine::new(&config, &runner).execute();

        assert_eq!(results.len(), 3);
        for unit in &results[1..] {
            assert_eq!(unit.output, transcript);
            assert_eq!(unit.changes.map(|c| (c.to_add, c.to_destroy)), Some((2, 1)));
            assert!(!unit.success);
        }
        assert_eq!(results[0].changes, results[1].changes);
        assert!(!results[0].success);
    }

    #[test]
    fn test_aggregate_rejected_args_yield_single_failed_row() {
        let mut config = aggregate_config();
        config.extra_args = "$(whoami)".into();
        let runner = ScriptedRunner::new();

        let results = FolderExecutionEngine::new(&config, &runner).execute();

        assert_eq!(results.len(), 1);
        assert!(results[0].is_aggregate());
        assert!(!results[0].success);
        assert!(runner.invocations().is_empty());
    }
}
