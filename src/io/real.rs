//! Production implementations of the I/O traits.

use crate::errors::ExecutionError;
use crate::io::traits::{Invocation, ProcessOutput, ProcessRunner, RepoDiscovery};
use anyhow::{Context as _, Result};
use git2::Repository;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs processes with `std::process::Command`.
#[derive(Debug, Default, Clone)]
pub struct RealProcessRunner;

impl RealProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for RealProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, ExecutionError> {
        let program =
            which::which(&invocation.program).map_err(|e| ExecutionError::ToolNotFound {
                program: invocation.program.clone(),
                message: e.to_string(),
            })?;

        let output = Command::new(&program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .map_err(|e| ExecutionError::Spawn {
                program: invocation.program.clone(),
                dir: invocation.cwd.clone(),
                message: e.to_string(),
            })?;

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Repository discovery through libgit2.
///
/// `git2::Repository` is not `Sync`, so each call opens its own handle.
#[derive(Debug, Default, Clone)]
pub struct GitDiscovery;

impl GitDiscovery {
    pub fn new() -> Self {
        Self
    }
}

impl RepoDiscovery for GitDiscovery {
    fn repository_root(&self, start: &Path) -> Result<PathBuf> {
        let repo = Repository::discover(start).with_context(|| {
            format!("Failed to discover git repository at {}", start.display())
        })?;
        repo.workdir()
            .map(Path::to_path_buf)
            .context("Repository has no working directory")
    }

    fn changed_files(&self, root: &Path) -> Result<Vec<String>> {
        let repo = Repository::discover(root).with_context(|| {
            format!("Failed to discover git repository at {}", root.display())
        })?;
        let base = repo
            .revparse_single("HEAD~1")
            .and_then(|object| object.peel_to_tree())
            .context("Failed to resolve HEAD~1")?;
        let diff = repo
            .diff_tree_to_workdir_with_index(Some(&base), None)
            .context("Failed to diff HEAD~1 against the working tree")?;

        Ok(diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(|path| path.to_string_lossy().into_owned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_binary_is_tool_not_found() {
        let runner = RealProcessRunner::new();
        let invocation = Invocation {
            program: "definitely-not-a-real-binary-4f2a".into(),
            args: Vec::new(),
            cwd: std::env::temp_dir(),
            env: Vec::new(),
        };
        let err = runner.run(&invocation).unwrap_err();
        assert!(matches!(err, ExecutionError::ToolNotFound { .. }), "{err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_streams_and_exit_code() {
        let dir = TempDir::new().unwrap();
        let runner = RealProcessRunner::new();
        let invocation = Invocation {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                "echo \"$TG_NON_INTERACTIVE\"; pwd; echo oops >&2; exit 3".into(),
            ],
            cwd: dir.path().to_path_buf(),
            env: vec![("TG_NON_INTERACTIVE".into(), "true".into())],
        };
        let output = runner.run(&invocation).unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert!(output.stdout.starts_with("true\n"));
        assert_eq!(output.stderr, "oops\n");
    }

    #[test]
    fn test_repository_root_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        let nested = dir.path().join("live/a");
        std::fs::create_dir_all(&nested).unwrap();

        let root = GitDiscovery::new().repository_root(&nested).unwrap();
        assert_eq!(
            root.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_repository_root_outside_repo_fails() {
        let dir = TempDir::new().unwrap();
        assert!(GitDiscovery::new().repository_root(dir.path()).is_err());
    }
}
