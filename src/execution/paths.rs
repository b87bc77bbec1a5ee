//! Folder path translation.
//!
//! Caller folders are relative to the repository root. Terragrunt resolves
//! `--queue-include-dir` relative to its own working directory, so every
//! folder passed to an aggregate run goes through [`relative_to`].

use std::path::{Component, Path, PathBuf};

/// Absolute path of `folder`: joined to `repo_root` unless already absolute.
pub fn resolve_folder(repo_root: &Path, folder: &str) -> PathBuf {
    let path = Path::new(folder);
    if path.is_absolute() {
        lexical_clean(path)
    } else {
        lexical_clean(&repo_root.join(path))
    }
}

/// Path of `folder` as seen from the aggregate working directory `run_dir`.
///
/// Both arguments are relative to `repo_root` (or absolute). The result uses
/// `/` separators; a folder equal to `run_dir` becomes `.`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use terragrunt_runner::execution::paths::relative_to;
///
/// let rel = relative_to(Path::new("/repo"), "live/accounts", "live/accounts/account1/baseline");
/// assert_eq!(rel, "account1/baseline");
/// ```
pub fn relative_to(repo_root: &Path, run_dir: &str, folder: &str) -> String {
    let base = resolve_folder(repo_root, run_dir);
    let target = resolve_folder(repo_root, folder);

    match pathdiff::diff_paths(&target, &base) {
        Some(rel) => to_slash(&rel),
        None => trim_root_prefix(folder, run_dir),
    }
}

fn trim_root_prefix(folder: &str, run_dir: &str) -> String {
    let trimmed = folder
        .strip_prefix(run_dir)
        .unwrap_or(folder)
        .trim_start_matches('/');
    if trimmed.is_empty() {
        ".".to_string()
    } else {
        trimmed.to_string()
    }
}

fn to_slash(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_queue_include_translation() {
        let repo = Path::new("/repo");
        let cases = [
            ("live", "live/a", "a"),
            ("live", "live/a/b/", "a/b"),
            ("live/accounts", "live/accounts/account1/baseline", "account1/baseline"),
            ("live", "live", "."),
            (".", "live/a", "live/a"),
            ("live", "other/x", "../other/x"),
            ("live", "/repo/live/a", "a"),
        ];
        for (run_dir, folder, expected) in cases {
            assert_eq!(
                relative_to(repo, run_dir, folder),
                expected,
                "run_dir={run_dir} folder={folder}"
            );
        }
    }

    #[test]
    fn test_workspace_prefixed_absolute_folder() {
        let repo = Path::new("/workspace");
        assert_eq!(relative_to(repo, "live", "/workspace/live/prod/vpc"), "prod/vpc");
    }

    #[test]
    fn test_relative_repo_root() {
        assert_eq!(relative_to(Path::new("."), "live", "live/a"), "a");
    }

    #[test]
    fn test_trim_root_prefix_fallback() {
        assert_eq!(trim_root_prefix("live/a", "live"), "a");
        assert_eq!(trim_root_prefix("live", "live"), ".");
        assert_eq!(trim_root_prefix("other/a", "live"), "other/a");
    }

    #[test]
    fn test_resolve_folder() {
        let repo = Path::new("/repo");
        assert_eq!(resolve_folder(repo, "live/a"), PathBuf::from("/repo/live/a"));
        assert_eq!(resolve_folder(repo, "./live/../live/a"), PathBuf::from("/repo/live/a"));
        assert_eq!(resolve_folder(repo, "/abs/dir"), PathBuf::from("/abs/dir"));
        assert_eq!(resolve_folder(repo, "."), PathBuf::from("/repo"));
    }
}
