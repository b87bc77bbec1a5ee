//! Pull request number discovery from the GitHub Actions environment.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Event payload location used by container actions.
pub const DEFAULT_EVENT_PATH: &str = "/github/workflow/event.json";

/// Number from a ref such as `refs/pull/42/merge`.
pub fn pr_from_ref(git_ref: &str) -> Option<u64> {
    let mut parts = git_ref.split('/');
    parts.find(|part| *part == "pull")?;
    parts.next()?.parse().ok()
}

/// `number` field of an event payload.
pub fn pr_from_event(payload: &str) -> Option<u64> {
    let value: Value = serde_json::from_str(payload).ok()?;
    match value.get("number")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn read_event(path: &Path) -> Option<u64> {
    match std::fs::read_to_string(path) {
        Ok(payload) => pr_from_event(&payload),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "GitHub event payload not readable");
            None
        }
    }
}

/// Discover the pull request number, 0 when none is found.
///
/// Checked in order: `GITHUB_PR_NUMBER`, a `pull/<n>` segment in
/// `GITHUB_REF`, and the `number` field of the event payload at
/// `GITHUB_EVENT_PATH` (or [`DEFAULT_EVENT_PATH`]).
pub fn discover_pull_request<F>(lookup: F) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(number) = lookup("GITHUB_PR_NUMBER").and_then(|v| v.trim().parse().ok()) {
        return number;
    }
    if let Some(number) = lookup("GITHUB_REF").as_deref().and_then(pr_from_ref) {
        return number;
    }
    let event_path = lookup("GITHUB_EVENT_PATH")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EVENT_PATH));
    read_event(&event_path).unwrap_or(0)
}

/// [`discover_pull_request`] against the process environment.
pub fn discover_pull_request_from_env() -> u64 {
    discover_pull_request(|key| std::env::var(key).ok())
}
