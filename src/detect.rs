//! Folder auto-detection from changed files.
//!
//! A changed file whose basename matches one of the configured glob patterns
//! selects the nearest ancestor directory (within `max_walk_up` levels)
//! holding the marker file.

use crate::config::{clean_path, unique_folders};
use crate::io::RepoDiscovery;
use anyhow::Result;
use glob::Pattern;
use std::path::Path;
use tracing::{debug, warn};

/// Default patterns for files that can affect a Terragrunt unit.
pub const DEFAULT_FILE_PATTERNS: &[&str] = &["*.hcl", "*.json", "*.yaml", "*.yml"];

/// Default marker file that identifies a unit directory.
pub const DEFAULT_MARKER_FILE: &str = "terragrunt.hcl";

/// Default number of directories inspected per changed file.
pub const DEFAULT_MAX_WALK_UP: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionConfig {
    pub file_patterns: Vec<String>,
    pub marker_file: String,
    /// Explicit changed files; git is asked when empty
    pub changed_files: Vec<String>,
    pub max_walk_up: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            file_patterns: DEFAULT_FILE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            marker_file: DEFAULT_MARKER_FILE.to_string(),
            changed_files: Vec::new(),
            max_walk_up: DEFAULT_MAX_WALK_UP,
        }
    }
}

/// Compile glob patterns, skipping (and logging) invalid ones.
fn compile_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!(pattern = p, error = %e, "Ignoring invalid file pattern");
                None
            }
        })
        .collect()
}

fn matches_any(file: &str, patterns: &[Pattern]) -> bool {
    let name = Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file);
    patterns.iter().any(|p| p.matches(name))
}

/// Nearest directory of `file` (relative to `repo_root`) that contains
/// `marker_file`, looking at no more than `max_walk_up` directories.
pub fn find_unit_directory(
    repo_root: &Path,
    file: &str,
    marker_file: &str,
    max_walk_up: usize,
) -> Option<String> {
    let mut dir = Path::new(file).parent().map(Path::to_path_buf).unwrap_or_default();

    for _ in 0..max_walk_up {
        if repo_root.join(&dir).join(marker_file).is_file() {
            let relative = dir.to_string_lossy().replace('\\', "/");
            return Some(clean_path(&relative));
        }
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => break,
        }
    }
    None
}

/// Unit folders touched by `files`, in first-seen order.
pub fn detect_from_files(repo_root: &Path, files: &[String], config: &DetectionConfig) -> Vec<String> {
    let patterns = compile_patterns(&config.file_patterns);
    let found = files
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty() && matches_any(f, &patterns))
        .filter_map(|f| {
            let dir = find_unit_directory(repo_root, f, &config.marker_file, config.max_walk_up);
            debug!(file = f, dir = ?dir, "Checked changed file");
            dir
        });
    unique_folders(found)
}

/// Detect unit folders, falling back to git for the changed file list.
///
/// # Errors
///
/// Returns an error when no explicit files were given and git cannot
/// produce a diff.
pub fn detect_folders(
    repo_root: &Path,
    config: &DetectionConfig,
    discovery: &dyn RepoDiscovery,
) -> Result<Vec<String>> {
    let files = if config.changed_files.is_empty() {
        discovery.changed_files(repo_root)?
    } else {
        config.changed_files.clone()
    };
    let folders = detect_from_files(repo_root, &files, config);
    debug!(changed = files.len(), detected = folders.len(), "Auto-detected folders");
    Ok(folders)
}
