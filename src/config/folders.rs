//! Folder list parsing and lexical path cleaning.

use std::collections::HashSet;

/// Split a folder list on commas, spaces and newlines.
///
/// ```
/// use terragrunt_runner::config::parse_folders;
///
/// assert_eq!(parse_folders("a, b\nc"), vec!["a", "b", "c"]);
/// ```
pub fn parse_folders(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Clean every folder and drop duplicates, keeping first occurrences.
pub fn unique_folders<I, S>(folders: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    folders
        .into_iter()
        .map(|f| clean_path(f.as_ref()))
        .filter(|f| seen.insert(f.clone()))
        .collect()
}

/// Lexically clean a slash-separated path.
///
/// Collapses repeated separators, drops `.` segments and trailing slashes, and
/// resolves `name/..` pairs. Leading `..` segments of a relative path are kept
/// so validation can reject them. An empty result becomes `.`.
pub fn clean_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// True when the cleaned path still climbs out of its base.
pub fn has_parent_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == "..")
}
