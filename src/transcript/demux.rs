//! Splitting a combined `run --all` transcript back into per-module chunks.
//!
//! Terragrunt prefixes each line of a unit's output with `[unit/path] `.
//! Untagged lines continue the most recent unit. Lines before the first tag
//! and everything from the run-summary banner onward belong to no unit and
//! are collected under [`UNATTRIBUTED_KEY`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Component, Path};

/// Reserved bucket name for lines not attributable to any module.
pub const UNATTRIBUTED_KEY: &str = "_summary";

/// Banners that start the end-of-run summary table.
pub const END_OF_RUN_MARKERS: &[&str] = &["Run Summary"];

static MODULE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(.*?)\] (.*)$").expect("module tag pattern is valid"));

/// Output of one module, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutput {
    pub module: String,
    pub output: String,
}

/// A demultiplexed transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemuxedTranscript {
    pub modules: Vec<ModuleOutput>,
    pub unattributed: Option<String>,
}

impl DemuxedTranscript {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.unattributed.is_none()
    }

    /// Every bucket keyed by module, the unattributed text under
    /// [`UNATTRIBUTED_KEY`].
    pub fn buckets(&self) -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = self
            .modules
            .iter()
            .map(|m| (m.module.clone(), m.output.clone()))
            .collect();
        if let Some(text) = &self.unattributed {
            map.insert(UNATTRIBUTED_KEY.to_string(), text.clone());
        }
        map
    }
}

/// Split a normalized aggregate transcript by module tag.
///
/// # Examples
///
/// ```
/// use terragrunt_runner::transcript::split_output_by_module;
///
/// let demuxed = split_output_by_module("[a] Plan: 1 to add, 0 to change, 0 to destroy.\n[b] No changes.");
/// assert_eq!(demuxed.modules.len(), 2);
/// assert_eq!(demuxed.modules[1].module, "b");
/// ```
pub fn split_output_by_module(output: &str) -> DemuxedTranscript {
    let mut modules: Vec<(String, Vec<&str>)> = Vec::new();
    let mut unattributed: Vec<&str> = Vec::new();
    let mut current: Option<usize> = None;
    let mut run_ended = false;

    for line in output.lines() {
        if run_ended || END_OF_RUN_MARKERS.iter().any(|m| line.contains(m)) {
            run_ended = true;
            unattributed.push(line);
            continue;
        }

        if let Some(caps) = MODULE_TAG.captures(line) {
            let (Some(tag), Some(rest)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let idx = match modules.iter().position(|(name, _)| name == tag.as_str()) {
                Some(idx) => idx,
                None => {
                    modules.push((tag.as_str().to_string(), Vec::new()));
                    modules.len() - 1
                }
            };
            modules[idx].1.push(rest.as_str());
            current = Some(idx);
        } else if let Some(idx) = current {
            modules[idx].1.push(line);
        } else {
            unattributed.push(line);
        }
    }

    let unattributed = unattributed.join("\n").trim().to_string();
    DemuxedTranscript {
        modules: modules
            .into_iter()
            .map(|(module, lines)| ModuleOutput {
                module,
                output: lines.join("\n").trim().to_string(),
            })
            .collect(),
        unattributed: (!unattributed.is_empty()).then_some(unattributed),
    }
}

/// Map a parsed module tag back to one of the caller's folder strings.
///
/// `relative_folders` pairs each original folder with its path relative to
/// the aggregate working directory. An exact match on that relative path wins;
/// otherwise the folder sharing the most trailing path components with the
/// tag is chosen (first wins on ties). With no overlap the tag is returned
/// unchanged.
pub fn reconcile_module_name(tag: &str, relative_folders: &[(String, String)]) -> String {
    if let Some((original, _)) = relative_folders.iter().find(|(_, rel)| rel == tag) {
        return original.clone();
    }

    let mut best: Option<(&str, usize)> = None;
    for (original, relative) in relative_folders {
        let shared = common_suffix_components(tag, relative)
            .max(common_suffix_components(tag, original));
        if shared > 0 && best.map_or(true, |(_, n)| shared > n) {
            best = Some((original.as_str(), shared));
        }
    }
    best.map_or_else(|| tag.to_string(), |(original, _)| original.to_string())
}

fn common_suffix_components(a: &str, b: &str) -> usize {
    let parts = |s: &str| -> Vec<String> {
        Path::new(s)
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect()
    };
    let (a, b) = (parts(a), parts(b));
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}
