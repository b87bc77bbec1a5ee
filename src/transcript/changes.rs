//! Resource change counts parsed from planner output.

use super::dialect::{Dialect, Phrases};
use super::normalize::normalize;
use std::ops::AddAssign;

/// Add/change/destroy/replace/import/move tallies for one execution unit.
///
/// When `no_changes` is set every count is zero. Counts derived from the
/// per-line heuristics (no summary line present) are approximate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceChanges {
    pub to_add: usize,
    pub to_change: usize,
    pub to_destroy: usize,
    pub to_replace: usize,
    pub to_import: usize,
    pub to_move: usize,
    pub no_changes: bool,
}

impl ResourceChanges {
    /// A tally that reports nothing to do.
    pub fn none() -> Self {
        Self {
            no_changes: true,
            ..Self::default()
        }
    }

    /// Sum of add, change, destroy and replace.
    pub fn total(&self) -> usize {
        self.to_add + self.to_change + self.to_destroy + self.to_replace
    }

    fn all_counts_zero(&self) -> bool {
        self.total() == 0 && self.to_import == 0 && self.to_move == 0
    }

    /// One-line summary such as `+2 add, ~1 change`.
    ///
    /// Only non-zero add/change/destroy/replace counts are listed.
    pub fn one_liner(&self) -> String {
        let mut parts = Vec::new();
        if self.to_add > 0 {
            parts.push(format!("+{} add", self.to_add));
        }
        if self.to_change > 0 {
            parts.push(format!("~{} change", self.to_change));
        }
        if self.to_destroy > 0 {
            parts.push(format!("-{} destroy", self.to_destroy));
        }
        if self.to_replace > 0 {
            parts.push(format!("/{} replace", self.to_replace));
        }
        parts.join(", ")
    }
}

impl AddAssign for ResourceChanges {
    /// Accumulates counts; the sum is a no-op only if both sides are.
    fn add_assign(&mut self, other: Self) {
        self.to_add += other.to_add;
        self.to_change += other.to_change;
        self.to_destroy += other.to_destroy;
        self.to_replace += other.to_replace;
        self.to_import += other.to_import;
        self.to_move += other.to_move;
        self.no_changes = self.no_changes && other.no_changes;
    }
}

/// Parse resource change counts from a (possibly colorized) transcript.
///
/// The plan-summary line is authoritative. Without one, counts come from
/// per-resource "will be ..." lines. Any recognized no-op phrase wins over
/// everything else. Output that matches neither a summary line nor any
/// pending-action phrase is reported as `no_changes`; this keeps unusual but
/// successful tool output from showing up as pending work.
///
/// # Examples
///
/// ```
/// use terragrunt_runner::transcript::parse_resource_changes;
///
/// let changes = parse_resource_changes("Plan: 2 to add, 3 to change, 1 to destroy.");
/// assert_eq!((changes.to_add, changes.to_change, changes.to_destroy), (2, 3, 1));
/// assert!(!changes.no_changes);
/// ```
pub fn parse_resource_changes(output: &str) -> ResourceChanges {
    let cleaned = normalize(output);
    let lower = cleaned.to_lowercase();
    let phrases = Dialect::detect(&cleaned).phrases();

    if phrases.is_no_op(&lower) {
        return ResourceChanges::none();
    }

    let mut changes =
        parse_summary_line(&cleaned).unwrap_or_else(|| count_resource_lines(&lower, phrases));
    changes.to_move = count_lines_with(&lower, phrases.moved);

    if changes.all_counts_zero() && !Phrases::any_in(phrases.pending_action, &lower) {
        changes.no_changes = true;
    }
    changes
}

fn parse_summary_line(cleaned: &str) -> Option<ResourceChanges> {
    Dialect::candidates(cleaned).find_map(|dialect| {
        let caps = dialect.summary_regex().captures(cleaned)?;
        let count = |name: &str| {
            caps.name(name)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .unwrap_or(0)
        };
        Some(ResourceChanges {
            to_add: count("add"),
            to_change: count("change"),
            to_destroy: count("destroy"),
            to_replace: count("replace"),
            to_import: count("import"),
            ..ResourceChanges::default()
        })
    })
}

fn count_resource_lines(lower: &str, phrases: &Phrases) -> ResourceChanges {
    ResourceChanges {
        to_add: count_lines_with(lower, phrases.created),
        to_change: count_lines_with(lower, phrases.updated),
        to_destroy: count_lines_with(lower, phrases.destroyed),
        to_replace: count_lines_with(lower, phrases.replaced),
        to_import: count_lines_with(lower, phrases.imported),
        ..ResourceChanges::default()
    }
}

fn count_lines_with(lower: &str, phrases: &[&str]) -> usize {
    lower
        .lines()
        .filter(|line| Phrases::any_in(phrases, line))
        .count()
}
