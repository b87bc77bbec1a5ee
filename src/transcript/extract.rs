//! Extraction of the plan/apply section from a planner transcript.
//!
//! The transcript is walked line by line through four states:
//!
//! ```text
//! Seeking --plan start--> Capturing --summary line--> Done --outputs marker--> InOutputs
//!    |                        |                                                   |
//!    +--no-op phrase----------+--> "No changes detected." (short-circuit)         |
//!                                                      completion phrase --> stop <+
//! ```
//!
//! An `Error:` line is kept and ends extraction from any state. When nothing
//! is captured, the last [`FALLBACK_TAIL_LINES`] lines are returned instead so
//! a comment never ends up empty.

use super::dialect::{Dialect, Phrases};
use super::normalize::normalize;

/// Message returned when the transcript reports a no-op.
pub const NO_CHANGES_MESSAGE: &str = "No changes detected.";

/// Number of trailing lines kept when no section could be recognized.
pub const FALLBACK_TAIL_LINES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractState {
    Seeking,
    Capturing,
    Done,
    InOutputs,
}

enum Step {
    Continue,
    Stop,
    NoChanges,
}

/// Line-oriented extractor for one dialect's phrase table.
pub struct PlanOutputExtractor {
    phrases: &'static Phrases,
    state: ExtractState,
    captured: Vec<String>,
}

impl PlanOutputExtractor {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            phrases: dialect.phrases(),
            state: ExtractState::Seeking,
            captured: Vec::new(),
        }
    }

    /// Run the state machine over `raw` and return the relevant section.
    pub fn extract(mut self, raw: &str) -> String {
        let cleaned = normalize(raw);
        for line in cleaned.split('\n') {
            match self.step(line) {
                Step::Continue => {}
                Step::Stop => break,
                Step::NoChanges => return NO_CHANGES_MESSAGE.to_string(),
            }
        }

        if self.captured.is_empty() {
            return tail_lines(&cleaned, FALLBACK_TAIL_LINES);
        }
        trim_trailing_blank_lines(&self.captured.join("\n")).to_string()
    }

    fn step(&mut self, line: &str) -> Step {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();

        if trimmed.starts_with(self.phrases.error_prefix) {
            self.captured.push(line.to_string());
            return Step::Stop;
        }

        match self.state {
            ExtractState::Seeking | ExtractState::Capturing if self.phrases.is_no_op(&lower) => {
                Step::NoChanges
            }
            ExtractState::Seeking => {
                if self.phrases.is_plan_start(&lower) {
                    self.captured.push(line.to_string());
                    self.state = ExtractState::Capturing;
                } else if trimmed.starts_with(self.phrases.summary_prefix) {
                    self.captured.push(line.to_string());
                    self.state = ExtractState::Done;
                } else if trimmed.starts_with(self.phrases.outputs_marker) {
                    self.enter_outputs(line);
                }
                Step::Continue
            }
            ExtractState::Capturing => {
                if trimmed.starts_with(self.phrases.summary_prefix) {
                    self.state = ExtractState::Done;
                }
                // Output-only plans print the outputs section without a summary.
                if trimmed.starts_with(self.phrases.outputs_marker) {
                    self.enter_outputs(line);
                } else {
                    self.captured.push(line.to_string());
                }
                Step::Continue
            }
            ExtractState::Done => {
                if trimmed.starts_with(self.phrases.outputs_marker) {
                    self.enter_outputs(line);
                }
                Step::Continue
            }
            ExtractState::InOutputs => {
                self.captured.push(line.to_string());
                if self.phrases.is_completion(&lower) {
                    Step::Stop
                } else {
                    Step::Continue
                }
            }
        }
    }

    fn enter_outputs(&mut self, line: &str) {
        if self.captured.last().is_some_and(|l| !l.trim().is_empty()) {
            self.captured.push(String::new());
        }
        self.captured.push(line.to_string());
        self.state = ExtractState::InOutputs;
    }
}

/// Extract the relevant section of `raw`, detecting the dialect from its text.
///
/// # Examples
///
/// ```
/// use terragrunt_runner::transcript::extract_plan_output;
///
/// let raw = "Refreshing state...\nTerraform will perform the following actions:\n\n  # a will be created\n\nPlan: 1 to add, 0 to change, 0 to destroy.\n";
/// let out = extract_plan_output(raw);
/// assert!(out.starts_with("Terraform will perform"));
/// assert!(out.ends_with("Plan: 1 to add, 0 to change, 0 to destroy."));
/// ```
pub fn extract_plan_output(raw: &str) -> String {
    let dialect = Dialect::detect(raw);
    PlanOutputExtractor::new(dialect).extract(raw)
}

/// Last `count` lines; blank-only tails are kept as they are.
fn tail_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let start = lines.len().saturating_sub(count);
    let tail = lines[start..].join("\n");
    match trim_trailing_blank_lines(&tail) {
        "" => tail,
        trimmed => trimmed.to_string(),
    }
}

fn trim_trailing_blank_lines(text: &str) -> &str {
    let mut end = text.len();
    for line in text.rsplit('\n') {
        if !line.trim().is_empty() {
            break;
        }
        // Drop the blank line and the newline that precedes it.
        end = end.saturating_sub(line.len() + 1);
    }
    &text[..end.min(text.len())]
}
