//! Phrase table for the two supported planner dialects.
//!
//! Every wording the extractor and the change parser react to lives here,
//! keyed by dialect. Supporting a new upstream wording is a table edit; bump
//! [`PHRASE_TABLE_VERSION`] when doing so.
//!
//! Phrases are matched against the lowercased, trimmed line unless noted
//! otherwise. Prefixes are matched case-sensitively against the trimmed line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Revision of the phrase table below.
pub const PHRASE_TABLE_VERSION: u32 = 3;

/// The planner implementation that produced a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Terraform,
    OpenTofu,
}

/// Wording used by one dialect.
#[derive(Debug)]
pub struct Phrases {
    /// Start of the "actions to be performed" section
    pub plan_start: &'static [&'static str],
    /// Whole-run no-op markers
    pub no_op: &'static [&'static str],
    /// Prefix of the plan-summary line
    pub summary_prefix: &'static str,
    /// Prefix of the output-changes section
    pub outputs_marker: &'static str,
    /// Phrases that end the output-changes section
    pub completion: &'static [&'static str],
    /// Prefix of an error line
    pub error_prefix: &'static str,
    /// Per-resource heuristics, used when no summary line is present
    pub created: &'static [&'static str],
    pub updated: &'static [&'static str],
    pub destroyed: &'static [&'static str],
    pub replaced: &'static [&'static str],
    pub imported: &'static [&'static str],
    pub moved: &'static [&'static str],
    /// Any of these means some resource has a pending action
    pub pending_action: &'static [&'static str],
    /// Regex for the plan-summary line
    pub summary_pattern: &'static str,
}

static TERRAFORM: Phrases = Phrases {
    plan_start: &[
        "terraform will perform the following actions",
        "terraform used the selected providers to generate the following execution plan",
        "will perform the following actions",
        "used the selected providers to generate the following execution plan",
    ],
    no_op: &[
        "no changes",
        "your infrastructure matches the configuration",
    ],
    summary_prefix: "Plan:",
    outputs_marker: "Changes to Outputs:",
    completion: &["releasing state lock", "apply complete!", "destroy complete!"],
    error_prefix: "Error:",
    created: &["will be created", "will be added"],
    updated: &["will be updated", "will be changed", "will be modified"],
    destroyed: &["will be destroyed", "will be deleted"],
    replaced: &["must be replaced", "will be replaced"],
    imported: &["will be imported"],
    moved: &["has moved to"],
    pending_action: &["will be", "must be"],
    // Terraform >= 1.5 prefixes the import count.
    summary_pattern: r"Plan:\s+(?:(?P<import>\d+)\s+to\s+import,\s+)?(?P<add>\d+)\s+to\s+add,?\s+(?P<change>\d+)\s+to\s+change,?\s+(?P<destroy>\d+)\s+to\s+destroy",
};

static OPENTOFU: Phrases = Phrases {
    plan_start: &[
        "opentofu will perform the following actions",
        "opentofu used the selected providers to generate the following execution plan",
        "will perform the following actions",
        "used the selected providers to generate the following execution plan",
    ],
    no_op: &[
        "no changes",
        "your infrastructure matches the configuration",
    ],
    summary_prefix: "Plan:",
    outputs_marker: "Changes to Outputs:",
    completion: &["releasing state lock", "apply complete!", "destroy complete!"],
    error_prefix: "Error:",
    created: &["will be created", "will be added"],
    updated: &["will be updated", "will be changed", "will be modified"],
    destroyed: &["will be destroyed", "will be deleted"],
    replaced: &["must be replaced", "will be replaced"],
    imported: &["will be imported"],
    moved: &["has moved to"],
    pending_action: &["will be", "must be"],
    // OpenTofu may append a replace count after the destroy count.
    summary_pattern: r"Plan:\s+(?:(?P<import>\d+)\s+to\s+import,\s+)?(?P<add>\d+)\s+to\s+add,?\s+(?P<change>\d+)\s+to\s+change,?\s+(?P<destroy>\d+)\s+to\s+destroy(?:,?\s+(?P<replace>\d+)\s+to\s+replace)?",
};

static TERRAFORM_SUMMARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(TERRAFORM.summary_pattern).expect("terraform summary pattern is valid"));

static OPENTOFU_SUMMARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(OPENTOFU.summary_pattern).expect("opentofu summary pattern is valid"));

impl Dialect {
    /// All known dialects, most specific first.
    pub const ALL: [Dialect; 2] = [Dialect::OpenTofu, Dialect::Terraform];

    /// Guess the dialect from a normalized transcript.
    ///
    /// OpenTofu names itself in its banners; anything else is treated as
    /// Terraform.
    pub fn detect(text: &str) -> Self {
        if text.contains("OpenTofu") {
            Dialect::OpenTofu
        } else {
            Dialect::Terraform
        }
    }

    pub fn phrases(self) -> &'static Phrases {
        match self {
            Dialect::Terraform => &TERRAFORM,
            Dialect::OpenTofu => &OPENTOFU,
        }
    }

    pub fn summary_regex(self) -> &'static Regex {
        match self {
            Dialect::Terraform => &TERRAFORM_SUMMARY,
            Dialect::OpenTofu => &OPENTOFU_SUMMARY,
        }
    }

    /// Dialects to try for `text`: the detected one, then the others.
    pub fn candidates(text: &str) -> impl Iterator<Item = Dialect> {
        let detected = Dialect::detect(text);
        std::iter::once(detected).chain(Dialect::ALL.into_iter().filter(move |d| *d != detected))
    }
}

impl Phrases {
    /// True when the lowercased line contains any of `phrases`.
    pub fn any_in(phrases: &[&str], lower_line: &str) -> bool {
        phrases.iter().any(|phrase| lower_line.contains(phrase))
    }

    pub fn is_plan_start(&self, lower_line: &str) -> bool {
        Self::any_in(self.plan_start, lower_line)
    }

    pub fn is_no_op(&self, lower_line: &str) -> bool {
        Self::any_in(self.no_op, lower_line)
    }

    pub fn is_completion(&self, lower_line: &str) -> bool {
        Self::any_in(self.completion, lower_line)
    }
}
