//! Turning execution results into pull request comment bodies.
//!
//! - [`comment`]: per-unit header, collapsible body, chunking under the size
//!   ceiling
//! - [`summary`]: the closing status table

pub mod comment;
pub mod summary;

pub use comment::{
    body_content, render_comments, split_content, CommentChunk, HeaderStyle, CHUNK_BUDGET,
    MAX_COMMENT_SIZE,
};
pub use summary::{summary_comments, table_rows};

use crate::config::{CommentScope, RunnerConfig};
use crate::execution::ExecutionResult;

/// Headers that mark a comment as one of ours.
pub const BOT_COMMENT_HEADERS: &[&str] = &[
    "Terragrunt Execution",
    "Failed Terragrunt",
    "Terragrunt Summary",
    "Success Terragrunt",
    "✅ Success Terragrunt",
];

/// Builds every comment body for a run, in posting order.
#[derive(Debug, Clone, Copy)]
pub struct ReportAssembler<'a> {
    style: HeaderStyle<'a>,
    scope: CommentScope,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(command: &'a str, run_all: bool, scope: CommentScope) -> Self {
        Self {
            style: HeaderStyle { command, run_all },
            scope,
        }
    }

    pub fn from_config(config: &'a RunnerConfig) -> Self {
        Self::new(
            &config.execution.command,
            config.execution.is_run_all(),
            config.comment_scope,
        )
    }

    /// Results that get their own comment.
    ///
    /// In an aggregate run with the default scope only the whole-run row is
    /// posted; module rows appear in the summary table.
    pub fn commented<'r>(&self, results: &'r [ExecutionResult]) -> Vec<&'r ExecutionResult> {
        let aggregate_only =
            self.style.run_all && self.scope == CommentScope::Aggregate && results.len() > 1;
        if aggregate_only && results.iter().any(ExecutionResult::is_aggregate) {
            results.iter().filter(|r| r.is_aggregate()).collect()
        } else {
            results.iter().collect()
        }
    }

    /// Per-unit bodies followed by the summary bodies.
    pub fn assemble(&self, results: &[ExecutionResult]) -> Vec<String> {
        self.commented(results)
            .into_iter()
            .flat_map(|r| render_comments(&self.style, r))
            .chain(summary_comments(self.style.command, results))
            .collect()
    }
}
