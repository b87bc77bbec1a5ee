//! Run Terragrunt across project folders in CI and report the results on the
//! pull request.
//!
//! The pipeline is:
//!
//! 1. [`config`] builds an immutable [`config::RunnerConfig`]
//! 2. [`execution`] runs the tool per folder, or once with `run --all`
//! 3. [`transcript`] cleans the transcripts and tallies resource changes
//! 4. [`report`] turns results into size-bounded comment bodies
//! 5. [`publish`] replaces the previous bot comments with the new ones

// Export modules for library usage
pub mod ci;
pub mod cli;
pub mod config;
pub mod detect;
pub mod errors;
pub mod execution;
pub mod github;
pub mod io;
pub mod publish;
pub mod report;
pub mod sanitize;
pub mod testkit;
pub mod transcript;

// Re-export commonly used types
pub use crate::config::{ExecutionConfig, ParallelConfig, RunnerConfig, RunnerSettings};
pub use crate::errors::{CommentError, ConfigError, ExecutionError, SanitizeError};
pub use crate::execution::{overall_success, ExecutionResult, FolderExecutionEngine, UnitKind};
pub use crate::report::ReportAssembler;
pub use crate::transcript::{extract_plan_output, normalize, parse_resource_changes, ResourceChanges};
