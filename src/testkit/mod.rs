//! Testing infrastructure for terragrunt-runner.
//!
//! - **[`ScriptedRunner`]**: a [`ProcessRunner`](crate::io::ProcessRunner)
//!   replaying canned tool output per working directory
//! - **[`InMemoryComments`]**: a [`CommentApi`](crate::io::CommentApi) backed
//!   by a vector, with injectable failures
//! - **Fixtures**: transcripts shaped like real Terragrunt output
//!
//! # Quick Start
//!
//! ```rust
//! use terragrunt_runner::config::RunnerConfig;
//! use terragrunt_runner::execution::FolderExecutionEngine;
//! use terragrunt_runner::testkit::{fixtures, ScriptedRunner};
//!
//! let mut config = RunnerConfig::for_folders(["a"]).execution;
//! config.repo_root = "/repo".into();
//! let runner = ScriptedRunner::new().succeed_in("/repo/a", fixtures::PLAN_ONE_ADD);
//!
//! let results = FolderExecutionEngine::new(&config, &runner).execute();
//! assert!(results[0].success);
//! ```

pub mod fixtures;
pub mod mock_env;

pub use mock_env::{InMemoryComments, ScriptedRunner};
