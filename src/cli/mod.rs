//! CLI module for terragrunt-runner
//!
//! This module provides the command-line interface, including:
//! - Argument parsing (`args`)
//! - Pull request discovery from the workflow environment (`env_discovery`)
//! - Configuration building (`config_builder`)
//! - Logging and console summary (`setup`)

pub mod args;
pub mod config_builder;
pub mod env_discovery;
pub mod setup;

pub use args::Cli;
pub use config_builder::{build_settings, detection_config, requested_folders};
pub use env_discovery::{discover_pull_request, discover_pull_request_from_env};
pub use setup::{init_logging, print_console_summary, summary_table, version_banner};

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    args::parse_args()
}
