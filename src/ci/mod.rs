//! GitHub Actions workflow commands and console echo.
//!
//! Everything here writes to stdout, which the Actions runner parses for
//! `::command::` lines. Diagnostics go through `tracing` on stderr instead.

pub mod color;
pub mod outputs;

use colored::Colorize;
use std::io::{self, Write};

pub use color::ColorMode;
pub use outputs::{risk_warnings, write_job_outputs, JobOutputs};

/// Separator printed around each console group.
pub const SEPARATOR_LINE: &str = "#########################################################";

/// Format a workflow command line such as `::warning::message`.
pub fn workflow_command(name: &str, message: &str) -> String {
    format!("::{name}::{message}")
}

/// Ask the runner to redact `secret` from all subsequent log output.
pub fn add_mask(secret: &str) {
    if !secret.is_empty() {
        println!("{}", workflow_command("add-mask", secret));
    }
}

pub fn warning(message: &str) {
    println!("{}", workflow_command("warning", message));
}

pub fn error(message: &str) {
    println!("{}", workflow_command("error", message));
}

/// Write `body` inside a collapsible log group framed by separator lines.
pub fn write_group<W: Write>(out: &mut W, title: &str, body: &str) -> io::Result<()> {
    let separator = SEPARATOR_LINE.red();
    writeln!(out)?;
    writeln!(out, "{separator}")?;
    writeln!(out, "{}", workflow_command("group", title))?;
    out.write_all(body.as_bytes())?;
    if !body.is_empty() && !body.ends_with('\n') {
        writeln!(out)?;
    }
    writeln!(out, "::endgroup::")?;
    writeln!(out, "{separator}")?;
    out.flush()
}

/// Echo a unit's unfiltered transcript to the job console.
///
/// The whole group is written under one stdout lock so concurrent units do
/// not interleave.
pub fn echo_group(title: &str, body: &str) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_group(&mut out, title, body) {
        tracing::debug!(error = %e, "Failed to echo console group");
    }
}
