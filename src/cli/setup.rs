//! Setup and console reporting for the CLI
//!
//! Logging initialization and the closing console summary.

use crate::execution::ExecutionResult;
use crate::report::table_rows;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter directive for the environment read by `lookup`.
///
/// `RUST_LOG` wins; otherwise `DEBUG=true` enables debug output.
pub fn log_filter<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(filter) = lookup("RUST_LOG").filter(|f| !f.trim().is_empty()) {
        return filter;
    }
    match lookup("DEBUG").as_deref() {
        Some("true") => "debug".to_string(),
        _ => "info".to_string(),
    }
}

/// Install the global tracing subscriber, writing to stderr.
///
/// Stdout carries the job console transcript and workflow commands.
pub fn init_logging() {
    let directive = log_filter(|key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Version line printed at startup.
pub fn version_banner() -> String {
    format!("Terragrunt Runner Version: {}", env!("CARGO_PKG_VERSION"))
}

fn count_cell(count: Option<usize>) -> Cell {
    match count {
        Some(n) if n > 0 => Cell::new(n),
        _ => Cell::new("-").fg(Color::DarkGrey),
    }
}

/// Per-unit status table for the job log.
pub fn summary_table(results: &[ExecutionResult]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["Folder", "Status", "Add", "Change", "Destroy", "Replace"]
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );

    for result in table_rows(results) {
        let status = if result.success {
            Cell::new("ok").fg(Color::Green)
        } else {
            Cell::new("failed").fg(Color::Red)
        };
        let changes = result.changes.filter(|c| !c.no_changes);
        table.add_row(vec![
            Cell::new(&result.folder),
            status,
            count_cell(changes.map(|c| c.to_add)),
            count_cell(changes.map(|c| c.to_change)),
            count_cell(changes.map(|c| c.to_destroy)),
            count_cell(changes.map(|c| c.to_replace)),
        ]);
    }
    table
}

/// Print the summary table and the failed units with their errors.
pub fn print_console_summary(results: &[ExecutionResult]) {
    println!("\n{}", summary_table(results));
    for result in results.iter().filter(|r| !r.success) {
        println!("Terragrunt execution failed for folder: {}", result.folder);
        if let Some(error) = &result.error {
            println!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExecutionError;
    use crate::execution::UnitKind;
    use crate::transcript::ResourceChanges;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_log_filter_precedence() {
        assert_eq!(log_filter(env(&[])), "info");
        assert_eq!(log_filter(env(&[("DEBUG", "true")])), "debug");
        assert_eq!(log_filter(env(&[("DEBUG", "1")])), "info");
        assert_eq!(
            log_filter(env(&[("DEBUG", "true"), ("RUST_LOG", "terragrunt_runner=trace")])),
            "terragrunt_runner=trace"
        );
    }

    #[test]
    fn test_summary_table_rows() {
        let results = vec![
            ExecutionResult {
                folder: "live/a".into(),
                output: String::new(),
                error: None,
                changes: Some(ResourceChanges {
                    to_add: 4,
                    ..ResourceChanges::default()
                }),
                success: true,
                kind: UnitKind::Folder,
            },
            ExecutionResult {
                folder: "live/b".into(),
                output: String::new(),
                error: Some(ExecutionError::ExitStatus { code: Some(1) }),
                changes: None,
                success: false,
                kind: UnitKind::Folder,
            },
        ];
        let rendered = summary_table(&results).to_string();
        assert!(rendered.contains("live/a"));
        assert!(rendered.contains("live/b"));
        assert!(rendered.contains("failed"));
        assert!(rendered.contains('4'));
    }
}
