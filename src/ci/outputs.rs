//! Step outputs written to the `$GITHUB_OUTPUT` file.

use crate::execution::{ExecutionResult, UnitKind};
use crate::transcript::ResourceChanges;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Destroy count above which a risk warning is emitted.
pub const DESTROY_WARNING_THRESHOLD: usize = 10;

/// Total change count above which a size warning is emitted.
pub const TOTAL_WARNING_THRESHOLD: usize = 50;

/// Aggregate values exposed to later workflow steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobOutputs {
    pub success: bool,
    pub to_add: usize,
    pub to_change: usize,
    pub to_destroy: usize,
    pub to_replace: usize,
}

impl JobOutputs {
    /// Totals across a run.
    ///
    /// When an aggregate row is present its counts already cover every
    /// module, so only that row is counted.
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        let aggregate = results.iter().find(|r| r.kind == UnitKind::Aggregate);
        let counted: Vec<&ExecutionResult> = match aggregate {
            Some(row) => vec![row],
            None => results.iter().collect(),
        };

        let mut totals = ResourceChanges::default();
        for changes in counted.iter().filter_map(|r| r.changes) {
            totals += changes;
        }

        Self {
            success: results.iter().all(|r| r.success),
            to_add: totals.to_add,
            to_change: totals.to_change,
            to_destroy: totals.to_destroy,
            to_replace: totals.to_replace,
        }
    }

    pub fn total(&self) -> usize {
        self.to_add + self.to_change + self.to_destroy + self.to_replace
    }

    /// `key=value` lines in output-file order.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("success={}", self.success),
            format!("total-resources-to-add={}", self.to_add),
            format!("total-resources-to-change={}", self.to_change),
            format!("total-resources-to-destroy={}", self.to_destroy),
            format!("total-resources-to-replace={}", self.to_replace),
        ]
    }
}

/// Append the outputs to `path`, creating it if needed.
pub fn write_job_outputs(path: &Path, outputs: &JobOutputs) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for line in outputs.lines() {
        writeln!(file, "{line}")?;
    }
    Ok(())
}

/// Warning messages for unusually destructive or large runs.
pub fn risk_warnings(outputs: &JobOutputs) -> Vec<String> {
    let mut warnings = Vec::new();
    if outputs.to_destroy > DESTROY_WARNING_THRESHOLD {
        warnings.push(format!(
            "High destruction risk: {} resources",
            outputs.to_destroy
        ));
    }
    if outputs.total() > TOTAL_WARNING_THRESHOLD {
        warnings.push(format!("Large changes: {} total resources", outputs.total()));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn result(kind: UnitKind, add: usize, success: bool) -> ExecutionResult {
        ExecutionResult {
            folder: "x".into(),
            output: String::new(),
            error: None,
            changes: Some(ResourceChanges {
                to_add: add,
                ..ResourceChanges::default()
            }),
            success,
            kind,
        }
    }

    #[test]
    fn test_folder_rows_are_summed() {
        let results = [
            result(UnitKind::Folder, 1, true),
            result(UnitKind::Folder, 2, false),
        ];
        let outputs = JobOutputs::from_results(&results);
        assert_eq!(outputs.to_add, 3);
        assert!(!outputs.success);
    }

    #[test]
    fn test_aggregate_row_is_not_double_counted() {
        let results = [
            result(UnitKind::Aggregate, 3, true),
            result(UnitKind::Folder, 1, true),
            result(UnitKind::Folder, 2, true),
        ];
        let outputs = JobOutputs::from_results(&results);
        assert_eq!(outputs.to_add, 3);
        assert!(outputs.success);
    }

    #[test]
    fn test_write_appends_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output");
        std::fs::write(&path, "existing=1\n").unwrap();

        let outputs = JobOutputs {
            success: true,
            to_add: 1,
            to_change: 2,
            to_destroy: 3,
            to_replace: 4,
        };
        write_job_outputs(&path, &outputs).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "existing=1\nsuccess=true\ntotal-resources-to-add=1\ntotal-resources-to-change=2\ntotal-resources-to-destroy=3\ntotal-resources-to-replace=4\n"
        );
    }

    #[test]
    fn test_risk_warning_thresholds() {
        let quiet = JobOutputs {
            to_destroy: 10,
            to_add: 40,
            ..JobOutputs::default()
        };
        assert!(risk_warnings(&quiet).is_empty());

        let loud = JobOutputs {
            to_destroy: 11,
            to_add: 40,
            ..JobOutputs::default()
        };
        assert_eq!(
            risk_warnings(&loud),
            vec![
                "High destruction risk: 11 resources".to_string(),
                "Large changes: 51 total resources".to_string(),
            ]
        );
    }
}
