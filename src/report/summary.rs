//! The closing summary comment.

use super::comment::CHUNK_BUDGET;
use crate::execution::ExecutionResult;
use crate::transcript::ResourceChanges;

const TABLE_HEADER: &str = "| Folder | Status | Add | Change | Destroy | Replace |\n|--------|--------|-----|--------|---------|---------|\n";

/// Rows shown in the summary table.
///
/// The whole-run row of an aggregate run is left out when module rows exist;
/// its counts would be counted twice.
pub fn table_rows(results: &[ExecutionResult]) -> Vec<&ExecutionResult> {
    let has_units = results.iter().any(|r| !r.is_aggregate());
    results
        .iter()
        .filter(|r| !(has_units && r.is_aggregate()))
        .collect()
}

fn cell(count: usize, sign: char) -> String {
    if count > 0 {
        format!("{sign}{count}")
    } else {
        "0".to_string()
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn format_row(folder: &str, status: &str, changes: &ResourceChanges) -> String {
    format!(
        "| {} | {status} | {} | {} | {} | {} |\n",
        escape_cell(folder),
        cell(changes.to_add, '+'),
        cell(changes.to_change, '~'),
        cell(changes.to_destroy, '-'),
        cell(changes.to_replace, '/'),
    )
}

/// Summary comment bodies; more than one only when the table is too large
/// for a single comment.
///
/// # Examples
///
/// ```
/// use terragrunt_runner::report::summary_comments;
///
/// let bodies = summary_comments("plan", &[]);
/// assert_eq!(bodies.len(), 1);
/// assert!(bodies[0].starts_with("## Terragrunt Summary\n\n**Command:** plan\n**Folders:** 0\n"));
/// ```
pub fn summary_comments(command: &str, results: &[ExecutionResult]) -> Vec<String> {
    let rows = table_rows(results);
    let mut totals = ResourceChanges::default();
    let mut succeeded = 0;
    let mut unchanged = 0;

    let lines: Vec<String> = rows
        .iter()
        .map(|r| {
            let status = if r.success {
                succeeded += 1;
                "✅"
            } else {
                "❌"
            };
            let changes = match r.changes {
                Some(c) if c.no_changes => {
                    if r.success {
                        unchanged += 1;
                    }
                    ResourceChanges::default()
                }
                Some(c) => {
                    totals += c;
                    c
                }
                None => ResourceChanges::default(),
            };
            format_row(&r.folder, status, &changes)
        })
        .collect();

    let mut last_lines = vec![format_row("**Total**", "", &totals)];
    last_lines.push(format!(
        "\n- Success: {succeeded}/{}\n- No Changes: {unchanged}\n",
        rows.len()
    ));
    let footer = last_lines.concat();

    let preamble = |title: &str| {
        format!(
            "## {title}\n\n**Command:** {command}\n**Folders:** {}\n\n{TABLE_HEADER}",
            rows.len()
        )
    };

    let budget = CHUNK_BUDGET
        .saturating_sub(preamble("Terragrunt Summary (Part 00/00)").len() + footer.len());
    let pages = pack_rows(&lines, budget);
    let total = pages.len();

    pages
        .into_iter()
        .enumerate()
        .map(|(i, page)| {
            let title = if total == 1 {
                "Terragrunt Summary".to_string()
            } else {
                format!("Terragrunt Summary (Part {}/{total})", i + 1)
            };
            let mut body = preamble(&title);
            body.push_str(&page);
            if i + 1 == total {
                body.push_str(&footer);
            }
            body
        })
        .collect()
}

/// Group rows into pages of at most `budget` bytes; always at least one page.
fn pack_rows(lines: &[String], budget: usize) -> Vec<String> {
    let mut pages = vec![String::new()];
    for line in lines {
        if let Some(page) = pages.last_mut() {
            if page.is_empty() || page.len() + line.len() <= budget {
                page.push_str(line);
                continue;
            }
        }
        pages.push(line.clone());
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExecutionError;
    use crate::execution::UnitKind;
    use crate::report::comment::MAX_COMMENT_SIZE;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn row(folder: &str, changes: Option<ResourceChanges>, success: bool) -> ExecutionResult {
        ExecutionResult {
            folder: folder.into(),
            output: String::new(),
            error: (!success).then_some(ExecutionError::ExitStatus { code: Some(1) }),
            changes,
            success,
            kind: UnitKind::Folder,
        }
    }

    fn adds(n: usize) -> Option<ResourceChanges> {
        Some(ResourceChanges {
            to_add: n,
            ..ResourceChanges::default()
        })
    }

    #[test]
    fn test_summary_table() {
        let results = [
            row("a", adds(1), true),
            row("b", Some(ResourceChanges::none()), false),
            row("c", None, true),
        ];
        let bodies = summary_comments("plan", &results);
        assert_eq!(
            bodies,
            vec![indoc! {"
                ## Terragrunt Summary

                **Command:** plan
                **Folders:** 3

                | Folder | Status | Add | Change | Destroy | Replace |
                |--------|--------|-----|--------|---------|---------|
                | a | ✅ | +1 | 0 | 0 | 0 |
                | b | ❌ | 0 | 0 | 0 | 0 |
                | c | ✅ | 0 | 0 | 0 | 0 |
                | **Total** |  | +1 | 0 | 0 | 0 |

                - Success: 2/3
                - No Changes: 0
            "}
            .to_string()]
        );
    }

    #[test]
    fn test_failed_rows_not_counted_as_unchanged() {
        let results = [
            row("a", Some(ResourceChanges::none()), true),
            row("b", Some(ResourceChanges::none()), false),
        ];
        let body = &summary_comments("plan", &results)[0];
        assert!(body.ends_with("- Success: 1/2\n- No Changes: 1\n"));
    }

    #[test]
    fn test_aggregate_row_excluded() {
        let mut whole = row("live", adds(3), true);
        whole.kind = UnitKind::Aggregate;
        let results = [whole, row("live/a", adds(1), true), row("live/b", adds(2), true)];

        let body = &summary_comments("run --all plan", &results)[0];
        assert!(body.contains("**Folders:** 2\n"));
        assert!(!body.contains("| live |"));
        assert!(body.contains("| **Total** |  | +3 |"));
    }

    #[test]
    fn test_lone_aggregate_row_is_shown() {
        let mut whole = row("live", None, false);
        whole.kind = UnitKind::Aggregate;
        let body = &summary_comments("run --all plan", &[whole])[0];
        assert!(body.contains("| live | ❌ |"));
    }

    #[test]
    fn test_pipe_in_folder_is_escaped() {
        let body = &summary_comments("plan", &[row("a|b", adds(1), true)])[0];
        assert!(body.contains("| a\\|b | ✅ |"));
    }

    #[test]
    fn test_large_summary_is_paged() {
        let results: Vec<_> = (0..2000)
            .map(|i| row(&format!("live/account-{i:04}/region/service"), adds(1), true))
            .collect();
        let bodies = summary_comments("plan", &results);

        assert!(bodies.len() > 1);
        let total = bodies.len();
        for (i, body) in bodies.iter().enumerate() {
            assert!(body.len() <= MAX_COMMENT_SIZE);
            assert!(body.starts_with(&format!("## Terragrunt Summary (Part {}/{total})", i + 1)));
            assert!(body.contains(TABLE_HEADER));
        }
        assert!(bodies[total - 1].ends_with("- Success: 2000/2000\n- No Changes: 0\n"));
        let row_count: usize = bodies
            .iter()
            .map(|b| b.matches("| live/account-").count())
            .sum();
        assert_eq!(row_count, 2000);
    }
}
