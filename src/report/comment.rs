//! Per-unit comment bodies and size-bounded chunking.

use crate::execution::ExecutionResult;

/// GitHub's per-comment size ceiling in bytes.
pub const MAX_COMMENT_SIZE: usize = 65536;

/// Room reserved for the header when deciding whether a body fits.
pub const HEADER_RESERVE: usize = 500;

/// Extra room for the `<details>` markup around each chunk.
pub const MARKUP_RESERVE: usize = 300;

/// Largest chunk of transcript placed in a single comment.
pub const CHUNK_BUDGET: usize = MAX_COMMENT_SIZE - HEADER_RESERVE - MARKUP_RESERVE;

/// Posted instead of a transcript for units with nothing to do.
pub const NO_CHANGES_BODY: &str = "No Changes";

/// One ordered piece of an oversized body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentChunk {
    /// 1-based
    pub part: usize,
    pub total: usize,
    pub content: String,
}

/// Split `content` into chunks of at most `max_bytes`, breaking after line
/// endings.
///
/// Concatenating the chunks reproduces `content` exactly. A single line
/// longer than `max_bytes` is broken at the last char boundary that fits.
///
/// # Examples
///
/// ```
/// use terragrunt_runner::report::split_content;
///
/// let chunks = split_content("aaa\nbbb\nccc\n", 8);
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[0].content, "aaa\nbbb\n");
/// assert_eq!((chunks[1].part, chunks[1].total), (2, 2));
/// ```
pub fn split_content(content: &str, max_bytes: usize) -> Vec<CommentChunk> {
    let max_bytes = max_bytes.max(4);
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in content.split_inclusive('\n') {
        if !current.is_empty() && current.len() + line.len() > max_bytes {
            pieces.push(std::mem::take(&mut current));
        }
        let mut rest = line;
        while rest.len() > max_bytes {
            let cut = floor_char_boundary(rest, max_bytes);
            pieces.push(rest[..cut].to_string());
            rest = &rest[cut..];
        }
        current.push_str(rest);
    }
    if !current.is_empty() {
        pieces.push(current);
    }

    let total = pieces.len();
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, content)| CommentChunk {
            part: i + 1,
            total,
            content,
        })
        .collect()
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    (1..=index.min(s.len()))
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(s.len())
}

/// Renders the header line block for a result.
#[derive(Debug, Clone, Copy)]
pub struct HeaderStyle<'a> {
    pub command: &'a str,
    pub run_all: bool,
}

impl HeaderStyle<'_> {
    /// `## ✅ Success Terragrunt: label` plus command and change lines.
    ///
    /// `part` adds `(i/total)` to the label.
    pub fn render(&self, result: &ExecutionResult, part: Option<(usize, usize)>) -> String {
        let status = if result.success {
            "✅ Success"
        } else {
            "❌ Failed"
        };
        let label = if self.run_all {
            self.command
        } else {
            result.folder.as_str()
        };
        let label = match part {
            Some((i, total)) => format!("{label} ({i}/{total})"),
            None => label.to_string(),
        };

        let mut header = format!("## {status} Terragrunt: {label}\n");
        if self.run_all {
            header.push_str(&format!("**Folder:** {}\n", result.folder));
        }
        header.push_str(&format!("**Command:** {}\n", self.command));
        if let Some(changes) = result.changes.filter(|c| !c.no_changes) {
            let summary = changes.one_liner();
            if !summary.is_empty() {
                header.push_str(&format!("**Changes:** {summary}\n"));
            }
        }
        header
    }
}

/// Text shown inside the collapsible section.
///
/// Failed units show the error first, then whatever output was captured.
pub fn body_content(result: &ExecutionResult) -> String {
    match (&result.error, result.success) {
        (Some(error), false) if result.output.is_empty() => error.to_string(),
        (Some(error), false) => format!("{error}\n\n{}", result.output),
        _ => result.output.clone(),
    }
}

fn details(header: &str, title: &str, content: &str) -> String {
    let content = content.strip_suffix('\n').unwrap_or(content);
    format!("{header}\n\n<details><summary><b>{title}</b></summary>\n\n```hcl\n{content}\n```\n</details>")
}

/// All comment bodies for one result, in posting order.
pub fn render_comments(style: &HeaderStyle<'_>, result: &ExecutionResult) -> Vec<String> {
    if result.success && result.has_no_changes() {
        return vec![format!("{}\n{NO_CHANGES_BODY}", style.render(result, None))];
    }

    let title = if result.success {
        "View Output"
    } else {
        "View Error Details"
    };
    let content = body_content(result);
    let header = style.render(result, None);

    if header.len() + content.len() <= MAX_COMMENT_SIZE - HEADER_RESERVE {
        return vec![details(&header, title, &content)];
    }

    split_content(&content, chunk_budget(style, result, title, content.len()))
        .into_iter()
        .map(|chunk| {
            let header = style.render(result, Some((chunk.part, chunk.total)));
            let title = format!("{title} (Part {}/{})", chunk.part, chunk.total);
            details(&header, &title, &chunk.content)
        })
        .collect()
}

/// Bytes left for transcript once the widest chunk header and markup are in.
///
/// Part numbers are sized for `content_len` parts, an upper bound on the
/// real count.
fn chunk_budget(
    style: &HeaderStyle<'_>,
    result: &ExecutionResult,
    title: &str,
    content_len: usize,
) -> usize {
    let widest = content_len.max(1);
    let header = style.render(result, Some((widest, widest)));
    let title = format!("{title} (Part {widest}/{widest})");
    let overhead = details(&header, &title, "").len();
    MAX_COMMENT_SIZE.saturating_sub(overhead).min(CHUNK_BUDGET)
}
