//! ANSI and line-ending normalization for tool transcripts.
//!
//! Terraform, OpenTofu and Terragrunt all colorize their output. Comments on a
//! pull request must not contain escape codes, but blank lines are kept
//! exactly as printed because the extractor uses them as section boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

/// CSI sequences, OSC sequences (BEL or ST terminated), keypad mode switches,
/// and CSI sequences whose ESC byte was mangled into U+FFFD by a lossy decode.
static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\x1b\[[0-9;?]*[a-zA-Z]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[=>]|\x{FFFD}\[[0-9;?]*[a-zA-Z]",
    )
    .expect("ANSI escape pattern is valid")
});

/// Remove escape sequences and collapse CRLF to LF.
///
/// The result is a fixpoint: normalizing it again returns the same string.
/// Stripping can splice two fragments into a fresh sequence (or `\r\r\n` into
/// `\r\n`), so passes repeat until nothing changes; every pass that changes
/// the text makes it shorter, so this terminates.
pub fn normalize(raw: &str) -> String {
    let mut current = normalize_once(raw);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Remove escape sequences only, leaving line endings untouched.
pub fn strip_ansi(raw: &str) -> String {
    ANSI_ESCAPE.replace_all(raw, "").into_owned()
}

fn normalize_once(text: &str) -> String {
    strip_ansi(text).replace("\r\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_standard_escape_codes() {
        assert_eq!(normalize("\x1b[0mHello\x1b[31m World\x1b[0m"), "Hello World");
        assert_eq!(normalize("\x1b[1;32mSuccess\x1b[0m"), "Success");
        assert_eq!(
            normalize("\x1b[32m+\x1b[0m add\x1b[31m-\x1b[0m destroy"),
            "+ add- destroy"
        );
    }

    #[test]
    fn test_replacement_character_variant() {
        assert_eq!(
            normalize("\u{FFFD}[0mOpenTofu\u{FFFD}[1m will perform\u{FFFD}[0m"),
            "OpenTofu will perform"
        );
    }

    #[test]
    fn test_osc_and_private_modes() {
        assert_eq!(normalize("\x1b]0;title\x07text"), "text");
        assert_eq!(normalize("\x1b]8;;http://x\x1b\\link"), "link");
        assert_eq!(normalize("\x1b[?25lspinner\x1b[?25h"), "spinner");
        assert_eq!(normalize("\x1b=keypad\x1b>"), "keypad");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(normalize(""), "");
        assert_eq!(
            normalize("Plain text without any codes"),
            "Plain text without any codes"
        );
    }

    #[test]
    fn test_preserves_blank_lines_and_indentation() {
        let input = "\u{FFFD}[0m\u{FFFD}[1mPlan:\u{FFFD}[0m 2 to add, 0 to change, 2 to destroy.\r\n\u{FFFD}[0m\r\nChanges to Outputs:\r\n  \u{FFFD}[33m~\u{FFFD}[0m\u{FFFD}[0m bucket_name = \"old-value\" \u{FFFD}[33m->\u{FFFD}[0m\u{FFFD}[0m \"new-value\"";
        let expected = indoc! {r#"
            Plan: 2 to add, 0 to change, 2 to destroy.

            Changes to Outputs:
              ~ bucket_name = "old-value" -> "new-value""#};
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_spliced_sequences_reach_fixpoint() {
        assert_eq!(normalize("\x1b\x1b[0m[0mtext"), "text");
        assert_eq!(normalize("a\r\r\nb"), "a\nb");
    }

    proptest! {
        #[test]
        fn prop_idempotent(input in "(\\PC|\x1b|\r|\n|\u{FFFD}|\\[|[0-9;m])*") {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_line_count_preserved_for_lf_text(lines in prop::collection::vec("[a-zA-Z0-9 #+~-]{1,20}", 1..20)) {
            let colored: Vec<String> = lines.iter().map(|l| format!("\x1b[32m{l}\x1b[0m")).collect();
            let input = colored.join("\n");
            prop_assert_eq!(normalize(&input).lines().count(), input.lines().count());
            prop_assert_eq!(normalize(&input), lines.join("\n"));
        }
    }
}
