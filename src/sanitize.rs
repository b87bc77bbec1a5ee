//! Validation of the free-form extra-arguments string.
//!
//! The string is split on whitespace and every token is checked against a
//! denylist of shell metacharacters. Tokens are never quoted, escaped or
//! rewritten: the input is either accepted as-is or rejected as a whole.

use crate::errors::SanitizeError;

/// Substrings that must not appear anywhere in an argument token.
pub const FORBIDDEN_PATTERNS: &[&str] = &[";", "&", "|", ">", "<", "`", "$(", "${"];

/// Split `args` on whitespace and reject it if any token contains a forbidden
/// pattern.
///
/// Returns the tokens in input order on success. The error names the first
/// offending token and the pattern it matched.
///
/// # Examples
///
/// ```
/// use terragrunt_runner::sanitize::sanitize_args;
///
/// let args = sanitize_args("--non-interactive -lock=false").unwrap();
/// assert_eq!(args, vec!["--non-interactive", "-lock=false"]);
/// assert!(sanitize_args("--non-interactive ; rm -rf /").is_err());
/// ```
pub fn sanitize_args(args: &str) -> Result<Vec<String>, SanitizeError> {
    args.split_whitespace()
        .map(|token| match forbidden_pattern_in(token) {
            Some(pattern) => Err(SanitizeError::ForbiddenPattern {
                token: token.to_string(),
                pattern,
            }),
            None => Ok(token.to_string()),
        })
        .collect()
}

fn forbidden_pattern_in(token: &str) -> Option<&'static str> {
    FORBIDDEN_PATTERNS
        .iter()
        .copied()
        .find(|pattern| token.contains(pattern))
}
