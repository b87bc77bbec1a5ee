//! Posting comment bodies to the pull request.
//!
//! Publishing is sequential and never fails the run: every API error is
//! logged and the next body is attempted.

use crate::errors::CommentError;
use crate::io::{Comment, CommentApi};
use crate::report::BOT_COMMENT_HEADERS;
use std::cell::Cell;
use tracing::{debug, info, warn};

/// What happened while publishing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    pub deleted: usize,
    pub posted: usize,
    pub failed: usize,
}

/// Whether `comment` was left by a previous run of this tool.
pub fn is_stale_bot_comment(comment: &Comment) -> bool {
    comment.user_login.contains("[bot]")
        && BOT_COMMENT_HEADERS
            .iter()
            .any(|header| comment.body.contains(header))
}

/// Delete earlier bot comments on the pull request.
///
/// Returns how many were deleted. Individual delete failures are logged and
/// skipped; only a failure to list comments is returned.
pub fn delete_stale_comments(
    api: &dyn CommentApi,
    pull_request: u64,
) -> Result<usize, CommentError> {
    let comments = api.list_comments(pull_request)?;
    let mut deleted = 0;
    for comment in comments.iter().filter(|c| is_stale_bot_comment(c)) {
        match api.delete_comment(comment.id) {
            Ok(()) => {
                debug!(id = comment.id, "Deleted old comment");
                deleted += 1;
            }
            Err(e) => warn!(id = comment.id, error = %e, "Failed to delete comment"),
        }
    }
    Ok(deleted)
}

/// Post `bodies` in order.
pub fn post_comments(api: &dyn CommentApi, pull_request: u64, bodies: &[String]) -> PublishOutcome {
    let mut outcome = PublishOutcome::default();
    for (index, body) in bodies.iter().enumerate() {
        match api.create_comment(pull_request, body) {
            Ok(id) => {
                debug!(id, bytes = body.len(), "Posted comment");
                outcome.posted += 1;
            }
            Err(e) => {
                warn!(index, error = %e, "Failed to post comment");
                outcome.failed += 1;
            }
        }
    }
    outcome
}

/// Clean up (optionally) and post.
pub fn publish(
    api: &dyn CommentApi,
    pull_request: u64,
    bodies: &[String],
    delete_old: bool,
) -> PublishOutcome {
    let deleted = if delete_old {
        delete_stale_comments(api, pull_request).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to delete old comments");
            0
        })
    } else {
        0
    };

    let outcome = PublishOutcome {
        deleted,
        ..post_comments(api, pull_request, bodies)
    };
    info!(
        deleted = outcome.deleted,
        posted = outcome.posted,
        failed = outcome.failed,
        "Published results"
    );
    outcome
}

/// A [`CommentApi`] that prints bodies to stdout instead of posting them.
#[derive(Debug, Default)]
pub struct ConsoleComments {
    next_id: Cell<u64>,
}

impl ConsoleComments {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommentApi for ConsoleComments {
    fn list_comments(&self, _pull_request: u64) -> Result<Vec<Comment>, CommentError> {
        Ok(Vec::new())
    }

    fn delete_comment(&self, _id: u64) -> Result<(), CommentError> {
        Ok(())
    }

    fn create_comment(&self, pull_request: u64, body: &str) -> Result<u64, CommentError> {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        println!("----- comment {id} (pull request #{pull_request}, {} bytes) -----", body.len());
        println!("{body}");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::InMemoryComments;
    use pretty_assertions::assert_eq;

    fn comment(login: &str, body: &str) -> Comment {
        Comment {
            id: 1,
            user_login: login.into(),
            body: body.into(),
        }
    }

    #[test]
    fn test_stale_comment_detection() {
        assert!(is_stale_bot_comment(&comment(
            "github-actions[bot]",
            "## ✅ Success Terragrunt: live/a"
        )));
        assert!(is_stale_bot_comment(&comment("github-actions[bot]", "## Terragrunt Summary")));
        assert!(!is_stale_bot_comment(&comment("alice", "## Terragrunt Summary")));
        assert!(!is_stale_bot_comment(&comment("github-actions[bot]", "Coverage report")));
    }

    #[test]
    fn test_delete_only_bot_comments_and_tolerate_failures() {
        let api = InMemoryComments::new()
            .with_comment(7, "github-actions[bot]", "## ❌ Failed Terragrunt: a")
            .with_comment(7, "alice", "## ❌ Failed Terragrunt: a")
            .with_comment(7, "github-actions[bot]", "## Terragrunt Summary")
            .with_comment(7, "github-actions[bot]", "## ✅ Success Terragrunt: b")
            .failing_delete(3);

        let deleted = delete_stale_comments(&api, 7).unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(api.deleted(), vec![1, 4]);
        assert_eq!(
            api.bodies(7),
            vec!["## ❌ Failed Terragrunt: a", "## Terragrunt Summary"]
        );
    }

    #[test]
    fn test_publish_posts_in_order() {
        let api = InMemoryComments::new().with_comment(7, "github-actions[bot]", "## Terragrunt Summary");
        let bodies = vec!["first".to_string(), "second".to_string()];

        let outcome = publish(&api, 7, &bodies, true);

        assert_eq!(
            outcome,
            PublishOutcome {
                deleted: 1,
                posted: 2,
                failed: 0
            }
        );
        assert_eq!(api.bodies(7), vec!["first", "second"]);
    }

    #[test]
    fn test_post_failures_are_counted_not_fatal() {
        let api = InMemoryComments::new().failing_creates();
        let outcome = post_comments(&api, 7, &["a".to_string(), "b".to_string()]);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.posted, 0);
    }

    #[test]
    fn test_keep_old_comments() {
        let api = InMemoryComments::new().with_comment(7, "github-actions[bot]", "## Terragrunt Summary");
        publish(&api, 7, &[], false);
        assert_eq!(api.bodies(7).len(), 1);
    }
}
