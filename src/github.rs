//! Minimal GitHub REST client for issue comments.

use crate::config::PullRequestTarget;
use crate::errors::CommentError;
use crate::io::{Comment, CommentApi};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PER_PAGE: u32 = 100;

static NEXT_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<([^>]+)>;\s*rel="next""#).expect("link pattern is valid"));

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<ApiUser>,
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedComment {
    id: u64,
}

/// Issue-comment client bound to one repository.
pub struct GitHubClient {
    http: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    /// Client for `target` against `api_url`, e.g. [`DEFAULT_API_URL`] or a
    /// GitHub Enterprise `/api/v3` endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be initialized.
    pub fn new(target: &PullRequestTarget, api_url: &str) -> Result<Self, CommentError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("terragrunt-runner/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: target.owner.clone(),
            repo: target.repo.clone(),
            token: target.token.clone(),
        })
    }

    fn repo_url(&self) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.owner, self.repo)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .bearer_auth(&self.token)
    }
}

fn check_status(response: Response, action: &'static str) -> Result<Response, CommentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .unwrap_or_else(|_| "unable to read response body".to_string());
    Err(CommentError::Status {
        action,
        status: status.as_u16(),
        body,
    })
}

/// URL of the next page from a `Link` header, if any.
fn next_page(response: &Response) -> Option<String> {
    let link = response.headers().get(reqwest::header::LINK)?.to_str().ok()?;
    NEXT_LINK
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

impl CommentApi for GitHubClient {
    fn list_comments(&self, pull_request: u64) -> Result<Vec<Comment>, CommentError> {
        let mut url = format!(
            "{}/issues/{pull_request}/comments?per_page={PER_PAGE}",
            self.repo_url()
        );
        let mut comments = Vec::new();

        loop {
            let response = self.authorized(self.http.get(&url)).send()?;
            let response = check_status(response, "list comments")?;
            let next = next_page(&response);
            let page: Vec<ApiComment> = response.json()?;
            debug!(count = page.len(), "Fetched comment page");

            comments.extend(page.into_iter().map(|c| Comment {
                id: c.id,
                user_login: c.user.map(|u| u.login).unwrap_or_default(),
                body: c.body.unwrap_or_default(),
            }));

            match next {
                Some(next) => url = next,
                None => break,
            }
        }
        Ok(comments)
    }

    fn delete_comment(&self, id: u64) -> Result<(), CommentError> {
        let url = format!("{}/issues/comments/{id}", self.repo_url());
        let response = self.authorized(self.http.delete(url)).send()?;
        check_status(response, "delete comment")?;
        Ok(())
    }

    fn create_comment(&self, pull_request: u64, body: &str) -> Result<u64, CommentError> {
        let url = format!("{}/issues/{pull_request}/comments", self.repo_url());
        let response = self
            .authorized(self.http.post(url))
            .json(&NewComment { body })
            .send()?;
        let created: CreatedComment = check_status(response, "create comment")?.json()?;
        Ok(created.id)
    }
}
