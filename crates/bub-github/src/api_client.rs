use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::reaction::ReactionContent;
use crate::transport::{
    is_retryable_status, is_retryable_transport_error, parse_retry_after, truncate_for_error,
    RetryPolicy,
};
use crate::types::{CreatedComment, GithubIssue, GithubIssueComment, MentionNotification};

const NOTIFICATIONS_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Deserialize)]
struct ReactionCreated {
    id: u64,
}

#[derive(Clone)]
/// Thin GitHub REST client: default headers, bearer auth, and a bounded
/// retry loop around every request.
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
    retry: RetryPolicy,
}

impl GithubApiClient {
    pub fn new(
        api_base: &str,
        token: &str,
        request_timeout_ms: u64,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("robobub-mention-bot"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            retry,
        })
    }

    /// Lists the account's notification threads. The caller filters for
    /// `reason == "mention"`.
    pub async fn list_notifications(&self) -> Result<Vec<MentionNotification>> {
        let per_page = NOTIFICATIONS_PAGE_SIZE.to_string();
        self.request_json("list notifications", || {
            self.http
                .get(format!("{}/notifications", self.api_base))
                .query(&[("per_page", per_page.as_str())])
        })
        .await
    }

    /// Marks a notification thread as read and mutes its subscription so the
    /// same mention is not redelivered next cycle.
    pub async fn mark_notification_read(&self, thread_id: &str) -> Result<()> {
        self.request_unit("mark notification read", || {
            self.http
                .patch(format!("{}/notifications/threads/{thread_id}", self.api_base))
        })
        .await?;
        self.request_unit("ignore notification thread", || {
            self.http
                .put(format!(
                    "{}/notifications/threads/{thread_id}/subscription",
                    self.api_base
                ))
                .json(&json!({ "ignored": true }))
        })
        .await
    }

    pub async fn fetch_issue(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> Result<GithubIssue> {
        self.request_json("fetch issue", || {
            self.http.get(format!(
                "{}/repos/{owner}/{repo}/issues/{issue_number}",
                self.api_base
            ))
        })
        .await
    }

    pub async fn fetch_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
    ) -> Result<GithubIssueComment> {
        self.request_json("fetch issue comment", || {
            self.http.get(format!(
                "{}/repos/{owner}/{repo}/issues/comments/{comment_id}",
                self.api_base
            ))
        })
        .await
    }

    pub async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<CreatedComment> {
        let payload = json!({ "body": body });
        self.request_json("create issue comment", || {
            self.http
                .post(format!(
                    "{}/repos/{owner}/{repo}/issues/{issue_number}/comments",
                    self.api_base
                ))
                .json(&payload)
        })
        .await
    }

    /// Adds an emoji reaction to an issue comment and returns its id.
    pub async fn add_reaction(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
        content: ReactionContent,
    ) -> Result<u64> {
        let payload = json!({ "content": content.as_str() });
        let created: ReactionCreated = self
            .request_json("add reaction", || {
                self.http
                    .post(format!(
                        "{}/repos/{owner}/{repo}/issues/comments/{comment_id}/reactions",
                        self.api_base
                    ))
                    .json(&payload)
            })
            .await?;
        Ok(created.id)
    }

    pub async fn remove_reaction(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
        reaction_id: u64,
    ) -> Result<()> {
        self.request_unit("remove reaction", || {
            self.http.delete(format!(
                "{}/repos/{owner}/{repo}/issues/comments/{comment_id}/reactions/{reaction_id}",
                self.api_base
            ))
        })
        .await
    }

    async fn request_json<T, F>(&self, operation: &str, mut request_builder: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let response = self.send_with_retry(operation, &mut request_builder).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode github {operation} response"))
    }

    async fn request_unit<F>(&self, operation: &str, mut request_builder: F) -> Result<()>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        self.send_with_retry(operation, &mut request_builder)
            .await
            .map(|_| ())
    }

    async fn send_with_retry<F>(
        &self,
        operation: &str,
        request_builder: &mut F,
    ) -> Result<reqwest::Response>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            match request_builder().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let retry_after = parse_retry_after(response.headers());
                    let body = response.text().await.unwrap_or_default();
                    if self.retry.allows_retry(attempt) && is_retryable_status(status.as_u16()) {
                        tokio::time::sleep(self.retry.delay_for(attempt, retry_after)).await;
                        continue;
                    }

                    bail!(
                        "github api {operation} failed with status {}: {}",
                        status.as_u16(),
                        truncate_for_error(&body, 800)
                    );
                }
                Err(error) => {
                    if self.retry.allows_retry(attempt) && is_retryable_transport_error(&error) {
                        tokio::time::sleep(self.retry.delay_for(attempt, None)).await;
                        continue;
                    }
                    return Err(error)
                        .with_context(|| format!("github api {operation} request failed"));
                }
            }
        }
    }
}
