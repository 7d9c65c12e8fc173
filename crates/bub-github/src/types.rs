use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Author of an issue or comment.
pub struct GithubUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Repository a notification points at.
pub struct NotificationRepository {
    pub name: String,
    pub owner: GithubUser,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Subject of a notification thread. When `url` equals `latest_comment_url`
/// the triggering body is the issue body itself rather than a comment.
pub struct NotificationSubject {
    pub url: String,
    pub latest_comment_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// One notification thread from `GET /notifications`. Thread ids are strings
/// on the wire and stay strings here. Read-only once fetched.
pub struct MentionNotification {
    pub id: String,
    pub reason: String,
    pub subject: NotificationSubject,
    pub repository: NotificationRepository,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Issue payload, reduced to the fields the mention pipeline consumes.
pub struct GithubIssue {
    pub number: u64,
    pub body: Option<String>,
    pub user: Option<GithubUser>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Issue comment payload, reduced to the fields the mention pipeline consumes.
pub struct GithubIssueComment {
    pub id: u64,
    pub body: Option<String>,
    pub user: Option<GithubUser>,
}

#[derive(Debug, Clone, Deserialize)]
/// Response to creating an issue comment.
pub struct CreatedComment {
    pub id: u64,
    pub html_url: Option<String>,
}

/// Extracts the numeric id from the last path segment of an API resource URL.
/// Returns 0 when the segment is missing or not numeric, mirroring how the
/// pipeline treats malformed subject URLs as a harmless sentinel target.
pub fn trailing_resource_id(url: &str) -> u64 {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u64>().ok())
        .unwrap_or(0)
}
