use std::time::{SystemTime, UNIX_EPOCH};

use bub_github::{GithubApiClient, MentionNotification};
use tracing::error;

const GREETINGS: &[&str] = &[
    "Hello! 👋🏼",
    "Hi! 👋🏼",
    "Hey! 👋🏼",
    "Howdy! 👋🏼",
    "Yo! 👋🏼",
    "Hi there! 👋🏼",
];

fn current_unix_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

pub(crate) fn pick_greeting() -> &'static str {
    GREETINGS[current_unix_timestamp_ms() as usize % GREETINGS.len()]
}

/// Posts a greeting comment on the subject issue. Best-effort: failures are
/// logged and never propagate into the mention task.
pub(crate) async fn post_greeting(
    github: &GithubApiClient,
    mention: &MentionNotification,
    issue_number: u64,
) {
    if let Err(error) = github
        .create_issue_comment(
            &mention.repository.owner.login,
            &mention.repository.name,
            issue_number,
            pick_greeting(),
        )
        .await
    {
        error!(issue_number, "failed to post greeting: {error:#}");
    }
}
