use std::sync::{Arc, OnceLock};

use anyhow::{bail, Result};
use bub_command::{resolve_args, tokenize, CommandCatalog, ExecutionContext};
use bub_github::{
    trailing_resource_id, CommentReactions, GithubApiClient, MentionNotification, ReactionContent,
    RetryPolicy,
};
use regex::Regex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::MentionRuntimeConfig;
use crate::greeting::post_greeting;

const MENTION_REASON: &str = "mention";

fn mention_login_regex() -> &'static Regex {
    static MENTION_LOGIN: OnceLock<Regex> = OnceLock::new();
    MENTION_LOGIN.get_or_init(|| {
        Regex::new(r"@[a-z0-9-]+")
            .unwrap_or_else(|error| panic!("invalid mention login regex: {error}"))
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Aggregated outcome of one notification poll cycle.
pub struct MentionBatchReport {
    pub mentions_seen: usize,
    pub greetings_posted: usize,
    pub commands_executed: usize,
    pub commands_rejected: usize,
    pub commands_failed: usize,
    pub failures: usize,
}

enum MentionOutcome {
    Greeted,
    CommandExecuted,
    CommandRejected,
    CommandFailed,
}

#[derive(Clone)]
/// Drives the mention command pipeline: fetch mentions, resolve the
/// triggering body, authorize, tokenize, dispatch, and reflect outcome via
/// reactions. One spawned task per mention; tasks never share state beyond
/// the read-only catalog and client.
pub struct MentionPipeline {
    config: Arc<MentionRuntimeConfig>,
    github: Arc<GithubApiClient>,
    catalog: Arc<CommandCatalog>,
}

impl MentionPipeline {
    pub fn new(config: MentionRuntimeConfig, catalog: CommandCatalog) -> Result<Self> {
        let github = GithubApiClient::new(
            &config.api_base,
            &config.token,
            config.request_timeout_ms,
            RetryPolicy::new(config.retry_max_attempts, config.retry_base_delay_ms),
        )?;
        Ok(Self {
            config: Arc::new(config),
            github: Arc::new(github),
            catalog: Arc::new(catalog),
        })
    }

    /// Processes every pending mention notification. Safe to invoke
    /// repeatedly: threads are dequeued as the first step of each mention
    /// task. One mention's failure never aborts its siblings; per-task
    /// errors are logged and tallied in the report.
    pub async fn process_pending_mentions(&self) -> Result<MentionBatchReport> {
        let notifications = self.github.list_notifications().await?;
        if notifications.is_empty() {
            debug!("no notifications found");
            return Ok(MentionBatchReport::default());
        }

        let mentions: Vec<MentionNotification> = notifications
            .into_iter()
            .filter(|notification| notification.reason == MENTION_REASON)
            .collect();
        if mentions.is_empty() {
            debug!("no mention threads among notifications");
            return Ok(MentionBatchReport::default());
        }

        let mut report = MentionBatchReport {
            mentions_seen: mentions.len(),
            ..MentionBatchReport::default()
        };

        let mut handles: Vec<JoinHandle<Result<MentionOutcome>>> =
            Vec::with_capacity(mentions.len());
        for mention in mentions {
            let pipeline = self.clone();
            handles.push(tokio::spawn(
                async move { pipeline.process_mention(mention).await },
            ));
        }

        for handle in handles {
            match handle.await {
                Ok(Ok(MentionOutcome::Greeted)) => report.greetings_posted += 1,
                Ok(Ok(MentionOutcome::CommandExecuted)) => report.commands_executed += 1,
                Ok(Ok(MentionOutcome::CommandRejected)) => report.commands_rejected += 1,
                Ok(Ok(MentionOutcome::CommandFailed)) => report.commands_failed += 1,
                Ok(Err(mention_error)) => {
                    warn!("mention processing failed: {mention_error:#}");
                    report.failures += 1;
                }
                Err(join_error) => {
                    warn!("mention task aborted: {join_error}");
                    report.failures += 1;
                }
            }
        }

        Ok(report)
    }

    async fn process_mention(&self, mention: MentionNotification) -> Result<MentionOutcome> {
        // Dequeue first so the thread is not redelivered next cycle. Best
        // effort: the mention is still processed when this fails.
        if let Err(dequeue_error) = self.github.mark_notification_read(&mention.id).await {
            warn!(
                thread_id = %mention.id,
                "failed to dequeue notification: {dequeue_error:#}"
            );
        }

        let owner = mention.repository.owner.login.clone();
        let repo = mention.repository.name.clone();
        let issue_number = trailing_resource_id(&mention.subject.url);
        let comment_id = trailing_resource_id(&mention.subject.latest_comment_url);

        // Equal URLs mean the mention came from the issue body itself.
        let (raw_body, author) = if mention.subject.url == mention.subject.latest_comment_url {
            let issue = self.github.fetch_issue(&owner, &repo, issue_number).await?;
            (issue.body.unwrap_or_default(), issue.user)
        } else {
            let comment = self
                .github
                .fetch_issue_comment(&owner, &repo, comment_id)
                .await?;
            (comment.body.unwrap_or_default(), comment.user)
        };
        let Some(author) = author else {
            bail!("no author resolved for mention thread {}", mention.id);
        };

        let body = strip_mention_logins(&raw_body);
        debug!(
            thread_id = %mention.id,
            issue_number,
            author = %author.login,
            "resolved mention body: {body}"
        );

        if !self.config.is_allowed_runner(&author.login) {
            debug!(author = %author.login, "author is not allowed to run commands");
            post_greeting(&self.github, &mention, issue_number).await;
            return Ok(MentionOutcome::Greeted);
        }

        let first_line = body.lines().next().unwrap_or_default().trim();
        if !is_command_line(first_line, self.config.command_prefix) {
            post_greeting(&self.github, &mention, issue_number).await;
            return Ok(MentionOutcome::Greeted);
        }

        let mut reactions = CommentReactions::new(owner.as_str(), repo.as_str(), comment_id);
        reactions.acknowledge(&self.github).await;

        let tokens = tokenize(&first_line[self.config.command_prefix.len_utf8()..]);
        let Some(spec) = tokens
            .first()
            .and_then(|name| self.catalog.lookup(name.as_str()))
        else {
            warn!(
                command = tokens.first().map(String::as_str).unwrap_or_default(),
                "command not found"
            );
            reactions
                .resolve(&self.github, ReactionContent::Confused)
                .await;
            return Ok(MentionOutcome::CommandRejected);
        };

        let Some(parsed) = resolve_args(&tokens, &spec.args) else {
            warn!(command = %spec.name, "argument validation failed");
            reactions
                .resolve(&self.github, ReactionContent::Confused)
                .await;
            return Ok(MentionOutcome::CommandRejected);
        };

        let ctx = ExecutionContext {
            github: Arc::clone(&self.github),
            mention,
            issue_number,
            args: parsed.args,
        };
        match spec.handler.execute(ctx).await {
            Ok(()) => {
                info!(command = %spec.name, issue_number, "command executed");
                Ok(MentionOutcome::CommandExecuted)
            }
            Err(handler_error) => {
                error!(command = %spec.name, "command failed: {handler_error:#}");
                reactions
                    .resolve(&self.github, ReactionContent::MinusOne)
                    .await;
                Ok(MentionOutcome::CommandFailed)
            }
        }
    }
}

/// A command attempt is a first line longer than two characters starting
/// with the command prefix.
fn is_command_line(line: &str, prefix: char) -> bool {
    line.len() > 2 && line.starts_with(prefix)
}

fn strip_mention_logins(body: &str) -> String {
    mention_login_regex()
        .replace_all(body, "")
        .trim()
        .to_string()
}
