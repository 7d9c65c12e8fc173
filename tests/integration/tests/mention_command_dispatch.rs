//! End-to-end mention pipeline flows against a mocked GitHub API:
//! handler dispatch with resolved arguments and reaction feedback on
//! handler failure.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use bub_command::{
    ArgKind, ArgSpec, CommandCatalog, CommandHandler, CommandSpec, ExecutionContext,
};
use bub_mentions::{MentionPipeline, MentionRuntimeConfig};
use httpmock::prelude::*;
use serde_json::json;

#[derive(Debug, Clone, Default)]
struct CapturedCall {
    issue_number: u64,
    args: Vec<(String, String)>,
}

#[derive(Clone, Default)]
struct RecordingHandler {
    calls: Arc<Mutex<Vec<CapturedCall>>>,
}

#[async_trait]
impl CommandHandler for RecordingHandler {
    async fn execute(&self, ctx: ExecutionContext) -> Result<()> {
        let call = CapturedCall {
            issue_number: ctx.issue_number,
            args: ctx
                .args
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        };
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
        Ok(())
    }
}

struct FailingHandler;

#[async_trait]
impl CommandHandler for FailingHandler {
    async fn execute(&self, _ctx: ExecutionContext) -> Result<()> {
        bail!("release pipeline exploded");
    }
}

fn test_config(base_url: &str) -> MentionRuntimeConfig {
    MentionRuntimeConfig {
        api_base: base_url.to_string(),
        token: "test-token".to_string(),
        allowed_runners: vec!["luxass".to_string()],
        command_prefix: '/',
        request_timeout_ms: 2_000,
        retry_max_attempts: 1,
        retry_base_delay_ms: 1,
    }
}

fn release_catalog(handler: Arc<dyn CommandHandler>) -> CommandCatalog {
    let mut builder = CommandCatalog::builder();
    builder
        .register(
            CommandSpec::new("release", handler)
                .with_arg(ArgSpec::optional("type", ArgKind::String))
                .with_arg(ArgSpec::optional("version", ArgKind::String)),
        )
        .expect("register release");
    builder.build()
}

fn mock_mention(server: &MockServer, thread_id: &str, issue: u64, comment: u64, body: &str) {
    let body = body.to_string();
    let comment_path = format!("/repos/o/r/issues/comments/{comment}");
    server.mock(|when, then| {
        when.method(GET).path("/notifications");
        then.status(200).json_body(json!([{
            "id": thread_id,
            "reason": "mention",
            "subject": {
                "url": format!("https://api.github.com/repos/o/r/issues/{issue}"),
                "latest_comment_url":
                    format!("https://api.github.com/repos/o/r/issues/comments/{comment}")
            },
            "repository": { "name": "r", "owner": { "login": "o" } }
        }]));
    });
    let thread_path = format!("/notifications/threads/{thread_id}");
    server.mock(|when, then| {
        when.method(PATCH).path(thread_path.clone());
        then.status(205);
    });
    server.mock(|when, then| {
        when.method(PUT).path(format!("{thread_path}/subscription"));
        then.status(200).json_body(json!({ "ignored": true }));
    });
    server.mock(move |when, then| {
        when.method(GET).path(comment_path.clone());
        then.status(200).json_body(json!({
            "id": comment,
            "body": body,
            "user": { "login": "luxass" }
        }));
    });
}

#[tokio::test]
async fn integration_release_command_reaches_handler_with_resolved_args() {
    let server = MockServer::start();
    mock_mention(&server, "200", 12, 90, "@robobub /release type=minor");
    let acknowledge = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/o/r/issues/comments/90/reactions")
            .json_body(json!({ "content": "+1" }));
        then.status(201).json_body(json!({ "id": 61 }));
    });
    let removes = server.mock(|when, then| {
        when.method(DELETE)
            .path("/repos/o/r/issues/comments/90/reactions/61");
        then.status(204);
    });

    let handler = Arc::new(RecordingHandler::default());
    let pipeline = MentionPipeline::new(
        test_config(&server.base_url()),
        release_catalog(handler.clone()),
    )
    .expect("pipeline");
    let report = pipeline.process_pending_mentions().await.expect("report");

    assert_eq!(report.mentions_seen, 1);
    assert_eq!(report.commands_executed, 1);
    assert_eq!(report.commands_failed, 0);

    let calls = handler
        .calls
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].issue_number, 12);
    let args = &calls[0].args;
    let get = |name: &str| {
        args.iter()
            .find(|(arg_name, _)| arg_name == name)
            .map(|(_, value)| value.as_str())
    };
    assert_eq!(get("type"), Some("minor"));
    assert_eq!(get("debug"), Some("false"));
    assert_eq!(get("_"), Some("type=minor debug=\"false\""));
    assert_eq!(get("version"), None);

    // Success leaves the pending acknowledgement in place: no swap happens.
    acknowledge.assert_calls(1);
    removes.assert_calls(0);
}

#[tokio::test]
async fn integration_handler_failure_swaps_acknowledgement_for_minus_one() {
    let server = MockServer::start();
    mock_mention(&server, "210", 13, 91, "@robobub /release type=major");
    let acknowledge = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/o/r/issues/comments/91/reactions")
            .json_body(json!({ "content": "+1" }));
        then.status(201).json_body(json!({ "id": 71 }));
    });
    let remove = server.mock(|when, then| {
        when.method(DELETE)
            .path("/repos/o/r/issues/comments/91/reactions/71");
        then.status(204);
    });
    let minus_one = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/o/r/issues/comments/91/reactions")
            .json_body(json!({ "content": "-1" }));
        then.status(201).json_body(json!({ "id": 72 }));
    });

    let pipeline = MentionPipeline::new(
        test_config(&server.base_url()),
        release_catalog(Arc::new(FailingHandler)),
    )
    .expect("pipeline");
    let report = pipeline.process_pending_mentions().await.expect("report");

    assert_eq!(report.commands_failed, 1);
    assert_eq!(report.commands_executed, 0);
    assert_eq!(report.failures, 0);
    acknowledge.assert_calls(1);
    remove.assert_calls(1);
    minus_one.assert_calls(1);
}

#[tokio::test]
async fn integration_required_argument_missing_swaps_for_confused() {
    let server = MockServer::start();
    mock_mention(&server, "220", 14, 92, "@robobub /deploy");
    let acknowledge = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/o/r/issues/comments/92/reactions")
            .json_body(json!({ "content": "+1" }));
        then.status(201).json_body(json!({ "id": 81 }));
    });
    let remove = server.mock(|when, then| {
        when.method(DELETE)
            .path("/repos/o/r/issues/comments/92/reactions/81");
        then.status(204);
    });
    let confused = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/o/r/issues/comments/92/reactions")
            .json_body(json!({ "content": "confused" }));
        then.status(201).json_body(json!({ "id": 82 }));
    });

    let handler = Arc::new(RecordingHandler::default());
    let mut builder = CommandCatalog::builder();
    builder
        .register(
            CommandSpec::new("deploy", handler.clone())
                .with_arg(ArgSpec::required("environment", ArgKind::String)),
        )
        .expect("register deploy");
    let pipeline = MentionPipeline::new(test_config(&server.base_url()), builder.build())
        .expect("pipeline");
    let report = pipeline.process_pending_mentions().await.expect("report");

    assert_eq!(report.commands_rejected, 1);
    assert!(handler
        .calls
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .is_empty());
    acknowledge.assert_calls(1);
    remove.assert_calls(1);
    confused.assert_calls(1);
}
