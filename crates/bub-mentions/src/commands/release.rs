use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bub_command::{ArgKind, ArgSpec, CommandHandler, CommandSpec, ExecutionContext};
use serde_json::json;
use tracing::info;

use super::DebugReport;

pub(crate) fn release_command() -> CommandSpec {
    CommandSpec::new("release", Arc::new(ReleaseHandler))
        .with_arg(ArgSpec::optional("type", ArgKind::String))
        .with_arg(ArgSpec::optional("version", ArgKind::String))
}

struct ReleaseHandler;

#[async_trait]
impl CommandHandler for ReleaseHandler {
    async fn execute(&self, ctx: ExecutionContext) -> Result<()> {
        let bump = normalize_bump(ctx.args.get("type"));
        let version = ctx.args.get("version");

        let mut comment = format!("I'm going to prepare a {bump} release for this. 🚀\n\n");
        match version {
            Some(version) => comment.push_str(&format!(
                "A version override was requested: `{version}`.\n"
            )),
            None => comment.push_str(
                "The next version number will be derived from the latest published release.\n",
            ),
        }

        if ctx.args.flag("debug") {
            let mut report = DebugReport::new();
            let args = ctx
                .args
                .iter()
                .map(|(name, value)| (name.to_string(), json!(value)))
                .collect::<serde_json::Map<_, _>>();
            report.add_section(
                "release",
                &serde_json::to_string_pretty(&json!({ "type": bump, "version": version }))
                    .unwrap_or_default(),
                "json",
            );
            report.add_section(
                "args",
                &serde_json::to_string_pretty(&args).unwrap_or_default(),
                "json",
            );
            comment.push_str(&report.build());
        }

        ctx.github
            .create_issue_comment(
                &ctx.mention.repository.owner.login,
                &ctx.mention.repository.name,
                ctx.issue_number,
                &comment,
            )
            .await
            .with_context(|| {
                format!(
                    "failed to announce release on issue {}",
                    ctx.issue_number
                )
            })?;
        info!(issue_number = ctx.issue_number, bump, "release announced");
        Ok(())
    }
}

// Unknown bump types fall back to patch instead of failing the command.
fn normalize_bump(raw: Option<&str>) -> &'static str {
    match raw {
        Some("minor") => "minor",
        Some("major") => "major",
        _ => "patch",
    }
}
