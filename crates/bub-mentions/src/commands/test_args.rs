use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bub_command::{ArgKind, ArgSpec, CommandHandler, CommandSpec, ExecutionContext};
use tracing::info;

/// Argument-parsing smoke command: logs whatever the resolver produced.
pub(crate) fn test_args_command() -> CommandSpec {
    CommandSpec::new("test", Arc::new(TestArgsHandler))
        .with_arg(ArgSpec::required("arg1", ArgKind::String))
        .with_arg(ArgSpec::optional("arg2", ArgKind::Number).with_default("42"))
        .with_arg(ArgSpec::required("arg3", ArgKind::Boolean).with_default("true"))
}

struct TestArgsHandler;

#[async_trait]
impl CommandHandler for TestArgsHandler {
    async fn execute(&self, ctx: ExecutionContext) -> Result<()> {
        for (name, value) in ctx.args.iter() {
            info!(issue_number = ctx.issue_number, "test command arg {name}={value}");
        }
        Ok(())
    }
}
