//! Built-in slash commands shipped with the bot.

mod release;
mod test_args;

use anyhow::Result;
use bub_command::CommandCatalog;

/// Builds the catalog of built-in commands. A duplicate name here is a
/// programming error and aborts startup.
pub fn builtin_catalog() -> Result<CommandCatalog> {
    let mut builder = CommandCatalog::builder();
    builder.register(release::release_command())?;
    builder.register(test_args::test_args_command())?;
    Ok(builder.build())
}

/// Collapsible markdown report appended to command replies when the `debug`
/// flag is set.
pub(crate) struct DebugReport {
    body: String,
}

impl DebugReport {
    pub(crate) fn new() -> Self {
        Self {
            body: String::from("\n\n\n<details><summary>Debug</summary>"),
        }
    }

    pub(crate) fn add_section(&mut self, title: &str, content: &str, lang: &str) {
        self.body
            .push_str(&format!("\n\n### {title}\n\n```{lang}\n{content}\n```"));
    }

    pub(crate) fn build(mut self) -> String {
        self.body.push_str("\n\n</details>");
        self.body
    }
}
