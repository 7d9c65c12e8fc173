use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::{ArgKind, ArgSpec};
use crate::coerce::{coerce_value, ArgValue};

/// Reserved key holding the space-joined residual argument text.
pub const RESIDUAL_KEY: &str = "_";

// Positional token window cap; tokens past it are ignored entirely.
const MAX_ARG_TOKENS: usize = 5;

fn named_arg_regex() -> &'static Regex {
    static NAMED_ARG: OnceLock<Regex> = OnceLock::new();
    NAMED_ARG.get_or_init(|| {
        Regex::new(r"^(?P<name>[A-Za-z0-9_-]+)=(?P<value>.+)$")
            .unwrap_or_else(|error| panic!("invalid named argument regex: {error}"))
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Resolved argument values. Everything is stored as a string; typed reads
/// go through the separate coercion step.
pub struct CommandArgs {
    values: BTreeMap<String, String>,
}

impl CommandArgs {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// The raw, space-joined argument window, including synthesized
    /// defaults. Empty string when there were no argument tokens.
    pub fn residual(&self) -> &str {
        self.get(RESIDUAL_KEY).unwrap_or_default()
    }

    /// Boolean convenience read: true only when the value is present and
    /// coerces to `Boolean(true)`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.get(name).map(|raw| coerce_value(raw, ArgKind::Boolean)),
            Some(Ok(ArgValue::Boolean(true)))
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One parsed command attempt: the command name plus its resolved arguments.
pub struct ParsedCommand {
    pub command: String,
    pub args: CommandArgs,
}

/// Resolves the token sequence produced by the tokenizer against a command's
/// argument schema. `tokens[0]` is the command name. Returns `None` when a
/// required argument is satisfied by neither a user token nor a default —
/// the single validation gate for malformed commands.
///
/// Declared argument kinds are not checked here; values stay strings.
pub fn resolve_args(tokens: &[String], specs: &[ArgSpec]) -> Option<ParsedCommand> {
    let command = tokens.first()?.clone();
    let user_window: Vec<String> = tokens
        .iter()
        .skip(1)
        .take(MAX_ARG_TOKENS)
        .cloned()
        .collect();

    let mut args = CommandArgs::default();
    args.insert(RESIDUAL_KEY, "");

    // Defaults are seeded before anything else: they satisfy the required
    // gate below and lose to user-supplied values in the scan.
    let mut window = user_window.clone();
    for spec in specs {
        if let Some(default) = &spec.default {
            window.push(format!("{}=\"{default}\"", spec.name));
            args.insert(&spec.name, default);
        }
    }

    for spec in specs {
        let prefix = format!("{}=", spec.name);
        if spec.required && !window.iter().any(|token| token.starts_with(&prefix)) {
            return None;
        }
    }

    if !window.is_empty() {
        args.insert(RESIDUAL_KEY, window.join(" "));

        for token in &user_window {
            if let Some(captures) = named_arg_regex().captures(token) {
                let name = &captures["name"];
                let value = strip_quotes(&captures["value"]);
                args.insert(name, value);
            }
        }
    }

    Some(ParsedCommand { command, args })
}

// Strips one layer of surrounding quotes from fully-quoted values; embedded
// escape sequences are left untouched.
fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
