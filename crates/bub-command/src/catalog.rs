use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use bub_github::{GithubApiClient, MentionNotification};

use crate::resolver::CommandArgs;

/// Boolean flag available to every command by convention.
pub const DEBUG_FLAG: &str = "debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Declared argument kind. Advisory at parse time; consulted only by the
/// explicit coercion step.
pub enum ArgKind {
    String,
    Number,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Schema for one command argument. A declared default always satisfies
/// `required`.
pub struct ArgSpec {
    pub name: String,
    pub kind: ArgKind,
    pub required: bool,
    pub default: Option<String>,
}

impl ArgSpec {
    pub fn required(name: impl Into<String>, kind: ArgKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ArgKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Collaborators handed to a command handler: the API client, the
/// triggering mention, the subject issue number, and the resolved
/// arguments. No ambient state.
pub struct ExecutionContext {
    pub github: Arc<GithubApiClient>,
    pub mention: MentionNotification,
    pub issue_number: u64,
    pub args: CommandArgs,
}

#[async_trait]
/// A registered command body. Errors are caught at the dispatch boundary
/// and surface to the user only as a reaction swap.
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, ctx: ExecutionContext) -> Result<()>;
}

#[derive(Clone)]
/// Immutable description of one slash command.
pub struct CommandSpec {
    pub name: String,
    pub args: Vec<ArgSpec>,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            handler,
        }
    }

    pub fn with_arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }
}

/// Lookup table from command name to spec. Built once at startup through
/// the builder and read-only afterwards, so concurrent lookups need no
/// synchronization.
pub struct CommandCatalog {
    commands: HashMap<String, CommandSpec>,
}

impl CommandCatalog {
    pub fn builder() -> CommandCatalogBuilder {
        CommandCatalogBuilder {
            commands: HashMap::new(),
        }
    }

    /// Case-sensitive exact-match lookup.
    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Builder enforcing the name-uniqueness contract. Duplicate registration
/// is a startup-time fatal condition, not a runtime request error.
pub struct CommandCatalogBuilder {
    commands: HashMap<String, CommandSpec>,
}

impl std::fmt::Debug for CommandCatalogBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandCatalogBuilder")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CommandCatalogBuilder {
    /// Registers a command, injecting the reserved `debug` flag unless the
    /// command declares its own. Rejects duplicate names, leaving the
    /// earlier registration in place.
    pub fn register(&mut self, spec: CommandSpec) -> Result<&mut Self> {
        if self.commands.contains_key(&spec.name) {
            bail!("command '{}' is already registered", spec.name);
        }
        let spec = ensure_debug_flag(spec);
        self.commands.insert(spec.name.clone(), spec);
        Ok(self)
    }

    pub fn build(self) -> CommandCatalog {
        CommandCatalog {
            commands: self.commands,
        }
    }
}

fn ensure_debug_flag(mut spec: CommandSpec) -> CommandSpec {
    if !spec.args.iter().any(|arg| arg.name == DEBUG_FLAG) {
        spec.args
            .push(ArgSpec::optional(DEBUG_FLAG, ArgKind::Boolean).with_default("false"));
    }
    spec
}
