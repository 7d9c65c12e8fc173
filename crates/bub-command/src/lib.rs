//! Slash command layer for the robobub mention bot: tokenizer, argument
//! resolver, typed coercion, and the immutable command catalog.

pub mod catalog;
pub mod coerce;
pub mod resolver;
pub mod tokenizer;

pub use catalog::{
    ArgKind, ArgSpec, CommandCatalog, CommandCatalogBuilder, CommandHandler, CommandSpec,
    ExecutionContext,
};
pub use coerce::{coerce_value, ArgValue};
pub use resolver::{resolve_args, CommandArgs, ParsedCommand, RESIDUAL_KEY};
pub use tokenizer::tokenize;
