//! Mention pipeline for robobub: polls notification threads, authorizes the
//! triggering author, and dispatches slash commands with reaction feedback.

pub mod commands;
pub mod config;
pub mod greeting;
pub mod pipeline;

pub use commands::builtin_catalog;
pub use config::MentionRuntimeConfig;
pub use pipeline::{MentionBatchReport, MentionPipeline};
