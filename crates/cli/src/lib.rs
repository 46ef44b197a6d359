//! Demo CLI for driving a consistent-hashing key-value store.
//!
//! Not part of the core's contract: its input grammar and output formatting
//! are a convenience for exercising `corelib` end to end, not a normative
//! interface.

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
