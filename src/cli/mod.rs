//! CLI argument parsing, interactive prompts and the report command.

pub mod args;
pub mod menu;
pub mod report;

pub use args::Cli;
