//! Local configuration: application paths, `config.toml`, profile files.

pub mod accounts;
pub mod config;
pub mod paths;

pub use accounts::load_accounts;
pub use config::{Config, ConfigSource, ResolvedConfig};
pub use paths::{AppPaths, ProfilePaths};
