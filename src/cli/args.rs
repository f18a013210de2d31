//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Merchant feed status reporter - check product-feed health across accounts.
#[derive(Parser, Debug, Clone)]
#[command(name = "feedstat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // === Report selection ===
    /// Run without prompts and produce this view (list-errors, save-file, display-all)
    #[arg(long, value_name = "VIEW")]
    pub auto: Option<String>,

    /// CSV file name for the save-file view
    #[arg(long, value_name = "NAME")]
    pub file_name: Option<String>,

    // === Configuration ===
    /// Samples root holding the `content` profile directory
    #[arg(long, value_name = "DIR", conflicts_with = "noconfig")]
    pub config_path: Option<PathBuf>,

    /// Use no profile directory (Application Default Credentials only)
    #[arg(long)]
    pub noconfig: bool,

    /// Timeout for each remote call in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Emit JSON logs
    #[arg(long)]
    pub json_logs: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long)]
    pub verbose: bool,
}
