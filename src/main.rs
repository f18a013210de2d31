//! feedstat - merchant feed status reporter
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use feedstat::cli::Cli;
use feedstat::cli::report::{execute, until_interrupted};
use feedstat::core::logging::{self, LogSettings};
use feedstat::error::FeedstatError;
use feedstat::render::render_error;
use feedstat::storage::ResolvedConfig;
use feedstat::util::env::should_use_color;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(&LogSettings::resolve(
        cli.log_level.as_deref(),
        cli.json_logs,
        cli.log_file.as_deref(),
        cli.verbose,
    ));

    let config = ResolvedConfig::resolve(&cli);
    let color = should_use_color(ResolvedConfig::color_enabled(&cli, config.as_ref().ok()));

    let result = match config {
        Ok(config) => until_interrupted(execute(&cli, config), tokio::signal::ctrl_c()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), operation = ?e.operation(), "{e:?}");
            eprintln!("{}", render_error(&e, color));
            if matches!(e, FeedstatError::Interrupted) {
                // A menu prompt may still hold stdin; leaving main would wait for it.
                std::process::exit(i32::from(e.exit_code()));
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
