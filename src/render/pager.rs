//! Paged output for long reports.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::Result;
use crate::util::env::stdout_is_tty;

const DEFAULT_PAGER: &str = "less";

/// The pager command line: `$PAGER`, or `less`.
#[must_use]
pub fn pager_command() -> String {
    std::env::var("PAGER")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PAGER.to_string())
}

/// Show `text` through the pager, or print it when stdout is not a
/// terminal or the pager cannot be started.
///
/// # Errors
///
/// I/O failures writing to stdout.
pub fn page(text: &str) -> Result<()> {
    if stdout_is_tty() && spawn_pager(&pager_command(), text) {
        return Ok(());
    }
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

fn spawn_pager(command: &str, text: &str) -> bool {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return false;
    };

    let mut child = match Command::new(program)
        .args(parts)
        .env("LESS", std::env::var("LESS").unwrap_or_else(|_| "FRX".to_string()))
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            tracing::debug!(pager = program, error = %e, "Pager unavailable");
            return false;
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        // The user may quit the pager before reading everything.
        let _ = stdin.write_all(text.as_bytes());
    }
    if let Err(e) = child.wait() {
        tracing::debug!(pager = program, error = %e, "Pager did not exit cleanly");
    }
    true
}
