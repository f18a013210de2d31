//! Environment detection utilities.

use std::io::IsTerminal;

/// Check if stdout is a TTY.
#[must_use]
pub fn stdout_is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Check if stderr is a TTY.
#[must_use]
pub fn stderr_is_tty() -> bool {
    std::io::stderr().is_terminal()
}

/// Check if stdin is a TTY.
#[must_use]
pub fn stdin_is_tty() -> bool {
    std::io::stdin().is_terminal()
}

/// Whether to colour stderr output.
///
/// `enabled` already folds in `--no-color`, `NO_COLOR` and the config file.
#[must_use]
pub fn should_use_color(enabled: bool) -> bool {
    if !enabled {
        return false;
    }

    if std::env::var("TERM").is_ok_and(|t| t == "dumb") {
        return false;
    }

    stderr_is_tty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_color_stays_off() {
        assert!(!should_use_color(false));
    }
}
