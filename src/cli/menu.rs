//! Interactive report selection.

use dialoguer::{Confirm, Input, Select};

use crate::core::models::ViewMode;
use crate::error::{FeedstatError, Result};
use crate::util::env::stdin_is_tty;
use crate::util::time::default_report_file;

/// Ask which report to produce.
///
/// # Errors
///
/// `Prompt` when stdin is not a terminal or the terminal cannot be driven.
pub fn prompt_view() -> Result<ViewMode> {
    if !stdin_is_tty() {
        return Err(FeedstatError::Prompt(dialoguer::Error::IO(std::io::Error::other(
            "stdin is not a terminal",
        ))));
    }
    let labels: Vec<&str> = ViewMode::ALL.iter().map(|v| v.label()).collect();
    let index = Select::new()
        .with_prompt("Choose a feed report")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(ViewMode::ALL[index])
}

/// Ask for the CSV name of a save-file report.
///
/// # Errors
///
/// `Prompt` when the terminal cannot be driven.
pub fn prompt_file_name(timestamp: &str) -> Result<String> {
    let name: String = Input::new()
        .with_prompt(format!(
            "File name (leave empty for {})",
            default_report_file(timestamp)
        ))
        .allow_empty(true)
        .interact_text()?;

    if name.trim().is_empty() {
        return Ok(default_report_file(timestamp));
    }

    let append = Confirm::new()
        .with_prompt("Append the date and time to the file name?")
        .default(true)
        .interact()?;
    Ok(report_file_name(&name, append.then_some(timestamp)))
}

/// Normalize a user-supplied report name: optional timestamp suffix and a
/// `.csv` extension.
#[must_use]
pub fn report_file_name(name: &str, timestamp: Option<&str>) -> String {
    let name = name.trim();
    let stem = name
        .strip_suffix(".csv")
        .or_else(|| name.strip_suffix(".CSV"))
        .unwrap_or(name);
    match timestamp {
        Some(ts) => format!("{stem}-{ts}.csv"),
        None => format!("{stem}.csv"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_csv_extension_once() {
        assert_eq!(report_file_name("weekly", None), "weekly.csv");
        assert_eq!(report_file_name("weekly.csv", None), "weekly.csv");
        assert_eq!(report_file_name("  weekly ", None), "weekly.csv");
    }

    #[test]
    fn timestamp_goes_before_extension() {
        assert_eq!(
            report_file_name("weekly.csv", Some("2024-03-01_09-05-00")),
            "weekly-2024-03-01_09-05-00.csv"
        );
    }
}
