//! Utility functions.

pub mod env;
pub mod time;

pub use time::{default_report_file, format_elapsed, report_timestamp};
