//! feedstat - merchant feed status reporter
//!
//! Resolves Google credentials, lists every configured merchant's product
//! feeds and their processing status through the Content API for Shopping,
//! and reports them as a table, a paged listing, or a CSV file.

// Note: deny (not forbid) to allow #[allow(unsafe_code)] in test helpers for env var manipulation
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod cli;
pub mod core;
pub mod error;
pub mod render;
pub mod storage;
pub mod util;

/// Test utilities module - included in test builds or when test-utils feature is enabled.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{ExitCode, FeedstatError, Result};
