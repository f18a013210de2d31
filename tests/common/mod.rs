//! Shared helpers for integration tests.
//!
//! - `google`: wiremock stand-ins for the token endpoint and the Content API
//! - `log_capture`: thread-scoped tracing capture

pub mod google;
pub mod log_capture;
