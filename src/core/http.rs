//! HTTP client utilities.
//!
//! Provides the shared HTTP client and the request helper used for every
//! call to Google endpoints.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::{FeedstatError, Result};

/// Default timeout for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("feedstat/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FeedstatError::Network {
            operation: "http.client".to_string(),
            message: e.to_string(),
        })
}

/// Classify a transport error from `operation`.
#[must_use]
pub fn transport_error(operation: &str, timeout: Duration, e: &reqwest::Error) -> FeedstatError {
    if e.is_timeout() {
        FeedstatError::Timeout {
            operation: operation.to_string(),
            seconds: timeout.as_secs(),
        }
    } else {
        FeedstatError::Network {
            operation: operation.to_string(),
            message: e.to_string(),
        }
    }
}

/// Send `request` and decode a JSON success body.
///
/// # Errors
///
/// `Timeout`/`Network` on transport failure, `Api` on a non-2xx status
/// (carrying Google's error message when the body has one), and
/// `ParseResponse` when the body does not decode as `T`.
pub async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    operation: &str,
    timeout: Duration,
) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(operation, timeout, &e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(operation, timeout, &e))?;

    if !status.is_success() {
        let message = google_error_message(&body)
            .or_else(|| status.canonical_reason().map(String::from))
            .unwrap_or_else(|| "request failed".to_string());
        tracing::debug!(operation, status = status.as_u16(), %message, "Request failed");
        return Err(FeedstatError::Api {
            operation: operation.to_string(),
            status: Some(status.as_u16()),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| FeedstatError::ParseResponse {
        operation: operation.to_string(),
        message: e.to_string(),
    })
}

/// Extract the human-readable message from a Google error body.
///
/// Handles both the API shape `{"error": {"message": ...}}` and the OAuth
/// shape `{"error": "invalid_grant", "error_description": ...}`.
#[must_use]
pub fn google_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }
    let code = error.as_str()?;
    match value.get("error_description").and_then(|d| d.as_str()) {
        Some(description) => Some(format!("{code}: {description}")),
        None => Some(code.to_string()),
    }
}
