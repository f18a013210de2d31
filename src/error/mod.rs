//! Error types for feedstat.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized into six main categories:
//! - **Authentication**: No usable credential source, rejected or failed authorization
//! - **Network**: Connection and timeout failures talking to Google endpoints
//! - **Configuration**: Profile directory, secrets, account list or `config.toml` problems
//! - **Api**: The Content API answered with an error or an unreadable body
//! - **Environment**: Interrupts and terminal prompt failures
//! - **Internal**: I/O, serialization and unclassified errors
//!
//! Each error has a stable error code (e.g., `FST-A001`) for programmatic handling.
//!
//! Nothing in the library terminates the process. Errors travel up to `main`,
//! which renders them to stderr and picks the exit code via
//! [`FeedstatError::exit_code()`].

pub mod suggestions;

use thiserror::Error;

pub use suggestions::FixSuggestion;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential discovery or authorization failures.
    Authentication,
    /// Network issues (timeout, connection refused, DNS).
    Network,
    /// Configuration issues (profile files, config.toml, account list).
    Configuration,
    /// Remote API returned an error.
    Api,
    /// Environment issues (interrupts, prompts).
    Environment,
    /// Internal errors (I/O, serialization, bugs).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Authentication => "Authentication error",
            Self::Network => "Network error",
            Self::Configuration => "Configuration error",
            Self::Api => "API error",
            Self::Environment => "Environment error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Authentication => "A",
            Self::Network => "N",
            Self::Configuration => "C",
            Self::Api => "P",
            Self::Environment => "E",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Remote or unexpected failure
    GeneralError = 1,
    /// Missing or invalid configuration
    ConfigError = 2,
    /// No usable credential could be produced
    AuthError = 3,
    /// Invalid command-line usage
    UsageError = 4,
    /// Interrupted by the user
    Interrupted = 130,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

/// Main error type for feedstat operations.
#[derive(Error, Debug)]
pub enum FeedstatError {
    // ==========================================================================
    // Authentication errors (Category: Authentication)
    // ==========================================================================
    /// Every credential source was checked and none produced a credential.
    #[error("no OAuth2 authentication files found (checked: {})", .checked.join(", "))]
    NoCredentials { checked: Vec<String> },

    /// Ambient credentials were unavailable and no profile directory is configured.
    #[error("must use Application Default Credentials when no profile directory is configured")]
    NoProfileConfigured,

    /// The token endpoint rejected a refresh token.
    #[error("refresh token rejected by {endpoint}: {reason}")]
    TokenRejected { endpoint: String, reason: String },

    /// Interactive authorization did not complete.
    #[error("authorization failed: {reason}")]
    AuthorizationFailed { reason: String },

    /// A service-account key could not be used.
    #[error("invalid service account key at {path}: {message}")]
    ServiceAccountKey { path: String, message: String },

    // ==========================================================================
    // Network errors (Category: Network)
    // ==========================================================================
    /// Request timed out.
    #[error("{operation} timed out after {seconds} seconds")]
    Timeout { operation: String, seconds: u64 },

    /// Generic network failure.
    #[error("network error during {operation}: {message}")]
    Network { operation: String, message: String },

    // ==========================================================================
    // Configuration errors (Category: Configuration)
    // ==========================================================================
    /// Required file not found at expected path.
    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Error parsing a configuration document.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Client secrets document has no `installed` section.
    #[error("client secrets at {path} are not for an installed application")]
    ClientSecretsInvalid { path: String },

    /// Invalid value in configuration.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid {
        key: String,
        value: String,
        message: String,
    },

    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unrecognized report view name.
    #[error("invalid report view '{0}' (expected list-errors, save-file or display-all)")]
    InvalidView(String),

    // ==========================================================================
    // API errors (Category: Api)
    // ==========================================================================
    /// The Content API returned a non-success status.
    #[error("{operation} failed{}: {message}", status_suffix(.status.as_ref()))]
    Api {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    /// Failed to parse a remote response.
    #[error("failed to parse {operation} response: {message}")]
    ParseResponse { operation: String, message: String },

    // ==========================================================================
    // Environment errors (Category: Environment)
    // ==========================================================================
    /// Run interrupted by the user.
    #[error("interrupted")]
    Interrupted,

    /// Interactive prompt failed.
    #[error("prompt failed: {0}")]
    Prompt(dialoguer::Error),

    // ==========================================================================
    // I/O errors (Category: Internal)
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV output failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ==========================================================================
    // Generic wrapper (Category: Internal)
    // ==========================================================================
    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FeedstatError {
    /// Map error to process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::NoCredentials { .. }
            | Self::NoProfileConfigured
            | Self::TokenRejected { .. }
            | Self::AuthorizationFailed { .. }
            | Self::ServiceAccountKey { .. } => ExitCode::AuthError,

            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ClientSecretsInvalid { .. }
            | Self::ConfigInvalid { .. }
            | Self::Config(_) => ExitCode::ConfigError,

            Self::InvalidView(_) => ExitCode::UsageError,

            Self::Interrupted => ExitCode::Interrupted,

            Self::Timeout { .. }
            | Self::Network { .. }
            | Self::Api { .. }
            | Self::ParseResponse { .. }
            | Self::Prompt(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Csv(_)
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NoCredentials { .. }
            | Self::NoProfileConfigured
            | Self::TokenRejected { .. }
            | Self::AuthorizationFailed { .. }
            | Self::ServiceAccountKey { .. } => ErrorCategory::Authentication,

            Self::Timeout { .. } | Self::Network { .. } => ErrorCategory::Network,

            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ClientSecretsInvalid { .. }
            | Self::ConfigInvalid { .. }
            | Self::Config(_)
            | Self::InvalidView(_) => ErrorCategory::Configuration,

            Self::Api { .. } | Self::ParseResponse { .. } => ErrorCategory::Api,

            Self::Interrupted | Self::Prompt(_) => ErrorCategory::Environment,

            Self::Io(_) | Self::Json(_) | Self::Csv(_) | Self::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `FST-{category}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            // Authentication errors (A001-A099)
            Self::NoCredentials { .. } => "FST-A001",
            Self::NoProfileConfigured => "FST-A002",
            Self::TokenRejected { .. } => "FST-A003",
            Self::AuthorizationFailed { .. } => "FST-A004",
            Self::ServiceAccountKey { .. } => "FST-A005",

            // Network errors (N001-N099)
            Self::Timeout { .. } => "FST-N001",
            Self::Network { .. } => "FST-N099",

            // Configuration errors (C001-C099)
            Self::ConfigNotFound { .. } => "FST-C001",
            Self::ConfigParse { .. } => "FST-C002",
            Self::ClientSecretsInvalid { .. } => "FST-C003",
            Self::ConfigInvalid { .. } => "FST-C004",
            Self::Config(_) => "FST-C005",
            Self::InvalidView(_) => "FST-C010",

            // API errors (P001-P099)
            Self::Api { .. } => "FST-P001",
            Self::ParseResponse { .. } => "FST-P020",

            // Environment errors (E001-E099)
            Self::Interrupted => "FST-E001",
            Self::Prompt(_) => "FST-E002",

            // Internal errors (X001-X099)
            Self::Io(_) => "FST-X001",
            Self::Json(_) => "FST-X002",
            Self::Csv(_) => "FST-X003",
            Self::Other(_) => "FST-X099",
        }
    }

    /// Name of the remote operation that failed, if this error came from one.
    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Timeout { operation, .. }
            | Self::Network { operation, .. }
            | Self::Api { operation, .. }
            | Self::ParseResponse { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// Returns actionable fix suggestions for this error.
    #[must_use]
    pub fn fix_suggestions(&self) -> Vec<FixSuggestion> {
        match self {
            Self::NoCredentials { checked } => suggestions::no_credentials_suggestions(checked),
            Self::NoProfileConfigured => suggestions::no_profile_suggestions(),
            Self::TokenRejected { .. } => suggestions::token_rejected_suggestions(),
            Self::AuthorizationFailed { reason } => {
                suggestions::authorization_failed_suggestions(reason)
            }
            Self::ServiceAccountKey { path, .. } => suggestions::service_account_suggestions(path),

            Self::Timeout { operation, seconds } => {
                suggestions::timeout_suggestions(operation, *seconds)
            }
            Self::Network { operation, .. } => suggestions::network_suggestions(operation),

            Self::ConfigNotFound { path } => suggestions::config_not_found_suggestions(path),
            Self::ConfigParse { path, message } => {
                suggestions::config_parse_suggestions(path, message)
            }
            Self::ClientSecretsInvalid { path } => {
                suggestions::client_secrets_invalid_suggestions(path)
            }
            Self::ConfigInvalid { key, value, .. } => {
                suggestions::config_invalid_suggestions(key, value)
            }
            Self::Config(msg) => vec![FixSuggestion::new(
                vec!["feedstat --help".to_string()],
                format!("Configuration problem: {msg}"),
            )],
            Self::InvalidView(view) => suggestions::invalid_view_suggestions(view),

            Self::Api {
                operation, status, ..
            } => suggestions::api_error_suggestions(operation, *status),
            Self::ParseResponse { operation, .. } => vec![FixSuggestion::new(
                vec!["FEEDSTAT_LOG=debug feedstat --auto list-errors".to_string()],
                format!("The {operation} response did not match the expected Content API shape."),
            )],

            Self::Interrupted => vec![FixSuggestion::new(
                vec![],
                "The run was interrupted before the report was produced.",
            )],
            Self::Prompt(_) => vec![FixSuggestion::new(
                vec!["feedstat --auto list-errors".to_string()],
                "Interactive prompts need a terminal. Use --auto in scripts.",
            )],

            Self::Io(_) | Self::Json(_) | Self::Csv(_) | Self::Other(_) => {
                vec![FixSuggestion::new(
                    vec!["FEEDSTAT_LOG=debug feedstat --auto list-errors".to_string()],
                    "An unexpected internal error occurred. Re-run with debug logging for details.",
                )]
            }
        }
    }
}

impl From<dialoguer::Error> for FeedstatError {
    fn from(e: dialoguer::Error) -> Self {
        match e {
            // Ctrl-C inside a raw-mode prompt arrives as a read error, not a signal.
            dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
                Self::Interrupted
            }
            other => Self::Prompt(other),
        }
    }
}

fn status_suffix(status: Option<&u16>) -> String {
    status.map(|s| format!(" with HTTP {s}")).unwrap_or_default()
}

/// Result type alias using `FeedstatError`.
pub type Result<T> = std::result::Result<T, FeedstatError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_errors() -> Vec<FeedstatError> {
        vec![
            FeedstatError::NoCredentials {
                checked: vec!["Google Application Default Credentials".to_string()],
            },
            FeedstatError::NoProfileConfigured,
            FeedstatError::TokenRejected {
                endpoint: "https://oauth2.googleapis.com/token".to_string(),
                reason: "invalid_grant".to_string(),
            },
            FeedstatError::AuthorizationFailed {
                reason: "access_denied".to_string(),
            },
            FeedstatError::ServiceAccountKey {
                path: "service-account.json".to_string(),
                message: "bad key".to_string(),
            },
            FeedstatError::Timeout {
                operation: "datafeeds.list".to_string(),
                seconds: 30,
            },
            FeedstatError::Network {
                operation: "datafeeds.list".to_string(),
                message: "reset".to_string(),
            },
            FeedstatError::ConfigNotFound {
                path: "merchant-ids.json".to_string(),
            },
            FeedstatError::ConfigParse {
                path: "merchant-ids.json".to_string(),
                message: "expected value".to_string(),
            },
            FeedstatError::ClientSecretsInvalid {
                path: "client-secrets.json".to_string(),
            },
            FeedstatError::ConfigInvalid {
                key: "api.page_size".to_string(),
                value: "0".to_string(),
                message: "must be positive".to_string(),
            },
            FeedstatError::Config("bad".to_string()),
            FeedstatError::InvalidView("everything".to_string()),
            FeedstatError::Api {
                operation: "datafeedstatuses.list".to_string(),
                status: Some(403),
                message: "forbidden".to_string(),
            },
            FeedstatError::ParseResponse {
                operation: "datafeeds.list".to_string(),
                message: "eof".to_string(),
            },
            FeedstatError::Interrupted,
            FeedstatError::Io(std::io::Error::other("disk")),
            FeedstatError::Other(anyhow::anyhow!("boom")),
        ]
    }

    #[test]
    fn error_category_code_prefix() {
        assert_eq!(ErrorCategory::Authentication.code_prefix(), "A");
        assert_eq!(ErrorCategory::Api.code_prefix(), "P");
        assert_eq!(ErrorCategory::Internal.code_prefix(), "X");
    }

    #[test]
    fn error_codes_follow_category_prefix() {
        for err in sample_errors() {
            let code = err.error_code();
            let expected = format!("FST-{}", err.category().code_prefix());
            assert!(
                code.starts_with(&expected),
                "{code} should start with {expected}"
            );
            assert_eq!(code.len(), 8, "{code} should be FST-Xnnn");
        }
    }

    #[test]
    fn error_codes_are_unique() {
        let errors = sample_errors();
        let codes: HashSet<_> = errors.iter().map(FeedstatError::error_code).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn exit_codes_are_correct() {
        assert_eq!(
            FeedstatError::NoProfileConfigured.exit_code(),
            ExitCode::AuthError
        );
        assert_eq!(
            FeedstatError::Config("x".to_string()).exit_code(),
            ExitCode::ConfigError
        );
        assert_eq!(
            FeedstatError::InvalidView("x".to_string()).exit_code(),
            ExitCode::UsageError
        );
        assert_eq!(FeedstatError::Interrupted.exit_code(), ExitCode::Interrupted);
        assert_eq!(
            FeedstatError::Timeout {
                operation: "datafeeds.list".to_string(),
                seconds: 5,
            }
            .exit_code(),
            ExitCode::GeneralError
        );
        assert_eq!(i32::from(ExitCode::Interrupted), 130);
    }

    #[test]
    fn api_error_names_operation_and_status() {
        let err = FeedstatError::Api {
            operation: "datafeeds.list".to_string(),
            status: Some(401),
            message: "Request had invalid authentication credentials.".to_string(),
        };
        assert_eq!(err.operation(), Some("datafeeds.list"));
        let text = err.to_string();
        assert!(text.starts_with("datafeeds.list failed with HTTP 401"));
    }

    #[test]
    fn timeout_names_operation() {
        let err = FeedstatError::Timeout {
            operation: "datafeedstatuses.list".to_string(),
            seconds: 30,
        };
        assert_eq!(err.operation(), Some("datafeedstatuses.list"));
        assert_eq!(err.to_string(), "datafeedstatuses.list timed out after 30 seconds");
        assert!(err.fix_suggestions()[0].context.contains("datafeedstatuses.list"));
    }

    #[test]
    fn prompt_interrupt_becomes_interrupted() {
        let interrupted = dialoguer::Error::IO(std::io::Error::from(std::io::ErrorKind::Interrupted));
        let err = FeedstatError::from(interrupted);
        assert!(matches!(err, FeedstatError::Interrupted));
        assert_eq!(err.exit_code(), ExitCode::Interrupted);

        let broken = dialoguer::Error::IO(std::io::Error::other("not a terminal"));
        assert!(matches!(FeedstatError::from(broken), FeedstatError::Prompt(_)));
    }

    #[test]
    fn no_credentials_message_lists_checked_sources() {
        let err = FeedstatError::NoCredentials {
            checked: vec![
                "Google Application Default Credentials".to_string(),
                "/p/service-account.json".to_string(),
                "/p/client-secrets.json".to_string(),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("/p/service-account.json"));
        assert!(text.contains("/p/client-secrets.json"));
    }

    #[test]
    fn all_error_variants_have_suggestions() {
        for err in sample_errors() {
            let suggestions = err.fix_suggestions();
            assert!(!suggestions.is_empty(), "{err:?} should have a suggestion");
            assert!(!suggestions[0].context.is_empty());
        }
    }
}
