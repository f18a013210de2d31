//! Fix suggestion database for feedstat errors.
//!
//! Provides actionable fix suggestions mapped to specific error types,
//! including commands, context explanations, and prevention tips.

use crate::storage::paths::{CLIENT_SECRETS_FILE, SERVICE_ACCOUNT_FILE, TOKEN_FILE};

const AUTH_DOC_URL: &str = "https://developers.google.com/shopping-content/guides/how-tos/authorizing";

// =============================================================================
// Fix Suggestion Types
// =============================================================================

/// A fix suggestion for an error.
///
/// Contains actionable information to help users resolve errors.
#[derive(Debug, Clone)]
pub struct FixSuggestion {
    /// Primary fix commands in order of preference.
    /// These should be copy-paste ready for the terminal.
    pub commands: Vec<String>,

    /// Explanation of why this error occurred.
    pub context: String,

    /// Tips to prevent this error in the future.
    pub prevention: Option<String>,

    /// Link to documentation for more information.
    pub doc_url: Option<String>,
}

impl FixSuggestion {
    /// Creates a new fix suggestion with required fields.
    #[must_use]
    pub fn new(commands: Vec<String>, context: impl Into<String>) -> Self {
        Self {
            commands,
            context: context.into(),
            prevention: None,
            doc_url: None,
        }
    }

    /// Builder: adds prevention tips.
    #[must_use]
    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }

    /// Builder: adds documentation URL.
    #[must_use]
    pub fn with_doc_url(mut self, url: impl Into<String>) -> Self {
        self.doc_url = Some(url.into());
        self
    }
}

// =============================================================================
// Authentication Suggestions
// =============================================================================

/// Suggestions when no credential source produced a credential.
#[must_use]
pub fn no_credentials_suggestions(checked: &[String]) -> Vec<FixSuggestion> {
    let listing = checked
        .iter()
        .map(|c| format!("- {c}"))
        .collect::<Vec<_>>()
        .join("\n");
    vec![
        FixSuggestion::new(
            vec![
                "gcloud auth application-default login --scopes=https://www.googleapis.com/auth/content"
                    .to_string(),
            ],
            format!(
                "No OAuth2 authentication files found. Checked:\n{listing}\n\
                 Place a {SERVICE_ACCOUNT_FILE} or {CLIENT_SECRETS_FILE} in the profile \
                 directory, or configure Application Default Credentials."
            ),
        )
        .with_doc_url(AUTH_DOC_URL),
    ]
}

/// Suggestions when ambient credentials failed and `--noconfig` was used.
#[must_use]
pub fn no_profile_suggestions() -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![
                "feedstat --config-path ~/shopping-samples".to_string(),
                "export GOOGLE_APPLICATION_CREDENTIALS=/path/to/key.json".to_string(),
            ],
            "Without a profile directory only Application Default Credentials can be \
             used, and none were found.",
        )
        .with_doc_url(AUTH_DOC_URL),
    ]
}

/// Suggestions when a refresh token is rejected outright.
#[must_use]
pub fn token_rejected_suggestions() -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!("rm <profile>/{TOKEN_FILE}"), "feedstat".to_string()],
            "The stored refresh token was revoked or expired. Removing it forces a new \
             interactive authorization.",
        )
        .with_prevention(
            "Refresh tokens for apps in testing mode expire after seven days. Publish the \
             OAuth consent screen or use a service account for unattended runs.",
        ),
    ]
}

/// Suggestions when the interactive OAuth flow fails.
#[must_use]
pub fn authorization_failed_suggestions(reason: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["feedstat".to_string()],
        format!(
            "The browser authorization did not complete ({reason}). Re-run and approve \
             access to the Content API scope."
        ),
    )]
}

/// Suggestions for an unusable service-account key.
#[must_use]
pub fn service_account_suggestions(path: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!(
                "gcloud iam service-accounts keys create {path} --iam-account=<account>"
            )],
            format!(
                "The service-account key at {path} could not be read or signed with. \
                 Download a fresh JSON key for the account."
            ),
        )
        .with_doc_url(AUTH_DOC_URL),
    ]
}

// =============================================================================
// Network Suggestions
// =============================================================================

/// Generates fix suggestions for timeout errors.
#[must_use]
pub fn timeout_suggestions(operation: &str, seconds: u64) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!("FEEDSTAT_TIMEOUT={} feedstat", seconds * 2)],
            format!(
                "The {operation} request did not complete within {seconds}s. Large accounts \
                 with many feeds can take longer to list."
            ),
        )
        .with_prevention("Raise `[api] timeout_seconds` in config.toml."),
    ]
}

/// Suggestions for transport failures.
#[must_use]
pub fn network_suggestions(operation: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["curl -sI https://shopping.googleapis.com".to_string()],
        format!("The {operation} request could not reach Google. Check connectivity and proxies."),
    )]
}

// =============================================================================
// Configuration Suggestions
// =============================================================================

/// Generates fix suggestions for config not found errors.
#[must_use]
pub fn config_not_found_suggestions(path: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("$EDITOR {path}")],
        format!(
            "Required file not found at {path}. The profile directory must hold the \
             account list and the credential files."
        ),
    )]
}

/// Generates fix suggestions for config parse errors.
#[must_use]
pub fn config_parse_suggestions(path: &str, message: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!("$EDITOR {path}")],
            format!("The file has a syntax error. The parser reported: {message}"),
        )
        .with_prevention("Validate JSON files with `jq . <file>` after editing."),
    ]
}

/// Suggestions for client secrets that are not for an installed app.
#[must_use]
pub fn client_secrets_invalid_suggestions(path: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!("$EDITOR {path}")],
            "Please read the note about OAuth2 client IDs in the top-level README. The \
             client secrets must come from a \"Desktop app\" OAuth client and contain an \
             \"installed\" section.",
        )
        .with_doc_url(AUTH_DOC_URL),
    ]
}

/// Generates fix suggestions for invalid config value errors.
#[must_use]
pub fn config_invalid_suggestions(key: &str, value: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["feedstat --help".to_string()],
        format!("The value '{value}' is not valid for '{key}'."),
    )]
}

/// Suggestions for an unknown report view.
#[must_use]
pub fn invalid_view_suggestions(view: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![
            "feedstat --auto list-errors".to_string(),
            "feedstat --auto save-file --file-name report.csv".to_string(),
            "feedstat --auto display-all".to_string(),
        ],
        format!("'{view}' is not a report view."),
    )]
}

// =============================================================================
// API Suggestions
// =============================================================================

/// Suggestions for Content API errors, keyed by HTTP status.
#[must_use]
pub fn api_error_suggestions(operation: &str, status: Option<u16>) -> Vec<FixSuggestion> {
    let context = match status {
        Some(401) => format!(
            "{operation} was rejected as unauthenticated. The credential may lack the \
             Content API scope."
        ),
        Some(403) => format!(
            "{operation} was forbidden. The authorized user or service account has no \
             access to this merchant account."
        ),
        Some(404) => format!("{operation} found no such merchant. Check merchant-ids.json."),
        Some(429) => format!("{operation} hit the Content API quota. Try again later."),
        _ => format!("{operation} failed on the Google side."),
    };
    vec![FixSuggestion::new(
        vec!["FEEDSTAT_LOG=debug feedstat --auto list-errors".to_string()],
        context,
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_suggestion_builder() {
        let suggestion = FixSuggestion::new(vec!["cmd1".to_string()], "Test context")
            .with_prevention("Prevent tip")
            .with_doc_url("https://example.com");

        assert_eq!(suggestion.commands, vec!["cmd1"]);
        assert_eq!(suggestion.context, "Test context");
        assert_eq!(suggestion.prevention, Some("Prevent tip".to_string()));
        assert_eq!(suggestion.doc_url, Some("https://example.com".to_string()));
    }

    #[test]
    fn no_credentials_lists_every_location() {
        let checked = vec![
            "Google Application Default Credentials".to_string(),
            "/profile/service-account.json".to_string(),
            "/profile/client-secrets.json".to_string(),
        ];
        let suggestions = no_credentials_suggestions(&checked);
        for location in &checked {
            assert!(suggestions[0].context.contains(location));
        }
    }

    #[test]
    fn api_suggestions_depend_on_status() {
        let forbidden = api_error_suggestions("datafeeds.list", Some(403));
        assert!(forbidden[0].context.contains("forbidden"));

        let other = api_error_suggestions("datafeeds.list", Some(500));
        assert!(other[0].context.contains("Google side"));
    }

    #[test]
    fn timeout_suggestion_doubles_timeout() {
        let suggestions = timeout_suggestions("datafeeds.list", 30);
        assert!(suggestions[0].commands[0].contains("60"));
    }
}
