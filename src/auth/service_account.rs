//! Service-account keys and the JWT-bearer token grant.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use super::client_config::default_token_uri;
use super::credential::TokenGrant;
use super::secret::SecretString;
use crate::core::http::send_json;
use crate::error::{FeedstatError, Result};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime requested for each assertion; Google caps it at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// On-disk shape of a service-account key file.
#[derive(Deserialize)]
struct KeyFile {
    #[serde(rename = "type", default)]
    key_type: Option<String>,
    client_email: String,
    private_key: SecretString,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    token_uri: String,
    #[serde(default)]
    project_id: Option<String>,
}

/// A parsed service-account key, ready to sign assertions.
#[derive(Clone)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key_id: Option<String>,
    pub token_uri: String,
    pub project_id: Option<String>,
    signer: EncodingKey,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    /// Load and validate a key file.
    ///
    /// # Errors
    ///
    /// `ServiceAccountKey` when the file cannot be read, is not a
    /// service-account key, or holds an unusable private key.
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| FeedstatError::ServiceAccountKey {
            path: display.clone(),
            message: e.to_string(),
        })?;
        Self::from_json(&display, &content)
    }

    /// Parse key JSON; `source` names it in errors.
    ///
    /// # Errors
    ///
    /// See [`ServiceAccountKey::load`].
    pub fn from_json(source: &str, content: &str) -> Result<Self> {
        let invalid = |message: String| FeedstatError::ServiceAccountKey {
            path: source.to_string(),
            message,
        };

        let file: KeyFile = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
        if let Some(kind) = file.key_type.as_deref().filter(|k| *k != "service_account") {
            return Err(invalid(format!("expected a service_account key, found '{kind}'")));
        }
        let signer = EncodingKey::from_rsa_pem(file.private_key.expose().as_bytes())
            .map_err(|e| invalid(format!("private key is not a valid RSA PEM: {e}")))?;

        Ok(Self {
            client_email: file.client_email,
            private_key_id: file.private_key_id,
            token_uri: file.token_uri,
            project_id: file.project_id,
            signer,
        })
    }

    /// Signed RS256 assertion for `scopes`, issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceAccountKey` if signing fails.
    pub fn assertion(&self, scopes: &[String], now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: scopes.join(" "),
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.private_key_id);

        encode(&header, &claims, &self.signer).map_err(|e| FeedstatError::ServiceAccountKey {
            path: self.client_email.clone(),
            message: e.to_string(),
        })
    }

    pub(crate) async fn exchange_assertion(
        &self,
        http: &Client,
        timeout: Duration,
        scopes: &[String],
    ) -> Result<TokenGrant> {
        let assertion = self.assertion(scopes, Utc::now())?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", JWT_BEARER_GRANT)
            .append_pair("assertion", &assertion)
            .finish();

        let request = http
            .post(&self.token_uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);
        send_json(request, "token.jwt_bearer", timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_service_account_type() {
        let err = ServiceAccountKey::from_json(
            "key.json",
            r#"{"type": "authorized_user", "client_email": "a@b", "private_key": "x"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("authorized_user"));
    }

    #[test]
    fn rejects_garbage_private_key() {
        let err = ServiceAccountKey::from_json(
            "key.json",
            r#"{"type": "service_account", "client_email": "a@b", "private_key": "not a pem"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FeedstatError::ServiceAccountKey { .. }));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = ServiceAccountKey::from_json("key.json", r#"{"type": "service_account"}"#)
            .unwrap_err();
        assert!(matches!(err, FeedstatError::ServiceAccountKey { path, .. } if path == "key.json"));
    }
}
