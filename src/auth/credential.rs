//! Credential material and bearer-token refresh.
//!
//! A [`Credential`] is one of three kinds:
//! - `User`: an OAuth refresh token for an installed-app client
//! - `ServiceAccount`: a service-account key that mints tokens with a signed JWT
//! - `Metadata`: the GCE metadata server's default service account
//!
//! Access tokens are cached and renewed when missing or within
//! [`EXPIRY_SKEW`] of expiry.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use oauth2::basic::{BasicErrorResponse, BasicTokenResponse};
use oauth2::reqwest::async_http_client;
use oauth2::{RefreshToken, RequestTokenError, TokenResponse};
use reqwest::Client;
use serde::Deserialize;

use super::client_config::ClientConfig;
use super::secret::SecretString;
use super::service_account::ServiceAccountKey;
use crate::core::http::send_json;
use crate::error::{FeedstatError, Result};

/// Tokens this close to expiry are treated as expired.
pub const EXPIRY_SKEW: Duration = Duration::from_secs(60);

// =============================================================================
// Access Token
// =============================================================================

/// A short-lived bearer token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Token that expires `expires_in` from now (never, if `None`).
    #[must_use]
    pub fn new(secret: impl Into<String>, expires_in: Option<Duration>) -> Self {
        let expires_at = expires_in
            .and_then(|d| TimeDelta::from_std(d).ok())
            .and_then(|d| Utc::now().checked_add_signed(d));
        Self {
            secret: SecretString::new(secret),
            expires_at,
        }
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        self.secret.expose()
    }

    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the token is usable at `now`, allowing for [`EXPIRY_SKEW`].
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        let skew = TimeDelta::from_std(EXPIRY_SKEW).unwrap_or(TimeDelta::zero());
        self.expires_at.is_none_or(|at| now + skew < at)
    }

    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }
}

/// Token endpoint success body shared by the JWT-bearer grant and the
/// metadata server.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl From<TokenGrant> for AccessToken {
    fn from(grant: TokenGrant) -> Self {
        Self::new(grant.access_token, grant.expires_in.map(Duration::from_secs))
    }
}

// =============================================================================
// User Credential
// =============================================================================

/// Installed-app OAuth credential.
#[derive(Debug, Clone)]
pub struct UserCredential {
    pub client: ClientConfig,
    pub refresh_token: Option<SecretString>,
    pub access_token: Option<AccessToken>,
    pub scopes: Vec<String>,
}

impl UserCredential {
    /// Credential holding only a refresh token; call [`Self::refresh`]
    /// before use.
    #[must_use]
    pub fn from_refresh_token(
        client: ClientConfig,
        refresh_token: impl Into<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            client,
            refresh_token: Some(SecretString::new(refresh_token)),
            access_token: None,
            scopes,
        }
    }

    /// Credential from a fresh token-endpoint response.
    #[must_use]
    pub fn from_token_response(
        client: ClientConfig,
        scopes: Vec<String>,
        token: &BasicTokenResponse,
    ) -> Self {
        let mut credential = Self {
            client,
            refresh_token: None,
            access_token: None,
            scopes,
        };
        credential.apply(token);
        credential
    }

    fn apply(&mut self, token: &BasicTokenResponse) {
        self.access_token = Some(AccessToken::new(
            token.access_token().secret().clone(),
            token.expires_in(),
        ));
        // Google omits the refresh token on refresh; keep the one we have.
        if let Some(refresh) = token.refresh_token() {
            self.refresh_token = Some(SecretString::new(refresh.secret().clone()));
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.access_token.as_ref().is_some_and(AccessToken::is_fresh)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// `TokenRejected` when the token endpoint answers with an OAuth error
    /// (revoked or expired grant), `Network`/`ParseResponse` for transport
    /// and protocol failures.
    pub async fn refresh(&mut self) -> Result<()> {
        let Some(refresh_token) = self.refresh_token.clone() else {
            return Err(FeedstatError::TokenRejected {
                endpoint: self.client.token_uri.clone(),
                reason: "no refresh token available".to_string(),
            });
        };

        let token = self
            .client
            .oauth_client()?
            .exchange_refresh_token(&RefreshToken::new(refresh_token.expose().to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                token_request_error("token.refresh", e, |reason| FeedstatError::TokenRejected {
                    endpoint: self.client.token_uri.clone(),
                    reason,
                })
            })?;

        self.apply(&token);
        tracing::debug!(
            expires_at = ?self.access_token.as_ref().and_then(AccessToken::expires_at),
            "Refreshed user access token"
        );
        Ok(())
    }
}

/// Map an `oauth2` request failure; `rejected` builds the error for an
/// OAuth error response from the server.
pub(crate) fn token_request_error<RE: std::error::Error + 'static>(
    operation: &str,
    err: RequestTokenError<RE, BasicErrorResponse>,
    rejected: impl FnOnce(String) -> FeedstatError,
) -> FeedstatError {
    match err {
        RequestTokenError::ServerResponse(response) => rejected(response.to_string()),
        RequestTokenError::Request(e) => FeedstatError::Network {
            operation: operation.to_string(),
            message: e.to_string(),
        },
        RequestTokenError::Parse(e, _) => FeedstatError::ParseResponse {
            operation: operation.to_string(),
            message: e.to_string(),
        },
        RequestTokenError::Other(message) => FeedstatError::Network {
            operation: operation.to_string(),
            message,
        },
    }
}

// =============================================================================
// Service Account Credential
// =============================================================================

/// Service-account credential; tokens are minted on demand.
#[derive(Debug, Clone)]
pub struct ServiceAccountCredential {
    pub key: ServiceAccountKey,
    pub scopes: Vec<String>,
    pub access_token: Option<AccessToken>,
}

impl ServiceAccountCredential {
    #[must_use]
    pub const fn new(key: ServiceAccountKey, scopes: Vec<String>) -> Self {
        Self {
            key,
            scopes,
            access_token: None,
        }
    }

    /// Mint a new access token with a JWT-bearer assertion.
    ///
    /// # Errors
    ///
    /// Signing, transport and token-endpoint failures.
    pub async fn mint(&mut self, http: &Client, timeout: Duration) -> Result<()> {
        let grant = self.key.exchange_assertion(http, timeout, &self.scopes).await?;
        self.access_token = Some(grant.into());
        tracing::debug!(account = %self.key.client_email, "Minted service account token");
        Ok(())
    }
}

// =============================================================================
// Metadata Credential
// =============================================================================

const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Default service account of the GCE instance we run on.
#[derive(Debug, Clone)]
pub struct MetadataCredential {
    /// `host[:port]` of the metadata server.
    pub host: String,
    pub scopes: Vec<String>,
    pub access_token: Option<AccessToken>,
}

impl MetadataCredential {
    #[must_use]
    pub fn new(host: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            host: host.into(),
            scopes,
            access_token: None,
        }
    }

    /// Fetch a token from the metadata server.
    ///
    /// # Errors
    ///
    /// Transport and metadata-server failures.
    pub async fn fetch(&mut self, http: &Client, timeout: Duration) -> Result<()> {
        let mut url = url::Url::parse(&format!("http://{}{METADATA_TOKEN_PATH}", self.host))
            .map_err(|e| FeedstatError::Config(format!("invalid metadata host: {e}")))?;
        if !self.scopes.is_empty() {
            url.query_pairs_mut().append_pair("scopes", &self.scopes.join(","));
        }
        let request = http.get(url).header("Metadata-Flavor", "Google");
        let grant: TokenGrant = send_json(request, "metadata.token", timeout).await?;
        self.access_token = Some(grant.into());
        Ok(())
    }
}

// =============================================================================
// Credential
// =============================================================================

/// A scoped credential able to produce bearer tokens.
#[derive(Debug, Clone)]
pub enum Credential {
    User(UserCredential),
    ServiceAccount(ServiceAccountCredential),
    Metadata(MetadataCredential),
}

impl Credential {
    /// Whether the credential can be used without another round trip.
    ///
    /// Service-account credentials are always usable: they mint their own
    /// tokens.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::User(user) => user.is_valid(),
            Self::ServiceAccount(_) => true,
            Self::Metadata(metadata) => metadata
                .access_token
                .as_ref()
                .is_some_and(AccessToken::is_fresh),
        }
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        match self {
            Self::User(user) => user.refresh_token.as_ref().map(SecretString::expose),
            Self::ServiceAccount(_) | Self::Metadata(_) => None,
        }
    }

    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::User(_) => "authorized user",
            Self::ServiceAccount(_) => "service account",
            Self::Metadata(_) => "compute metadata",
        }
    }

    fn cached_token(&self) -> Option<&AccessToken> {
        match self {
            Self::User(user) => user.access_token.as_ref(),
            Self::ServiceAccount(sa) => sa.access_token.as_ref(),
            Self::Metadata(metadata) => metadata.access_token.as_ref(),
        }
    }

    /// A fresh access token, renewing it first when needed.
    ///
    /// # Errors
    ///
    /// Whatever the renewal for this kind of credential fails with.
    pub async fn bearer_token(&mut self, http: &Client, timeout: Duration) -> Result<String> {
        if let Some(token) = self.cached_token().filter(|t| t.is_fresh()) {
            return Ok(token.secret().to_string());
        }

        match self {
            Self::User(user) => user.refresh().await?,
            Self::ServiceAccount(sa) => sa.mint(http, timeout).await?,
            Self::Metadata(metadata) => metadata.fetch(http, timeout).await?,
        }

        self.cached_token()
            .map(|t| t.secret().to_string())
            .ok_or_else(|| FeedstatError::ParseResponse {
                operation: "token".to_string(),
                message: "no access token in response".to_string(),
            })
    }
}
