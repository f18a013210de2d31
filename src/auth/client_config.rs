//! OAuth client configuration loaded from `client-secrets.json`.

use std::path::Path;

use oauth2::basic::BasicClient;
use oauth2::{AuthType, AuthUrl, ClientId, ClientSecret, TokenUrl};
use serde::Deserialize;

use super::secret::SecretString;
use crate::error::{FeedstatError, Result};

/// Google's OAuth authorization endpoint.
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
/// Google's OAuth token endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

pub(crate) fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// Client id, secret and endpoints of an installed-application OAuth client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientConfig>,
}

impl ClientConfig {
    /// Client config with Google's default endpoints.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret),
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
            redirect_uris: Vec::new(),
        }
    }

    /// Read the `installed` section of a client secrets file.
    ///
    /// # Errors
    ///
    /// `ConfigNotFound` for a missing file, `ConfigParse` for invalid JSON,
    /// and `ClientSecretsInvalid` when there is no `installed` section.
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FeedstatError::ConfigNotFound { path: display });
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_json(&display, &content)
    }

    /// Parse client secrets JSON; `source` names it in errors.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::load`].
    pub fn from_json(source: &str, content: &str) -> Result<Self> {
        let file: ClientSecretsFile =
            serde_json::from_str(content).map_err(|e| FeedstatError::ConfigParse {
                path: source.to_string(),
                message: e.to_string(),
            })?;
        file.installed
            .ok_or_else(|| FeedstatError::ClientSecretsInvalid {
                path: source.to_string(),
            })
    }

    /// An `oauth2` client for these endpoints, sending credentials in the
    /// request body as Google expects.
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` when either endpoint is not a valid URL.
    pub fn oauth_client(&self) -> Result<BasicClient> {
        let auth_url = AuthUrl::new(self.auth_uri.clone())
            .map_err(|e| invalid_uri("auth_uri", &self.auth_uri, &e))?;
        let token_url = TokenUrl::new(self.token_uri.clone())
            .map_err(|e| invalid_uri("token_uri", &self.token_uri, &e))?;
        Ok(BasicClient::new(
            ClientId::new(self.client_id.clone()),
            Some(ClientSecret::new(self.client_secret.expose().to_string())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody))
    }
}

fn invalid_uri(key: &str, value: &str, e: &url::ParseError) -> FeedstatError {
    FeedstatError::ConfigInvalid {
        key: key.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    }
}
