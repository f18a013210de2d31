//! Credential resolution.
//!
//! Sources are tried in a fixed order and the first one that produces a
//! credential wins:
//!
//! 1. Application Default Credentials (no profile files)
//! 2. `service-account.json` in the profile directory
//! 3. `client-secrets.json`, using the stored refresh token when it still
//!    works and the interactive flow otherwise
//!
//! Reordering changes which identity headless runs use.

use reqwest::Client;

use super::ambient::AmbientSources;
use super::client_config::ClientConfig;
use super::credential::{Credential, ServiceAccountCredential};
use super::flow::AuthorizationFlow;
use super::service_account::ServiceAccountKey;
use super::token_store::TokenStore;
use crate::error::{FeedstatError, Result};
use crate::storage::ProfilePaths;

/// Read-only access to Content API resources is not enough to list
/// datafeed statuses, so the full scope is requested.
pub const CONTENT_API_SCOPE: &str = "https://www.googleapis.com/auth/content";

const AMBIENT_SOURCE: &str = "Google Application Default Credentials";

/// One credential source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Ambient,
    ServiceAccount,
    OAuth,
}

impl CredentialKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ambient => "application default credentials",
            Self::ServiceAccount => "service account credentials from local directory",
            Self::OAuth => "OAuth2 client secrets from local directory",
        }
    }

    /// Whether this source reads files from the profile directory.
    #[must_use]
    pub const fn needs_profile(self) -> bool {
        !matches!(self, Self::Ambient)
    }
}

/// Order in which sources are tried.
pub const CREDENTIAL_PLAN: [CredentialKind; 3] = [
    CredentialKind::Ambient,
    CredentialKind::ServiceAccount,
    CredentialKind::OAuth,
];

/// A credential and the source it came from.
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub credential: Credential,
    pub kind: CredentialKind,
}

pub struct CredentialResolver<F> {
    ambient: AmbientSources,
    flow: F,
    http: Client,
    scopes: Vec<String>,
}

impl<F: AuthorizationFlow> CredentialResolver<F> {
    #[must_use]
    pub fn new(ambient: AmbientSources, flow: F, http: Client) -> Self {
        Self {
            ambient,
            flow,
            http,
            scopes: vec![CONTENT_API_SCOPE.to_string()],
        }
    }

    #[must_use]
    pub const fn flow(&self) -> &F {
        &self.flow
    }

    /// Produce a credential from the first source that yields one.
    ///
    /// # Errors
    ///
    /// - `NoProfileConfigured` when ambient credentials are unavailable and
    ///   `profile` is `None`
    /// - `NoCredentials` listing every source checked when none applies
    /// - load, refresh and authorization failures of the chosen source
    pub async fn authorize(&self, profile: Option<&ProfilePaths>) -> Result<ResolvedCredential> {
        let mut checked = Vec::new();

        for kind in CREDENTIAL_PLAN {
            if kind.needs_profile() && profile.is_none() {
                return Err(FeedstatError::NoProfileConfigured);
            }
            tracing::debug!(source = kind.label(), "Trying credential source");

            let attempt = match (kind, profile) {
                (CredentialKind::Ambient, _) => {
                    checked.push(AMBIENT_SOURCE.to_string());
                    self.ambient.discover(&self.http, &self.scopes).await
                }
                (CredentialKind::ServiceAccount, Some(profile)) => {
                    let path = profile.service_account_file();
                    checked.push(path.display().to_string());
                    if path.exists() {
                        let key = ServiceAccountKey::load(&path)?;
                        Some(Credential::ServiceAccount(ServiceAccountCredential::new(
                            key,
                            self.scopes.clone(),
                        )))
                    } else {
                        None
                    }
                }
                (CredentialKind::OAuth, Some(profile)) => {
                    let path = profile.client_secrets_file();
                    checked.push(path.display().to_string());
                    if path.exists() {
                        Some(self.oauth(profile).await?)
                    } else {
                        None
                    }
                }
                (_, None) => None,
            };

            if let Some(credential) = attempt {
                tracing::info!(source = kind.label(), credential = credential.kind_label(), "Credential resolved");
                return Ok(ResolvedCredential { credential, kind });
            }
        }

        Err(FeedstatError::NoCredentials { checked })
    }

    async fn oauth(&self, profile: &ProfilePaths) -> Result<Credential> {
        let client = ClientConfig::load(&profile.client_secrets_file())?;
        let store = TokenStore::new(profile.token_file());

        if let Some(user) = store.get(&client, &self.scopes).await?
            && user.is_valid()
        {
            tracing::debug!(path = %store.path().display(), "Using stored refresh token");
            return Ok(Credential::User(user));
        }

        let user = self.flow.authorize(&client, &self.scopes).await?;
        store.put(&user)?;
        Ok(Credential::User(user))
    }
}
