//! Application Default Credentials discovery.
//!
//! Sources, in order:
//! 1. the file named by `GOOGLE_APPLICATION_CREDENTIALS`
//! 2. gcloud's well-known `application_default_credentials.json`
//! 3. the GCE metadata server
//!
//! Nothing here is fatal: an unusable source is logged and skipped.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::client_config::{ClientConfig, default_token_uri};
use super::credential::{Credential, MetadataCredential, ServiceAccountCredential, UserCredential};
use super::secret::SecretString;
use super::service_account::ServiceAccountKey;
use crate::storage::config::is_env_truthy;
use crate::storage::paths::home_dir;

pub const ENV_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const ENV_CLOUDSDK_CONFIG: &str = "CLOUDSDK_CONFIG";
pub const ENV_METADATA_HOST: &str = "GCE_METADATA_HOST";
pub const ENV_NO_GCE_CHECK: &str = "NO_GCE_CHECK";

const WELL_KNOWN_FILE: &str = "application_default_credentials.json";
const DEFAULT_METADATA_HOST: &str = "169.254.169.254";
const METADATA_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Where to look for ambient credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbientSources {
    /// Explicitly configured credentials file.
    pub explicit_file: Option<PathBuf>,
    /// gcloud's application-default credentials file.
    pub well_known_file: Option<PathBuf>,
    /// Metadata server `host[:port]`; `None` disables the probe.
    pub metadata_host: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AdcFile {
    AuthorizedUser {
        client_id: String,
        client_secret: SecretString,
        refresh_token: SecretString,
        #[serde(default = "default_token_uri")]
        token_uri: String,
    },
    ServiceAccount {},
}

impl AmbientSources {
    /// Sources described by the process environment.
    #[must_use]
    pub fn from_env(metadata_probe: bool) -> Self {
        let explicit_file = std::env::var_os(ENV_CREDENTIALS)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let metadata_host = (metadata_probe && !is_env_truthy(ENV_NO_GCE_CHECK)).then(|| {
            std::env::var(ENV_METADATA_HOST)
                .ok()
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string())
        });

        Self {
            explicit_file,
            well_known_file: well_known_file(),
            metadata_host,
        }
    }

    /// No ambient sources at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            explicit_file: None,
            well_known_file: None,
            metadata_host: None,
        }
    }

    /// First usable ambient credential.
    ///
    /// An explicitly configured file is the only file consulted when set.
    pub async fn discover(
        &self,
        http: &Client,
        scopes: &[String],
    ) -> Option<Credential> {
        if let Some(path) = &self.explicit_file {
            return load_file(path, scopes).await;
        }

        if let Some(path) = self.well_known_file.as_deref().filter(|p| p.exists())
            && let Some(credential) = load_file(path, scopes).await
        {
            return Some(credential);
        }

        let host = self.metadata_host.as_deref()?;
        if probe_metadata(http, host).await {
            tracing::debug!(host, "Metadata server available");
            return Some(Credential::Metadata(MetadataCredential::new(host, scopes.to_vec())));
        }
        None
    }
}

fn well_known_file() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(ENV_CLOUDSDK_CONFIG).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir).join(WELL_KNOWN_FILE));
    }
    if cfg!(windows) {
        std::env::var_os("APPDATA").map(|d| PathBuf::from(d).join("gcloud").join(WELL_KNOWN_FILE))
    } else {
        home_dir().map(|h| h.join(".config/gcloud").join(WELL_KNOWN_FILE))
    }
}

async fn load_file(path: &Path, scopes: &[String]) -> Option<Credential> {
    let path_display = path.display().to_string();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path_display, error = %e, "Cannot read default credentials file");
            return None;
        }
    };

    let parsed: AdcFile = match serde_json::from_str(&content) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(path = %path_display, error = %e, "Unsupported default credentials file");
            return None;
        }
    };

    match parsed {
        AdcFile::ServiceAccount {} => match ServiceAccountKey::from_json(&path_display, &content) {
            Ok(key) => Some(Credential::ServiceAccount(ServiceAccountCredential::new(
                key,
                scopes.to_vec(),
            ))),
            Err(e) => {
                tracing::warn!(path = %path_display, error = %e, "Unusable default service account");
                None
            }
        },
        AdcFile::AuthorizedUser {
            client_id,
            client_secret,
            refresh_token,
            token_uri,
        } => {
            let mut client = ClientConfig::new(client_id, client_secret.expose());
            client.token_uri = token_uri;
            let mut user =
                UserCredential::from_refresh_token(client, refresh_token.expose(), scopes.to_vec());
            match user.refresh().await {
                Ok(()) => Some(Credential::User(user)),
                Err(e) => {
                    tracing::warn!(path = %path_display, error = %e, "Default user credentials cannot be refreshed");
                    None
                }
            }
        }
    }
}

/// Whether a metadata server answers at `host`.
async fn probe_metadata(http: &Client, host: &str) -> bool {
    let response = http
        .get(format!("http://{host}/"))
        .header("Metadata-Flavor", "Google")
        .timeout(METADATA_PROBE_TIMEOUT)
        .send()
        .await;
    match response {
        Ok(response) => response
            .headers()
            .get("Metadata-Flavor")
            .is_some_and(|v| v.as_bytes() == b"Google"),
        Err(e) => {
            tracing::debug!(host, error = %e, "Metadata server not reachable");
            false
        }
    }
}
