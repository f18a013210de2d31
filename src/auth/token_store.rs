//! Persistent refresh-token record for one profile directory.
//!
//! The record holds only the refresh token:
//!
//! ```json
//! {
//!   "refresh_token": "1//0g..."
//! }
//! ```
//!
//! Access tokens and client secrets are never written. Concurrent runs
//! against the same profile directory are not coordinated.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::client_config::ClientConfig;
use super::credential::UserCredential;
use super::secret::SecretString;
use crate::error::{FeedstatError, Result};

/// The persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub refresh_token: SecretString,
}

/// Reads and writes the token record at a fixed path.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored record, or `None` if it is missing or unreadable.
    #[must_use]
    pub fn read_record(&self) -> Option<TokenRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(path = ?self.path, error = %e, "No stored token");
                return None;
            }
        };
        match serde_json::from_str::<TokenRecord>(&content) {
            Ok(record) if !record.refresh_token.is_empty() => Some(record),
            Ok(_) => {
                tracing::debug!(path = ?self.path, "Stored token record is empty");
                None
            }
            Err(e) => {
                tracing::debug!(path = ?self.path, error = %e, "Stored token record is malformed");
                None
            }
        }
    }

    /// Rebuild a credential from the stored refresh token and refresh it.
    ///
    /// Returns `Ok(None)` when there is no usable record, or when the token
    /// endpoint rejects the stored refresh token (a re-authorization notice is
    /// logged in that case).
    ///
    /// # Errors
    ///
    /// Transport and protocol failures during the refresh.
    pub async fn get(
        &self,
        client: &ClientConfig,
        scopes: &[String],
    ) -> Result<Option<UserCredential>> {
        let Some(record) = self.read_record() else {
            return Ok(None);
        };

        let mut credential = UserCredential::from_refresh_token(
            client.clone(),
            record.refresh_token.expose(),
            scopes.to_vec(),
        );

        match credential.refresh().await {
            Ok(()) => Ok(Some(credential)),
            Err(FeedstatError::TokenRejected { reason, .. }) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %reason,
                    "The stored credentials in the file {} cannot be refreshed, re-requesting access.",
                    self.path.display()
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Persist the credential's refresh token, replacing any prior record.
    ///
    /// The record is written to a temporary file in the same directory and
    /// renamed over the old one, so readers see either the old or the new
    /// record. A credential without a refresh token leaves the record as is.
    ///
    /// # Errors
    ///
    /// I/O and serialization failures.
    pub fn put(&self, credential: &UserCredential) -> Result<()> {
        let Some(refresh_token) = credential.refresh_token.clone() else {
            tracing::warn!(
                path = %self.path.display(),
                "Authorization returned no refresh token; stored token left unchanged"
            );
            return Ok(());
        };

        let record = TokenRecord { refresh_token };
        let mut json = serde_json::to_string_pretty(&record)?;
        json.push('\n');

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!(path = %self.path.display(), "Stored refresh token");
        Ok(())
    }
}
