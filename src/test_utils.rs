//! Test utilities for feedstat.
//!
//! Provides in-memory stand-ins for the remote seams (feed service and
//! interactive authorization), credential file factories, and a temporary
//! directory helper.
//!
//! # Usage
//!
//! ```rust,ignore
//! use feedstat::test_utils::*;
//!
//! let dir = TestDir::new();
//! dir.create_file("client-secrets.json", &client_secrets_json("http://127.0.0.1:9/token"));
//! let service = FakeFeedService::new().with_account("111", Vec::new(), Vec::new());
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;

use crate::auth::{AccessToken, AuthorizationFlow, ClientConfig, SecretString, UserCredential};
use crate::core::feeds::{Datafeed, DatafeedStatus, FeedService};
use crate::error::{FeedstatError, Result};

/// RSA key used to sign assertions in tests.
pub const TEST_PRIVATE_KEY: &str = include_str!("../tests/fixtures/test-sa-key.pem");

// =============================================================================
// Feed Service Fake
// =============================================================================

/// In-memory [`FeedService`] keyed by merchant id.
///
/// Unknown merchants have no feeds. A merchant marked with
/// [`FakeFeedService::failing_on`] answers `datafeeds.list` with a 500.
#[derive(Debug, Clone, Default)]
pub struct FakeFeedService {
    accounts: HashMap<String, (Vec<Datafeed>, Vec<DatafeedStatus>)>,
    failing: Option<String>,
}

impl FakeFeedService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_account(
        mut self,
        merchant_id: &str,
        feeds: Vec<Datafeed>,
        statuses: Vec<DatafeedStatus>,
    ) -> Self {
        self.accounts.insert(merchant_id.to_string(), (feeds, statuses));
        self
    }

    #[must_use]
    pub fn failing_on(mut self, merchant_id: &str) -> Self {
        self.failing = Some(merchant_id.to_string());
        self
    }
}

impl FeedService for FakeFeedService {
    async fn list_datafeeds(&self, merchant_id: &str) -> Result<Vec<Datafeed>> {
        if self.failing.as_deref() == Some(merchant_id) {
            return Err(FeedstatError::Api {
                operation: "datafeeds.list".to_string(),
                status: Some(500),
                message: "backend error".to_string(),
            });
        }
        Ok(self
            .accounts
            .get(merchant_id)
            .map(|(feeds, _)| feeds.clone())
            .unwrap_or_default())
    }

    async fn list_datafeed_statuses(&self, merchant_id: &str) -> Result<Vec<DatafeedStatus>> {
        Ok(self
            .accounts
            .get(merchant_id)
            .map(|(_, statuses)| statuses.clone())
            .unwrap_or_default())
    }
}

// =============================================================================
// Authorization Flow Fake
// =============================================================================

/// [`AuthorizationFlow`] that succeeds immediately with a fixed refresh
/// token and counts how often it ran.
#[derive(Debug)]
pub struct ScriptedFlow {
    refresh_token: String,
    calls: AtomicUsize,
}

impl ScriptedFlow {
    #[must_use]
    pub fn new(refresh_token: &str) -> Self {
        Self {
            refresh_token: refresh_token.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AuthorizationFlow for ScriptedFlow {
    async fn authorize(&self, client: &ClientConfig, scopes: &[String]) -> Result<UserCredential> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(UserCredential {
            client: client.clone(),
            refresh_token: Some(SecretString::new(self.refresh_token.clone())),
            access_token: Some(AccessToken::new("ya29.scripted", Some(Duration::from_secs(3600)))),
            scopes: scopes.to_vec(),
        })
    }
}

// =============================================================================
// Credential File Factories
// =============================================================================

/// Service-account key file content whose tokens come from `token_uri`.
#[must_use]
pub fn service_account_json(token_uri: &str) -> String {
    json!({
        "type": "service_account",
        "project_id": "feedstat-test",
        "private_key_id": "test-key-1",
        "private_key": TEST_PRIVATE_KEY,
        "client_email": "reporter@feedstat-test.iam.gserviceaccount.com",
        "token_uri": token_uri,
    })
    .to_string()
}

/// `client-secrets.json` content for an installed-app client.
#[must_use]
pub fn client_secrets_json(token_uri: &str) -> String {
    json!({
        "installed": {
            "client_id": "123.apps.googleusercontent.com",
            "client_secret": "test-secret",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": token_uri,
            "redirect_uris": ["http://localhost"],
        }
    })
    .to_string()
}

/// Application-default credentials file for a signed-in user.
#[must_use]
pub fn user_adc_json(token_uri: &str) -> String {
    json!({
        "type": "authorized_user",
        "client_id": "123.apps.googleusercontent.com",
        "client_secret": "test-secret",
        "refresh_token": "1//adc-refresh",
        "token_uri": token_uri,
    })
    .to_string()
}

/// `merchant-ids.json` content for `(merchant_id, prop_name)` pairs.
#[must_use]
pub fn merchant_ids_json(accounts: &[(&str, &str)]) -> String {
    let entries: Vec<_> = accounts
        .iter()
        .map(|(id, name)| json!({ "merchantId": id, "propName": name }))
        .collect();
    serde_json::Value::Array(entries).to_string()
}

// =============================================================================
// Temp Directory Utilities
// =============================================================================

/// A temporary directory for tests with automatic cleanup.
///
/// ```rust,ignore
/// let dir = TestDir::new();
/// dir.create_file("content/merchant-ids.json", "[]");
/// assert!(dir.file_exists("content/merchant-ids.json"));
/// ```
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Write `content` to `name`, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.inner.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        let mut file = fs::File::create(&path).expect("Failed to create test file");
        file.write_all(content.as_bytes())
            .expect("Failed to write test file");
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.inner.path().join(name))
    }

    #[must_use]
    pub fn file_exists(&self, name: &str) -> bool {
        self.inner.path().join(name).exists()
    }

    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.inner.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests for Test Utilities
// =============================================================================
