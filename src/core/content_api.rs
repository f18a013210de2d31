//! Content API for Shopping client, the live [`FeedService`].

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use url::Url;

use super::feeds::{Datafeed, DatafeedStatus, FeedService};
use super::http::{DEFAULT_TIMEOUT, send_json};
use crate::auth::Credential;
use crate::error::{FeedstatError, Result};
use crate::storage::config::MAX_PAGE_SIZE;

const DATAFEEDS_LIST: &str = "datafeeds.list";
const DATAFEEDSTATUSES_LIST: &str = "datafeedstatuses.list";

/// One page of a `*.list` response.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
struct ListPage<T> {
    #[serde(default)]
    resources: Option<Vec<T>>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Authenticated Content API client.
///
/// The credential sits behind an async mutex so a token renewal happens at
/// most once per expiry even though requests borrow the client shared.
pub struct ContentApiClient {
    http: Client,
    base_url: Url,
    page_size: u32,
    timeout: Duration,
    credential: Mutex<Credential>,
}

impl ContentApiClient {
    /// # Errors
    ///
    /// `ConfigInvalid` when `base_url` is not an absolute http(s) URL.
    pub fn new(http: Client, base_url: &str, credential: Credential) -> Result<Self> {
        let invalid = |message: String| FeedstatError::ConfigInvalid {
            key: "api.base_url".to_string(),
            value: base_url.to_string(),
            message,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) URL".to_string()));
        }

        Ok(Self {
            http,
            base_url: parsed,
            page_size: MAX_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
            credential: Mutex::new(credential),
        })
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resource_url(&self, merchant_id: &str, resource: &str, page_token: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FeedstatError::Config(format!("cannot extend API base URL {}", self.base_url)))?
            .pop_if_empty()
            .push(merchant_id)
            .push(resource);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("maxResults", &self.page_size.to_string());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }

    async fn bearer_token(&self) -> Result<String> {
        self.credential
            .lock()
            .await
            .bearer_token(&self.http, self.timeout)
            .await
    }

    /// Every resource of a list operation, following `nextPageToken`.
    async fn list_all<T: DeserializeOwned + Send>(
        &self,
        merchant_id: &str,
        resource: &str,
        operation: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0_u32;

        loop {
            let url = self.resource_url(merchant_id, resource, page_token.as_deref())?;
            let token = self.bearer_token().await?;
            let page: ListPage<T> =
                send_json(self.http.get(url).bearer_auth(token), operation, self.timeout).await?;
            pages += 1;
            items.extend(page.resources.unwrap_or_default());

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(operation, merchant_id, pages, count = items.len(), "Listed resources");
        Ok(items)
    }
}

impl FeedService for ContentApiClient {
    async fn list_datafeeds(&self, merchant_id: &str) -> Result<Vec<Datafeed>> {
        self.list_all(merchant_id, "datafeeds", DATAFEEDS_LIST).await
    }

    async fn list_datafeed_statuses(&self, merchant_id: &str) -> Result<Vec<DatafeedStatus>> {
        self.list_all(merchant_id, "datafeedstatuses", DATAFEEDSTATUSES_LIST)
            .await
    }
}
