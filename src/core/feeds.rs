//! Feed definitions, feed statuses, and the per-account join.

use std::collections::HashMap;
use std::future::Future;

use serde::Deserialize;
use serde_json::Value;

use super::models::{FeedRecord, string_or_number};
use crate::error::Result;

/// A feed definition as returned by `datafeeds.list`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Datafeed {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A feed processing status as returned by `datafeedstatuses.list`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatafeedStatus {
    #[serde(deserialize_with = "string_or_number")]
    pub datafeed_id: String,
    #[serde(default)]
    pub processing_status: Option<String>,
    #[serde(default)]
    pub items_valid: Option<Value>,
    #[serde(default)]
    pub items_total: Option<Value>,
}

/// The two list operations the report needs from the remote feed service.
pub trait FeedService {
    /// All feed definitions of one merchant, in service order.
    fn list_datafeeds(
        &self,
        merchant_id: &str,
    ) -> impl Future<Output = Result<Vec<Datafeed>>> + Send;

    /// All feed processing statuses of one merchant.
    fn list_datafeed_statuses(
        &self,
        merchant_id: &str,
    ) -> impl Future<Output = Result<Vec<DatafeedStatus>>> + Send;
}

/// Parse an item count that may arrive as a JSON string or number.
///
/// Anything that is not a non-negative integer is unknown.
#[must_use]
pub fn parse_count(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Join one merchant's feed definitions with their statuses.
///
/// Records come back in definition order. Statuses for feeds with no
/// definition are dropped; feeds with no status keep unknown status fields.
///
/// # Errors
///
/// Propagates failures from either list call.
pub async fn join_feeds<S: FeedService>(service: &S, merchant_id: &str) -> Result<Vec<FeedRecord>> {
    let definitions = service.list_datafeeds(merchant_id).await?;
    let statuses = service.list_datafeed_statuses(merchant_id).await?;
    Ok(join(definitions, statuses))
}

fn join(definitions: Vec<Datafeed>, statuses: Vec<DatafeedStatus>) -> Vec<FeedRecord> {
    let mut records: Vec<FeedRecord> = Vec::with_capacity(definitions.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(definitions.len());

    for feed in definitions {
        let record = FeedRecord::from_definition(feed.id.clone(), feed.name);
        match index.get(&feed.id) {
            Some(&pos) => records[pos] = record,
            None => {
                index.insert(feed.id, records.len());
                records.push(record);
            }
        }
    }

    for status in statuses {
        let Some(&pos) = index.get(&status.datafeed_id) else {
            tracing::debug!(feed_id = %status.datafeed_id, "Dropping status for unknown feed");
            continue;
        };
        let record = &mut records[pos];
        record.processing_status = status.processing_status;
        record.items_valid = parse_count(status.items_valid.as_ref());
        record.items_total = parse_count(status.items_total.as_ref());
    }

    records
}
