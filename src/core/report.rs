//! Report aggregation across merchant accounts.

use std::time::Instant;

use super::feeds::{FeedService, join_feeds};
use super::models::{AccountEntry, FeedRecord, ReportRow, ViewMode};
use crate::error::Result;

/// Join every account's feeds and flatten them into report rows.
///
/// Accounts are processed one at a time, in input order. Within an account,
/// rows follow feed definition order.
///
/// # Errors
///
/// Stops at the first failing remote call.
pub async fn aggregate<S: FeedService>(
    service: &S,
    accounts: &[AccountEntry],
    view: ViewMode,
) -> Result<Vec<ReportRow>> {
    let mut rows = Vec::new();
    for account in accounts {
        let started = Instant::now();
        let records = join_feeds(service, &account.merchant_id).await?;
        tracing::info!(
            merchant_id = %account.merchant_id,
            property = %account.prop_name,
            feeds = records.len(),
            elapsed = ?started.elapsed(),
            "Joined feeds"
        );
        rows.extend(select_rows(account, &records, view));
    }
    Ok(rows)
}

/// Rows of one account that belong in `view`.
#[must_use]
pub fn select_rows(account: &AccountEntry, records: &[FeedRecord], view: ViewMode) -> Vec<ReportRow> {
    records
        .iter()
        .map(|record| ReportRow::new(account, record))
        .filter(|row| view.is_full() || row.has_problem())
        .collect()
}
