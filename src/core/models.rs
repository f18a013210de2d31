//! Core data models for the feed report.
//!
//! Field semantics:
//! - counts that are missing or unparseable are `None`, never zero
//! - an item-error count exists only when both counts are known and
//!   `total >= valid`

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FeedstatError, Result};

/// Processing status the Content API reports for a clean ingestion.
pub const SUCCESS_STATUS: &str = "success";

/// Text shown wherever a value is unknown.
pub const UNKNOWN_CELL: &str = "N/A";

// =============================================================================
// Account Entry
// =============================================================================

/// One configured merchant account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    #[serde(rename = "merchantId", deserialize_with = "string_or_number")]
    pub merchant_id: String,
    #[serde(rename = "propName")]
    pub prop_name: String,
}

impl AccountEntry {
    #[must_use]
    pub fn new(merchant_id: impl Into<String>, prop_name: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            prop_name: prop_name.into(),
        }
    }
}

/// Accepts an identifier written either as a JSON string or a JSON number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

// =============================================================================
// Feed Record
// =============================================================================

/// A feed definition joined with its (possibly absent) processing status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    pub feed_id: String,
    pub name: Option<String>,
    pub processing_status: Option<String>,
    pub items_valid: Option<u64>,
    pub items_total: Option<u64>,
}

impl FeedRecord {
    /// A record with only the definition fields populated.
    #[must_use]
    pub fn from_definition(feed_id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            feed_id: feed_id.into(),
            name,
            processing_status: None,
            items_valid: None,
            items_total: None,
        }
    }

    /// `total - valid`, or `None` when either count is unknown or the
    /// difference would be negative.
    #[must_use]
    pub fn item_errors(&self) -> Option<u64> {
        match (self.items_valid, self.items_total) {
            (Some(valid), Some(total)) => total.checked_sub(valid),
            _ => None,
        }
    }
}

// =============================================================================
// View Mode
// =============================================================================

/// Which report to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Only feeds that failed or dropped items, printed as a table.
    ListErrors,
    /// Every feed, written to a CSV file.
    SaveFile,
    /// Every feed, shown in a pager.
    DisplayAll,
}

const ERROR_HEADERS: &[&str] = &["Property", "Feed Name", "Feed ID", "Status", "Item Errors"];
const FULL_HEADERS: &[&str] = &[
    "Property",
    "Feed Name",
    "Feed ID",
    "Status",
    "Item Errors",
    "Valid Items",
    "Total Items",
];

impl ViewMode {
    pub const ALL: [Self; 3] = [Self::ListErrors, Self::SaveFile, Self::DisplayAll];

    /// Parse a view name such as `list-errors`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidView` for anything other than the three view names.
    pub fn from_arg(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "list-errors" => Ok(Self::ListErrors),
            "save-file" => Ok(Self::SaveFile),
            "display-all" => Ok(Self::DisplayAll),
            _ => Err(FeedstatError::InvalidView(s.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListErrors => "list-errors",
            Self::SaveFile => "save-file",
            Self::DisplayAll => "display-all",
        }
    }

    /// Menu label for interactive selection.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ListErrors => "List feeds with errors",
            Self::SaveFile => "Save a report of all feeds to a CSV file",
            Self::DisplayAll => "Display a report of all feeds",
        }
    }

    /// Column headers for this view.
    #[must_use]
    pub const fn headers(self) -> &'static [&'static str] {
        match self {
            Self::ListErrors => ERROR_HEADERS,
            Self::SaveFile | Self::DisplayAll => FULL_HEADERS,
        }
    }

    /// Whether the view reports every feed rather than only problem feeds.
    #[must_use]
    pub const fn is_full(self) -> bool {
        !matches!(self, Self::ListErrors)
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Report Row
// =============================================================================

/// One rendered cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Count(Option<u64>),
}

impl Cell {
    /// Display text, with unknown counts as `N/A`.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Count(Some(n)) => n.to_string(),
            Self::Count(None) => UNKNOWN_CELL.to_string(),
        }
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Count(_))
    }
}

/// A feed record flattened together with its owning account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub property: String,
    pub feed_name: Option<String>,
    pub feed_id: String,
    /// Upper-cased processing status.
    pub status: Option<String>,
    pub item_errors: Option<u64>,
    pub items_valid: Option<u64>,
    pub items_total: Option<u64>,
}

impl ReportRow {
    #[must_use]
    pub fn new(account: &AccountEntry, record: &FeedRecord) -> Self {
        Self {
            property: account.prop_name.clone(),
            feed_name: record.name.clone(),
            feed_id: record.feed_id.clone(),
            status: record.processing_status.as_deref().map(str::to_uppercase),
            item_errors: record.item_errors(),
            items_valid: record.items_valid,
            items_total: record.items_total,
        }
    }

    /// Whether the row reports a problem: a status other than success, or
    /// at least one dropped item. Unknown counts never count as a problem.
    #[must_use]
    pub fn has_problem(&self) -> bool {
        let succeeded = self
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(SUCCESS_STATUS));
        !succeeded || self.item_errors.is_some_and(|n| n > 0)
    }

    /// Cells in header order for `view`.
    #[must_use]
    pub fn cells(&self, view: ViewMode) -> Vec<Cell> {
        let text = |v: Option<&str>| Cell::Text(v.unwrap_or(UNKNOWN_CELL).to_string());
        let mut cells = vec![
            Cell::Text(self.property.clone()),
            text(self.feed_name.as_deref()),
            Cell::Text(self.feed_id.clone()),
            text(self.status.as_deref()),
        ];
        match view {
            ViewMode::ListErrors => cells.push(Cell::Count(self.item_errors)),
            ViewMode::DisplayAll => cells.extend([
                Cell::Count(self.item_errors),
                Cell::Count(self.items_valid),
                Cell::Count(self.items_total),
            ]),
            ViewMode::SaveFile => cells.extend(
                [self.item_errors, self.items_valid, self.items_total]
                    .into_iter()
                    .map(|n| Cell::Text(Cell::Count(n).text())),
            ),
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: Option<&str>, valid: Option<u64>, total: Option<u64>) -> FeedRecord {
        FeedRecord {
            feed_id: "101".to_string(),
            name: Some("Primary feed".to_string()),
            processing_status: status.map(String::from),
            items_valid: valid,
            items_total: total,
        }
    }

    #[test]
    fn item_errors_requires_both_counts() {
        assert_eq!(record(None, Some(50), Some(55)).item_errors(), Some(5));
        assert_eq!(record(None, None, Some(55)).item_errors(), None);
        assert_eq!(record(None, Some(50), None).item_errors(), None);
    }

    #[test]
    fn item_errors_never_negative() {
        assert_eq!(record(None, Some(60), Some(55)).item_errors(), None);
    }

    #[test]
    fn view_mode_parsing() {
        assert_eq!(ViewMode::from_arg("list-errors").unwrap(), ViewMode::ListErrors);
        assert_eq!(ViewMode::from_arg("SAVE_FILE").unwrap(), ViewMode::SaveFile);
        assert_eq!(ViewMode::from_arg("display-all").unwrap(), ViewMode::DisplayAll);
        assert!(matches!(
            ViewMode::from_arg("everything"),
            Err(FeedstatError::InvalidView(v)) if v == "everything"
        ));
    }

    #[test]
    fn header_counts() {
        assert_eq!(ViewMode::ListErrors.headers().len(), 5);
        assert_eq!(ViewMode::SaveFile.headers().len(), 7);
        assert_eq!(ViewMode::DisplayAll.headers().len(), 7);
    }

    #[test]
    fn row_uppercases_status() {
        let account = AccountEntry::new("1", "Store");
        let row = ReportRow::new(&account, &record(Some("failure"), Some(1), Some(1)));
        assert_eq!(row.status.as_deref(), Some("FAILURE"));
    }

    #[test]
    fn problem_detection() {
        let account = AccountEntry::new("1", "Store");
        let clean = ReportRow::new(&account, &record(Some("success"), Some(100), Some(100)));
        assert!(!clean.has_problem());

        let dropped = ReportRow::new(&account, &record(Some("success"), Some(90), Some(100)));
        assert!(dropped.has_problem());

        let unknown_counts = ReportRow::new(&account, &record(Some("success"), None, Some(100)));
        assert!(!unknown_counts.has_problem());

        let no_status = ReportRow::new(&account, &record(None, None, None));
        assert!(no_status.has_problem());
    }

    #[test]
    fn cells_follow_view() {
        let account = AccountEntry::new("1", "Store");
        let row = ReportRow::new(&account, &record(Some("success"), None, Some(10)));

        let errors = row.cells(ViewMode::ListErrors);
        assert_eq!(errors.len(), 5);
        assert_eq!(errors[4], Cell::Count(None));

        let display = row.cells(ViewMode::DisplayAll);
        assert_eq!(display[6], Cell::Count(Some(10)));

        let save = row.cells(ViewMode::SaveFile);
        assert_eq!(save[4], Cell::Text("N/A".to_string()));
        assert_eq!(save[6], Cell::Text("10".to_string()));
        assert!(save.iter().all(|c| !c.is_numeric()));
    }

    #[test]
    fn account_entry_accepts_numeric_id() {
        let entry: AccountEntry =
            serde_json::from_str(r#"{"merchantId": 42, "propName": "Store"}"#).unwrap();
        assert_eq!(entry.merchant_id, "42");
    }
}
