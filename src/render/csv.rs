//! CSV report output.

use std::io::Write;
use std::path::Path;

use crate::core::models::{Cell, ReportRow, ViewMode};
use crate::error::Result;

/// Write header row and rows as CSV to `writer`.
///
/// # Errors
///
/// CSV and I/O failures.
pub fn write_rows<W: Write>(writer: W, rows: &[ReportRow], view: ViewMode) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(view.headers())?;
    for row in rows {
        out.write_record(row.cells(view).iter().map(Cell::text))?;
    }
    out.flush()?;
    Ok(())
}

/// Write the report to `path`, replacing any existing file.
///
/// # Errors
///
/// CSV and I/O failures.
pub fn write_csv(path: &Path, rows: &[ReportRow], view: ViewMode) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_rows(file, rows, view)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "Wrote CSV report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDir;

    fn row() -> ReportRow {
        ReportRow {
            property: "Shop, Inc".to_string(),
            feed_name: None,
            feed_id: "7".to_string(),
            status: Some("SUCCESS".to_string()),
            item_errors: None,
            items_valid: None,
            items_total: Some(3),
        }
    }

    #[test]
    fn header_then_rows() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &[row()], ViewMode::SaveFile).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("Property,Feed Name,Feed ID,Status,Item Errors,Valid Items,Total Items")
        );
        assert_eq!(lines.next(), Some("\"Shop, Inc\",N/A,7,SUCCESS,N/A,N/A,3"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn writes_file() {
        let dir = TestDir::new();
        let path = dir.path().join("report.csv");
        write_csv(&path, &[row(), row()], ViewMode::SaveFile).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
