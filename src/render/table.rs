//! Grid table rendering.

use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

use crate::core::models::{Cell, ReportRow, ViewMode};

/// Render `rows` as a bordered grid under `view`'s headers.
///
/// Count columns are right-aligned.
#[must_use]
pub fn render_table(rows: &[ReportRow], view: ViewMode) -> String {
    let headers = view.headers();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().copied());

    let mut numeric = vec![false; headers.len()];
    for row in rows {
        let cells = row.cells(view);
        for (flag, cell) in numeric.iter_mut().zip(&cells) {
            *flag |= cell.is_numeric();
        }
        builder.push_record(cells.iter().map(Cell::text));
    }

    let mut table = builder.build();
    table.with(Style::ascii());
    for (index, _) in numeric.iter().enumerate().filter(|(_, n)| **n) {
        table.modify(Columns::one(index), Alignment::right());
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, valid: Option<u64>, total: Option<u64>) -> ReportRow {
        ReportRow {
            property: "Shop A".to_string(),
            feed_name: Some("Main".to_string()),
            feed_id: "2".to_string(),
            status: Some(status.to_string()),
            item_errors: valid.zip(total).map(|(v, t)| t - v),
            items_valid: valid,
            items_total: total,
        }
    }

    #[test]
    fn errors_view_has_five_columns() {
        let out = render_table(&[row("ERROR", Some(50), Some(55))], ViewMode::ListErrors);
        let header = out.lines().nth(1).unwrap();
        assert_eq!(header.matches('|').count(), 6);
        assert!(header.contains("Item Errors"));
        assert!(out.contains("ERROR"));
        assert!(out.contains(" 5 "));
    }

    #[test]
    fn full_view_renders_unknown_counts() {
        let out = render_table(&[row("SUCCESS", None, Some(10))], ViewMode::DisplayAll);
        assert!(out.contains("Total Items"));
        assert!(out.contains("N/A"));
        assert!(out.contains("10"));
    }

    #[test]
    fn empty_rows_still_render_headers() {
        let out = render_table(&[], ViewMode::ListErrors);
        assert!(out.contains("Feed Name"));
    }
}
