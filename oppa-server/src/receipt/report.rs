//! Yearly payment summary report

use std::collections::BTreeMap;

use shared::models::YearlySummaryReportRow;
use shared::util::or_dash;

use super::builder::format_date;
use super::document::{
    Block, BlockKind, ColumnWidth, Content, DocumentDescription, Orientation, PageSetup,
    Paragraph, Table, TextStyle,
};
use super::words::Amount;

pub const REPORT_TITLE: &str = "Yearly Payment Summary Report";
const STYLE_HEADER: &str = "header";

const COLUMNS: [(&str, ColumnWidth); 8] = [
    ("Receipt No.", ColumnWidth::Auto),
    ("Date", ColumnWidth::Auto),
    ("Company", ColumnWidth::Star),
    ("Member", ColumnWidth::Star),
    ("Received ₹", ColumnWidth::Auto),
    ("Cheque No", ColumnWidth::Auto),
    ("Year", ColumnWidth::Auto),
    ("Type", ColumnWidth::Auto),
];

/// Lays out the summary table; rows are expected newest first
#[derive(Debug, Clone, Default)]
pub struct ReportDocumentBuilder;

impl ReportDocumentBuilder {
    pub fn build(&self, rows: &[YearlySummaryReportRow]) -> DocumentDescription {
        let table = Table {
            widths: COLUMNS.iter().map(|(_, w)| *w).collect(),
            header: COLUMNS.iter().map(|(h, _)| h.to_string()).collect(),
            rows: rows.iter().map(report_cells).collect(),
            font_size: 9.0,
        };

        DocumentDescription {
            page: PageSetup {
                orientation: Orientation::Landscape,
            },
            blocks: vec![
                Block::new(
                    BlockKind::Title,
                    Content::Paragraph(
                        Paragraph::text(REPORT_TITLE, TextStyle::default()).named(STYLE_HEADER),
                    ),
                    10.0,
                ),
                Block::new(BlockKind::SummaryTable, Content::Table(table), 0.0),
            ],
            styles: BTreeMap::from([(STYLE_HEADER.to_string(), TextStyle::size(18.0).bold())]),
        }
    }
}

fn report_cells(row: &YearlySummaryReportRow) -> Vec<String> {
    let date = row.receipt_date.map(format_date);
    let amount = row.received_amount.map(|value| match Amount::new(value) {
        Ok(a) => a.to_string(),
        Err(_) => value.to_string(),
    });
    let year = row.payment_year.map(|y| y.to_string());
    vec![
        or_dash(row.receipt_number.as_deref()),
        or_dash(date.as_deref()),
        or_dash(row.company_name.as_deref()),
        or_dash(row.member_name.as_deref()),
        or_dash(amount.as_deref()),
        or_dash(row.cheque_number.as_deref()),
        or_dash(year.as_deref()),
        or_dash(row.payment_type.as_deref()),
    ]
}
