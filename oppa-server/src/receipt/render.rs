//! Document rendering to PDF bytes

use std::path::PathBuf;

use oppa_pdf::{
    Align, Font, LogoImage, PageSize, PdfBuilder, PdfResult, TextOptions, TextRun, text_width,
};

use super::document::{
    Alignment, Column, ColumnWidth, Content, DocumentDescription, Item, Orientation, Paragraph,
    Table, TextStyle,
};

/// Widest logo kept in memory, in pixels
const LOGO_MAX_PIXELS: u32 = 600;
/// Space under the logo in a header column
const LOGO_GAP: f32 = 5.0;
const CELL_PADDING: f32 = 4.0;
const MIN_STAR_WIDTH: f32 = 40.0;

/// Everything the renderer needs, fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub struct RenderingConfig {
    pub logo_path: Option<PathBuf>,
    /// Portrait page size; landscape documents swap it
    pub page_size: PageSize,
    pub margin: f32,
    pub base_font_size: f32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            logo_path: None,
            page_size: PageSize::A4,
            margin: 40.0,
            base_font_size: 10.0,
        }
    }
}

/// Renders [`DocumentDescription`]s with one configuration
///
/// The logo is decoded once here. A missing or unreadable logo is logged
/// and documents render without it.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    config: RenderingConfig,
    logo: Option<LogoImage>,
}

impl PdfRenderer {
    pub fn new(config: RenderingConfig) -> Self {
        let logo = config.logo_path.as_ref().and_then(|path| match path.to_str() {
            Some(p) => oppa_pdf::process_logo(p, LOGO_MAX_PIXELS),
            None => {
                tracing::warn!(path = ?path, "Logo path is not valid UTF-8, rendering without logo");
                None
            }
        });
        Self { config, logo }
    }

    pub fn config(&self) -> &RenderingConfig {
        &self.config
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    pub fn render(&self, doc: &DocumentDescription) -> PdfResult<Vec<u8>> {
        let page = match doc.page.orientation {
            Orientation::Portrait => self.config.page_size,
            Orientation::Landscape => self.config.page_size.landscape(),
        };
        let mut pdf = PdfBuilder::new(page, self.config.margin)?;
        if let Some(logo) = &self.logo {
            pdf = pdf.with_logo(logo.clone());
        }

        let base = TextStyle {
            font_size: Some(self.config.base_font_size),
            bold: Some(false),
            underline: Some(false),
            alignment: Some(Alignment::Left),
            line_height: Some(1.0),
            margin_top: Some(0.0),
        };
        let mut layout = Layout {
            pdf: &mut pdf,
            doc,
            base,
        };

        for block in &doc.blocks {
            match &block.content {
                Content::Paragraph(p) => layout.paragraph(p),
                Content::Columns { columns } => layout.columns(columns),
                Content::Table(table) => layout.table(table),
            }
            layout.pdf.advance(block.margin_bottom);
        }

        tracing::debug!(
            blocks = doc.blocks.len(),
            pages = pdf.page_count(),
            "Document rendered"
        );
        Ok(pdf.build())
    }
}

struct Layout<'a> {
    pdf: &'a mut PdfBuilder,
    doc: &'a DocumentDescription,
    base: TextStyle,
}

fn align(alignment: Option<Alignment>) -> Align {
    match alignment.unwrap_or_default() {
        Alignment::Left => Align::Left,
        Alignment::Center => Align::Center,
        Alignment::Right => Align::Right,
    }
}

fn options(style: &TextStyle) -> TextOptions {
    TextOptions {
        size: style.font_size.unwrap_or(10.0),
        align: align(style.alignment),
        line_height: style.line_height.unwrap_or(1.0),
        underline: style.underline.unwrap_or(false),
    }
}

fn runs(paragraph: &Paragraph, style: &TextStyle) -> Vec<TextRun> {
    let all_bold = style.bold.unwrap_or(false);
    paragraph
        .spans
        .iter()
        .map(|span| {
            if span.bold || all_bold {
                TextRun::bold(span.text.as_str())
            } else {
                TextRun::regular(span.text.as_str())
            }
        })
        .collect()
}

fn natural_width(runs: &[TextRun], size: f32) -> f32 {
    runs.iter().map(|r| text_width(&r.text, r.font, size)).sum()
}

/// Resolve column widths: fractions first, then auto, then stars share the rest
fn resolve_widths(columns: &[ColumnWidth], natural: &[f32], total: f32) -> Vec<f32> {
    let mut widths: Vec<f32> = columns
        .iter()
        .zip(natural)
        .map(|(column, natural)| match column {
            ColumnWidth::Fraction(f) => total * f.clamp(0.0, 1.0),
            ColumnWidth::Auto => natural.min(total),
            ColumnWidth::Star => 0.0,
        })
        .collect();

    let stars = columns.iter().filter(|s| matches!(s, ColumnWidth::Star)).count();
    let fixed: f32 = widths.iter().sum();
    let reserved = stars as f32 * MIN_STAR_WIDTH;
    if fixed + reserved > total && fixed > 0.0 {
        let scale = ((total - reserved).max(0.0)) / fixed;
        widths.iter_mut().for_each(|w| *w *= scale);
    }

    if stars > 0 {
        let share = ((total - widths.iter().sum::<f32>()) / stars as f32).max(0.0);
        for (w, column) in widths.iter_mut().zip(columns) {
            if matches!(column, ColumnWidth::Star) {
                *w = share;
            }
        }
    }
    widths
}

impl Layout<'_> {
    fn style_of(&self, paragraph: &Paragraph) -> TextStyle {
        self.doc.effective_style(paragraph, &self.base)
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        let style = self.style_of(paragraph);
        let runs = runs(paragraph, &style);
        let opts = options(&style);
        let width = self.pdf.content_width();
        let top = style.margin_top.unwrap_or(0.0);

        let height = self.pdf.measure_text(width, &runs, &opts);
        self.pdf.ensure_space(top + height);
        self.pdf.text_at(0.0, top, width, &runs, &opts);
        self.pdf.advance(top + height);
    }

    fn item_height(&self, item: &Item, width: f32) -> f32 {
        match item {
            Item::Logo { width: logo_width } if self.pdf.has_logo() => {
                self.pdf.logo_height(logo_width.min(width)) + LOGO_GAP
            }
            Item::Logo { .. } => 0.0,
            Item::Paragraph(p) => {
                let style = self.style_of(p);
                style.margin_top.unwrap_or(0.0)
                    + self.pdf.measure_text(width, &runs(p, &style), &options(&style))
            }
        }
    }

    fn item_natural_width(&self, item: &Item) -> f32 {
        match item {
            Item::Logo { width } if self.pdf.has_logo() => *width,
            Item::Logo { .. } => 0.0,
            Item::Paragraph(p) => {
                let style = self.style_of(p);
                natural_width(&runs(p, &style), options(&style).size)
            }
        }
    }

    fn columns(&mut self, columns: &[Column]) {
        let total = self.pdf.content_width();
        let column_widths: Vec<ColumnWidth> = columns.iter().map(|c| c.width).collect();
        let natural: Vec<f32> = columns
            .iter()
            .map(|c| {
                c.items
                    .iter()
                    .map(|i| self.item_natural_width(i))
                    .fold(0.0, f32::max)
            })
            .collect();
        let widths = resolve_widths(&column_widths, &natural, total);

        let height = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| c.items.iter().map(|i| self.item_height(i, *w)).sum::<f32>())
            .fold(0.0, f32::max);
        self.pdf.ensure_space(height);

        let mut x = 0.0;
        for (column, width) in columns.iter().zip(&widths) {
            let mut y = 0.0;
            for item in &column.items {
                match item {
                    Item::Logo { width: logo_width } => {
                        if self.pdf.has_logo() {
                            y += self.pdf.logo_at(x, y, logo_width.min(*width)) + LOGO_GAP;
                        }
                    }
                    Item::Paragraph(p) => {
                        let style = self.style_of(p);
                        let top = style.margin_top.unwrap_or(0.0);
                        y += top;
                        y += self.pdf.text_at(x, y, *width, &runs(p, &style), &options(&style));
                    }
                }
            }
            x += width;
        }
        self.pdf.advance(height);
    }

    fn table(&mut self, table: &Table) {
        let size = table.font_size;
        let total = self.pdf.content_width();
        let header_runs: Vec<Vec<TextRun>> = table
            .header
            .iter()
            .map(|h| vec![TextRun::bold(h.as_str())])
            .collect();

        let natural: Vec<f32> = (0..table.widths.len())
            .map(|i| {
                let header = header_runs
                    .get(i)
                    .map_or(0.0, |r| natural_width(r, size));
                table
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| text_width(cell, Font::Regular, size))
                    .fold(header, f32::max)
                    + 2.0 * CELL_PADDING
            })
            .collect();
        let widths = resolve_widths(&table.widths, &natural, total);
        let opts = TextOptions {
            size,
            ..Default::default()
        };

        let header_height = self.row_height(&header_runs, &widths, &opts);
        self.pdf.ensure_space(header_height * 2.0);
        self.table_row(&header_runs, &widths, &opts);

        for row in &table.rows {
            let cells: Vec<Vec<TextRun>> = row
                .iter()
                .map(|c| vec![TextRun::regular(c.as_str())])
                .collect();
            let height = self.row_height(&cells, &widths, &opts);
            if height > self.pdf.remaining_height() && self.pdf.cursor() > 0.0 {
                self.pdf.new_page();
                self.table_row(&header_runs, &widths, &opts);
            }
            self.table_row(&cells, &widths, &opts);
        }
    }

    fn row_height(&self, cells: &[Vec<TextRun>], widths: &[f32], opts: &TextOptions) -> f32 {
        cells
            .iter()
            .zip(widths)
            .map(|(runs, w)| self.pdf.measure_text(w - 2.0 * CELL_PADDING, runs, opts))
            .fold(0.0, f32::max)
            + 2.0 * CELL_PADDING
    }

    fn table_row(&mut self, cells: &[Vec<TextRun>], widths: &[f32], opts: &TextOptions) {
        let height = self.row_height(cells, widths, opts);
        let mut x = 0.0;
        for (i, width) in widths.iter().enumerate() {
            if let Some(runs) = cells.get(i) {
                self.pdf.text_at(
                    x + CELL_PADDING,
                    CELL_PADDING,
                    width - 2.0 * CELL_PADDING,
                    runs,
                    opts,
                );
            }
            self.pdf.rect(x, 0.0, *width, height);
            x += width;
        }
        self.pdf.advance(height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::builder::ReceiptDocumentBuilder;
    use crate::receipt::report::ReportDocumentBuilder;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::models::{
        CanonicalReceipt, Member, PaymentType, ReceiptSource, YearlySummaryReportRow,
    };

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn receipt_doc() -> DocumentDescription {
        let receipt = CanonicalReceipt {
            receipt_number: "RC-2024-001".into(),
            receipt_date: NaiveDate::from_ymd_opt(2024, 4, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            received_amount: Decimal::new(15000050, 2),
            payment_type: PaymentType::Cheque,
            cheque_number: Some("00234".into()),
            cheque_receive_on: None,
            bank_name: Some("HDFC".into()),
            payment_purpose: "Annual Payment".into(),
            source: ReceiptSource::Yearly,
            membership_id: 1,
        };
        let member = Member {
            membership_id: 1,
            member_name: "Ravi Kumar".into(),
            company_name: None,
            email: None,
        };
        ReceiptDocumentBuilder::default().build(&receipt, &member)
    }

    #[test]
    fn test_resolve_widths() {
        let column_widths = [ColumnWidth::Auto, ColumnWidth::Star, ColumnWidth::Star];
        let widths = resolve_widths(&column_widths, &[20.0, 0.0, 0.0], 220.0);
        assert_eq!(widths, vec![20.0, 100.0, 100.0]);

        let halves = resolve_widths(
            &[ColumnWidth::Fraction(0.5), ColumnWidth::Fraction(0.5)],
            &[0.0, 0.0],
            300.0,
        );
        assert_eq!(halves, vec![150.0, 150.0]);
    }

    #[test]
    fn test_resolve_widths_scales_wide_auto_columns() {
        let column_widths = [ColumnWidth::Auto, ColumnWidth::Auto, ColumnWidth::Star];
        let widths = resolve_widths(&column_widths, &[300.0, 300.0, 0.0], 400.0);
        let sum: f32 = widths.iter().sum();
        assert!((sum - 400.0).abs() < 0.01);
        assert!((widths[2] - MIN_STAR_WIDTH).abs() < 0.01);
    }

    #[test]
    fn test_render_receipt_without_logo() {
        let renderer = PdfRenderer::new(RenderingConfig {
            logo_path: Some("/nonexistent/oppa-logo.png".into()),
            ..Default::default()
        });
        assert!(!renderer.has_logo());

        let bytes = renderer.render(&receipt_doc()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(contains(&bytes, b"(RECEIPT VOUCHER) Tj"));
        assert!(contains(&bytes, b"(Rs. 150000.50) Tj"));
        assert!(contains(&bytes, b"(HDFC) Tj"));
        assert!(!contains(&bytes, b"/Subtype /Image"));
        assert_eq!(count(&bytes, b"/Type /Page "), 1);
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = PdfRenderer::new(RenderingConfig::default());
        let doc = receipt_doc();
        assert_eq!(renderer.render(&doc).unwrap(), renderer.render(&doc).unwrap());
    }

    #[test]
    fn test_render_with_logo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        image_fixture(&path);

        let renderer = PdfRenderer::new(RenderingConfig {
            logo_path: Some(path),
            ..Default::default()
        });
        assert!(renderer.has_logo());
        let bytes = renderer.render(&receipt_doc()).unwrap();
        assert!(contains(&bytes, b"/Im1 Do"));
    }

    #[test]
    fn test_report_repeats_header_on_each_page() {
        let rows: Vec<YearlySummaryReportRow> = (0..120)
            .map(|i| YearlySummaryReportRow {
                receipt_number: Some(format!("RC-{i:04}")),
                receipt_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                company_name: Some("Kumar Offset Works".into()),
                member_name: None,
                received_amount: Some(Decimal::new(500000, 2)),
                cheque_number: None,
                payment_year: Some(2024),
                payment_type: Some("Cash".into()),
            })
            .collect();
        let doc = ReportDocumentBuilder.build(&rows);
        let bytes = PdfRenderer::new(RenderingConfig::default())
            .render(&doc)
            .unwrap();

        let pages = count(&bytes, b"/Type /Page ");
        assert!(pages > 1);
        assert_eq!(count(&bytes, b"(Receipt No.) Tj"), pages);
        assert!(contains(&bytes, b"(Received Rs.) Tj"));
        assert!(contains(&bytes, b"(RC-0119) Tj"));
        // Landscape A4
        assert!(contains(&bytes, b"/MediaBox [0 0 841.89 595.28]"));
    }

    #[test]
    fn test_invalid_margin_is_an_error() {
        let renderer = PdfRenderer::new(RenderingConfig {
            margin: 500.0,
            ..Default::default()
        });
        assert!(renderer.render(&receipt_doc()).is_err());
    }

    fn image_fixture(path: &std::path::Path) {
        let mut img = image::RgbImage::new(4, 2);
        img.put_pixel(0, 0, image::Rgb([200, 30, 30]));
        img.save(path).unwrap();
    }
}
