//! PDF page builder
//!
//! Lays out wrapped text, rules and a logo top-down on fixed-size pages
//! and serializes them as a PDF 1.4 file. Positions passed to the drawing
//! methods are offsets in points relative to the left margin and the
//! current cursor; the builder converts them to PDF user space.

use crate::encoding::{encode_win_ansi, escape_literal};
use crate::error::{PdfError, PdfResult};
use crate::fonts::{Font, text_width};
use crate::logo::LogoImage;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4: Self = Self {
        width: 595.28,
        height: 841.89,
    };

    pub fn landscape(self) -> Self {
        Self {
            width: self.height.max(self.width),
            height: self.height.min(self.width),
        }
    }
}

/// Horizontal alignment of a text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// A run of text sharing one face
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font: Font,
}

impl TextRun {
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: Font::Regular,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: Font::Bold,
        }
    }
}

/// How a text block is set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    pub size: f32,
    pub align: Align,
    /// Multiplier applied to the default 1.2 leading
    pub line_height: f32,
    pub underline: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 10.0,
            align: Align::Left,
            line_height: 1.0,
            underline: false,
        }
    }
}

impl TextOptions {
    fn leading(&self) -> f32 {
        self.size * 1.2 * self.line_height
    }
}

/// One word (with its trailing spaces) placed on a line
#[derive(Debug)]
struct Piece<'a> {
    text: &'a str,
    font: Font,
    width: f32,
}

#[derive(Debug, Default)]
struct Line<'a> {
    pieces: Vec<Piece<'a>>,
    /// Width without trailing spaces
    visible: f32,
    /// Width including trailing spaces
    full: f32,
}

/// Slack for accumulated rounding when a line exactly fills its width
const WRAP_TOLERANCE: f32 = 0.01;

/// Greedy word wrap of `runs` into lines no wider than `max_width`
///
/// A single word wider than the line is kept whole and overflows.
fn layout_lines(runs: &[TextRun], size: f32, max_width: f32) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut line = Line::default();

    for run in runs {
        for word in run.text.split_inclusive(' ') {
            let trimmed = word.trim_end_matches(' ');
            let visible_width = text_width(trimmed, run.font, size);
            let width = text_width(word, run.font, size);

            if !line.pieces.is_empty() && line.full + visible_width > max_width + WRAP_TOLERANCE {
                lines.push(std::mem::take(&mut line));
                if trimmed.is_empty() {
                    continue;
                }
            }
            if !trimmed.is_empty() {
                line.visible = line.full + visible_width;
            }
            line.full += width;
            line.pieces.push(Piece {
                text: word,
                font: run.font,
                width,
            });
        }
    }

    if !line.pieces.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Format a coordinate for a content stream
fn num(v: f32) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// PDF document builder
///
/// # Example
///
/// ```
/// use oppa_pdf::{PageSize, PdfBuilder, TextOptions, TextRun};
///
/// let mut pdf = PdfBuilder::new(PageSize::A4, 40.0).unwrap();
/// let w = pdf.content_width();
/// let h = pdf.text(0.0, w, &[TextRun::regular("Hello")], &TextOptions::default());
/// pdf.advance(h);
/// let bytes = pdf.build();
/// assert!(bytes.ends_with(b"%%EOF\n"));
/// ```
pub struct PdfBuilder {
    page: PageSize,
    margin: f32,
    pages: Vec<Vec<u8>>,
    current: Vec<u8>,
    /// Distance below the top margin
    cursor: f32,
    logo: Option<LogoImage>,
    logo_drawn: bool,
}

impl PdfBuilder {
    /// Create a builder; fails if the margins leave no content area
    pub fn new(page: PageSize, margin: f32) -> PdfResult<Self> {
        if margin < 0.0 || page.width - 2.0 * margin <= 0.0 || page.height - 2.0 * margin <= 0.0 {
            return Err(PdfError::InvalidConfig(format!(
                "margin {margin} leaves no room on a {}x{} page",
                page.width, page.height
            )));
        }
        Ok(Self {
            page,
            margin,
            pages: Vec::new(),
            current: Vec::with_capacity(4096),
            cursor: 0.0,
            logo: None,
            logo_drawn: false,
        })
    }

    /// Attach the logo image drawn by [`PdfBuilder::logo_at`]
    pub fn with_logo(mut self, logo: LogoImage) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    pub fn content_width(&self) -> f32 {
        self.page.width - 2.0 * self.margin
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Space left on the current page below the cursor
    pub fn remaining_height(&self) -> f32 {
        self.page.height - 2.0 * self.margin - self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.pages.len() + 1
    }

    // === Flow ===

    /// Move the cursor down
    pub fn advance(&mut self, dy: f32) -> &mut Self {
        self.cursor += dy;
        self
    }

    /// Start a new page if fewer than `height` points remain
    ///
    /// A block taller than a whole page is placed at the top of a fresh
    /// page and left to overflow.
    pub fn ensure_space(&mut self, height: f32) -> &mut Self {
        if height > self.remaining_height() && self.cursor > 0.0 {
            self.new_page();
        }
        self
    }

    pub fn new_page(&mut self) -> &mut Self {
        let finished = std::mem::replace(&mut self.current, Vec::with_capacity(4096));
        self.pages.push(finished);
        self.cursor = 0.0;
        self
    }

    // === Text ===

    /// Height `runs` would occupy when wrapped to `width`
    pub fn measure_text(&self, width: f32, runs: &[TextRun], opts: &TextOptions) -> f32 {
        layout_lines(runs, opts.size, width).len() as f32 * opts.leading()
    }

    /// Draw `runs` wrapped within `[x, x + width]` starting at `y` below
    /// the cursor. Returns the height used; the cursor does not move.
    pub fn text_at(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        runs: &[TextRun],
        opts: &TextOptions,
    ) -> f32 {
        let lines = layout_lines(runs, opts.size, width);
        let leading = opts.leading();
        let left = self.margin + x;

        for (i, line) in lines.iter().enumerate() {
            let line_top = self.margin + self.cursor + y + i as f32 * leading;
            let baseline = self.page.height - (line_top + (leading - opts.size) / 2.0 + opts.size * 0.8);
            let start = match opts.align {
                Align::Left => left,
                Align::Center => left + (width - line.visible) / 2.0,
                Align::Right => left + width - line.visible,
            };

            let mut pen = start;
            let mut group_start = 0;
            while group_start < line.pieces.len() {
                let font = line.pieces[group_start].font;
                let group_end = line.pieces[group_start..]
                    .iter()
                    .position(|p| p.font != font)
                    .map_or(line.pieces.len(), |n| group_start + n);
                let group = &line.pieces[group_start..group_end];
                let text: String = group.iter().map(|p| p.text).collect();
                self.show_text(pen, baseline, font, opts.size, &text);
                pen += group.iter().map(|p| p.width).sum::<f32>();
                group_start = group_end;
            }

            if opts.underline && line.visible > 0.0 {
                let uy = baseline - opts.size * 0.12;
                self.op(&format!(
                    "{} w {} {} m {} {} l S\n",
                    num((opts.size / 20.0).max(0.5)),
                    num(start),
                    num(uy),
                    num(start + line.visible),
                    num(uy)
                ));
            }
        }

        lines.len() as f32 * leading
    }

    /// [`PdfBuilder::text_at`] at the cursor
    pub fn text(&mut self, x: f32, width: f32, runs: &[TextRun], opts: &TextOptions) -> f32 {
        self.text_at(x, 0.0, width, runs, opts)
    }

    fn show_text(&mut self, x: f32, baseline: f32, font: Font, size: f32, text: &str) {
        self.op(&format!(
            "BT /{} {} Tf {} {} Td (",
            font.resource_name(),
            num(size),
            num(x),
            num(baseline)
        ));
        let escaped = escape_literal(&encode_win_ansi(text));
        self.current.extend_from_slice(&escaped);
        self.op(") Tj ET\n");
    }

    // === Graphics ===

    /// Height of the logo when drawn `width` points wide (0 without a logo)
    pub fn logo_height(&self, width: f32) -> f32 {
        self.logo.as_ref().map_or(0.0, |l| l.scaled_height(width))
    }

    /// Draw the logo `width` points wide with its top edge `y` points below
    /// the cursor; returns the height used
    pub fn logo_at(&mut self, x: f32, y: f32, width: f32) -> f32 {
        let height = self.logo_height(width);
        if height <= 0.0 {
            return 0.0;
        }
        let bottom = self.page.height - (self.margin + self.cursor + y + height);
        self.op(&format!(
            "q {} 0 0 {} {} {} cm /Im1 Do Q\n",
            num(width),
            num(height),
            num(self.margin + x),
            num(bottom)
        ));
        self.logo_drawn = true;
        height
    }

    /// Stroked rectangle whose top-left corner is `(x, y)` below the cursor
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        let bottom = self.page.height - (self.margin + self.cursor + y + height);
        self.op(&format!(
            "0.5 w {} {} {} {} re S\n",
            num(self.margin + x),
            num(bottom),
            num(width),
            num(height)
        ));
        self
    }

    fn op(&mut self, s: &str) {
        self.current.extend_from_slice(s.as_bytes());
    }

    // === Output ===

    /// Serialize all pages into a complete PDF file
    pub fn build(mut self) -> Vec<u8> {
        let last = std::mem::take(&mut self.current);
        self.pages.push(last);

        let mut objects: Vec<Vec<u8>> = Vec::new();
        // 1: catalog, 2: page tree, 3-4: fonts, then optional image, then pages
        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
        objects.push(Vec::new());
        for font in [Font::Regular, Font::Bold] {
            objects.push(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_font()
                )
                .into_bytes(),
            );
        }

        let image_ref = match (&self.logo, self.logo_drawn) {
            (Some(logo), true) => {
                let mut obj = format!(
                    "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Length {} >>\nstream\n",
                    logo.width(),
                    logo.height(),
                    logo.samples().len()
                )
                .into_bytes();
                obj.extend_from_slice(logo.samples());
                obj.extend_from_slice(b"\nendstream");
                objects.push(obj);
                Some(objects.len())
            }
            _ => None,
        };

        let xobjects = image_ref
            .map(|n| format!(" /XObject << /Im1 {n} 0 R >>"))
            .unwrap_or_default();
        let mut kids = Vec::with_capacity(self.pages.len());
        for content in &self.pages {
            let page_no = objects.len() + 1;
            kids.push(format!("{page_no} 0 R"));
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 3 0 R /F2 4 0 R >>{} >> /Contents {} 0 R >>",
                    num(self.page.width),
                    num(self.page.height),
                    xobjects,
                    page_no + 1
                )
                .into_bytes(),
            );
            let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
            stream.extend_from_slice(content);
            stream.extend_from_slice(b"\nendstream");
            objects.push(stream);
        }
        objects[1] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            kids.len()
        )
        .into_bytes();

        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );
        out
    }
}
