//! Declarative document description
//!
//! Builders produce a [`DocumentDescription`]; the renderer turns it into
//! bytes. Nothing here knows about fonts files, paper sizes or streams.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Text attributes; unset fields inherit from the named style or defaults
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    /// Multiplier of the default line spacing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    /// Extra space above the text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<f32>,
}

impl TextStyle {
    pub fn size(font_size: f32) -> Self {
        Self {
            font_size: Some(font_size),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = Some(true);
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Fields set on `self` win over `base`
    pub fn over(&self, base: &TextStyle) -> TextStyle {
        TextStyle {
            font_size: self.font_size.or(base.font_size),
            bold: self.bold.or(base.bold),
            underline: self.underline.or(base.underline),
            alignment: self.alignment.or(base.alignment),
            line_height: self.line_height.or(base.line_height),
            margin_top: self.margin_top.or(base.margin_top),
        }
    }
}

/// A run of text within a paragraph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    pub spans: Vec<Span>,
    /// Name of an entry in [`DocumentDescription::styles`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
    pub style: TextStyle,
}

impl Paragraph {
    pub fn new(spans: Vec<Span>, style: TextStyle) -> Self {
        Self {
            spans,
            style_name: None,
            style,
        }
    }

    pub fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Self::new(vec![Span::plain(text)], style)
    }

    pub fn named(mut self, style_name: &str) -> Self {
        self.style_name = Some(style_name.to_string());
        self
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnWidth {
    /// Fit the content
    Auto,
    /// Share of the space left after fixed and auto columns
    Star,
    /// Fraction of the full width (0.0 - 1.0)
    Fraction(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    /// The letterhead logo, drawn `width` points wide
    Logo { width: f32 },
    Paragraph(Paragraph),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub width: ColumnWidth,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub widths: Vec<ColumnWidth>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Paragraph(Paragraph),
    Columns { columns: Vec<Column> },
    Table(Table),
}

impl Content {
    /// All text in reading order, spans concatenated, items separated by newlines
    pub fn plain_text(&self) -> String {
        match self {
            Content::Paragraph(p) => p.plain_text(),
            Content::Columns { columns } => columns
                .iter()
                .flat_map(|c| c.items.iter())
                .filter_map(|item| match item {
                    Item::Paragraph(p) => Some(p.plain_text()),
                    Item::Logo { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Content::Table(t) => std::iter::once(&t.header)
                .chain(t.rows.iter())
                .map(|row| row.join(" | "))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// What a block is, independent of its layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    OrganizationHeader,
    Title,
    Metadata,
    Narrative,
    ChequeDetails,
    AmountLine,
    SignatureLine,
    Signatory,
    SummaryTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub content: Content,
    /// Space below the block in points
    pub margin_bottom: f32,
}

impl Block {
    pub fn new(kind: BlockKind, content: Content, margin_bottom: f32) -> Self {
        Self {
            kind,
            content,
            margin_bottom,
        }
    }

    pub fn plain_text(&self) -> String {
        self.content.plain_text()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PageSetup {
    pub orientation: Orientation,
}

/// A complete document ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentDescription {
    pub page: PageSetup,
    pub blocks: Vec<Block>,
    pub styles: BTreeMap<String, TextStyle>,
}

impl DocumentDescription {
    pub fn block(&self, kind: BlockKind) -> Option<&Block> {
        self.blocks.iter().find(|b| b.kind == kind)
    }

    pub fn has_block(&self, kind: BlockKind) -> bool {
        self.block(kind).is_some()
    }

    pub fn kinds(&self) -> Vec<BlockKind> {
        self.blocks.iter().map(|b| b.kind).collect()
    }

    /// Resolve a paragraph's effective style: inline, then named, then `base`
    pub fn effective_style(&self, paragraph: &Paragraph, base: &TextStyle) -> TextStyle {
        let named = paragraph
            .style_name
            .as_deref()
            .and_then(|n| self.styles.get(n))
            .map_or(*base, |s| s.over(base));
        paragraph.style.over(&named)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_precedence() {
        let mut styles = BTreeMap::new();
        styles.insert(
            "header".to_string(),
            TextStyle {
                font_size: Some(14.0),
                underline: Some(true),
                ..Default::default()
            },
        );
        let doc = DocumentDescription {
            page: PageSetup::default(),
            blocks: vec![],
            styles,
        };
        let base = TextStyle {
            font_size: Some(10.0),
            bold: Some(false),
            ..Default::default()
        };
        let p = Paragraph::text("x", TextStyle::size(18.0)).named("header");

        let s = doc.effective_style(&p, &base);
        assert_eq!(s.font_size, Some(18.0));
        assert_eq!(s.underline, Some(true));
        assert_eq!(s.bold, Some(false));

        let unknown = Paragraph::text("x", TextStyle::default()).named("missing");
        assert_eq!(doc.effective_style(&unknown, &base), base);
    }

    #[test]
    fn test_plain_text() {
        let p = Paragraph::new(
            vec![Span::plain("No.: "), Span::bold("RC-1")],
            TextStyle::default(),
        );
        assert_eq!(p.plain_text(), "No.: RC-1");

        let table = Content::Table(Table {
            widths: vec![ColumnWidth::Auto, ColumnWidth::Star],
            header: vec!["A".into(), "B".into()],
            rows: vec![vec!["1".into(), "-".into()]],
            font_size: 8.0,
        });
        assert_eq!(table.plain_text(), "A | B\n1 | -");
    }
}
