//! Receipt voucher layout

use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::models::{CanonicalReceipt, Member};
use shared::util::or_dash;

use super::document::{
    Alignment, Block, BlockKind, Column, ColumnWidth, Content, DocumentDescription, Item,
    PageSetup, Paragraph, Span, TextStyle,
};
use super::words::Amount;

pub const STYLE_ASSOCIATION_NAME: &str = "associationName";
pub const STYLE_VOUCHER_HEADER: &str = "receiptVoucherHeader";

/// Static letterhead content
#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    /// Letterhead name (upper case)
    pub letterhead: &'static str,
    /// Name used inside sentences
    pub name: &'static str,
    pub address: &'static [&'static str],
    pub registration: &'static [&'static str],
}

pub const OPPA: Organization = Organization {
    letterhead: "OKHLA PRINTERS & PROVIDERS ASSOCIATION",
    name: "Okhla Printers & Providers Association",
    address: &[
        "67, DSIDC Sheds, Okhla Industrial Area",
        "Phase I, New Delhi 110 020",
    ],
    registration: &[
        "Section 8 Registered Company Under Companies Act, 2013",
        "CIN : U93090DL2018NPL341412",
        "PAN : AACCO8151H",
        "12A & 80G Exempted under Income Tax Act, 1961",
        "Vide URN:AACCO8151HE2024",
    ],
};

/// India locale short date: day/month/year without padding
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// Builds the receipt voucher for one payment
#[derive(Debug, Clone)]
pub struct ReceiptDocumentBuilder {
    organization: Organization,
    logo_width: f32,
}

impl Default for ReceiptDocumentBuilder {
    fn default() -> Self {
        Self::new(OPPA)
    }
}

impl ReceiptDocumentBuilder {
    pub fn new(organization: Organization) -> Self {
        Self {
            organization,
            logo_width: 150.0,
        }
    }

    pub fn build(&self, receipt: &CanonicalReceipt, member: &Member) -> DocumentDescription {
        let amount = Amount::new(receipt.received_amount).unwrap_or_else(|e| {
            tracing::warn!(receipt_number = %receipt.receipt_number, error = %e, "Amount out of range, printing 0.00");
            Amount::ZERO
        });

        let mut blocks = vec![
            self.header(),
            Block::new(
                BlockKind::Title,
                Content::Paragraph(
                    Paragraph::text("RECEIPT VOUCHER", TextStyle::default().align(Alignment::Center))
                        .named(STYLE_VOUCHER_HEADER),
                ),
                20.0,
            ),
            metadata(receipt),
            self.narrative(receipt, member, &amount),
        ];

        if receipt.payment_type.is_cheque() {
            blocks.push(self.cheque_details(receipt));
        }

        blocks.extend([
            Block::new(
                BlockKind::AmountLine,
                Content::Paragraph(Paragraph::new(
                    vec![Span::bold(format!("₹ {amount}"))],
                    TextStyle::size(12.0).align(Alignment::Left),
                )),
                50.0,
            ),
            Block::new(
                BlockKind::SignatureLine,
                Content::Paragraph(Paragraph::text(
                    format!("For {}", self.organization.name),
                    TextStyle::size(10.0).align(Alignment::Right),
                )),
                50.0,
            ),
            Block::new(
                BlockKind::Signatory,
                Content::Paragraph(Paragraph::new(
                    vec![Span::bold("Authorised Signatory")],
                    TextStyle::size(10.0).align(Alignment::Right),
                )),
                0.0,
            ),
        ]);

        DocumentDescription {
            page: PageSetup::default(),
            blocks,
            styles: receipt_styles(),
        }
    }

    fn header(&self) -> Block {
        let small_left = TextStyle::size(8.0).align(Alignment::Left);
        let mut left = vec![
            Item::Logo {
                width: self.logo_width,
            },
            Item::Paragraph(
                Paragraph::text(self.organization.letterhead, TextStyle::default())
                    .named(STYLE_ASSOCIATION_NAME),
            ),
        ];
        left.extend(
            self.organization
                .address
                .iter()
                .map(|line| Item::Paragraph(Paragraph::text(*line, small_left))),
        );

        let small_right = TextStyle::size(8.0).align(Alignment::Right);
        let right = self
            .organization
            .registration
            .iter()
            .map(|line| Item::Paragraph(Paragraph::text(*line, small_right)))
            .collect();

        Block::new(
            BlockKind::OrganizationHeader,
            Content::Columns {
                columns: vec![
                    Column {
                        width: ColumnWidth::Fraction(0.5),
                        items: left,
                    },
                    Column {
                        width: ColumnWidth::Fraction(0.5),
                        items: right,
                    },
                ],
            },
            20.0,
        )
    }

    fn narrative(&self, receipt: &CanonicalReceipt, member: &Member, amount: &Amount) -> Block {
        let spans = vec![
            Span::plain("Received with thanks from M/s "),
            Span::bold(or_dash(Some(member.display_name()))),
            Span::plain(" the sum of rupees "),
            Span::bold(amount.to_words()),
            Span::plain(" via "),
            Span::bold(receipt.payment_type.label()),
            Span::plain(" towards "),
            Span::bold(or_dash(Some(receipt.payment_purpose.as_str()))),
            Span::plain(format!(" for {}.", self.organization.name)),
        ];
        let style = TextStyle {
            line_height: Some(1.5),
            ..TextStyle::size(10.0)
        };
        Block::new(
            BlockKind::Narrative,
            Content::Paragraph(Paragraph::new(spans, style)),
            10.0,
        )
    }

    fn cheque_details(&self, receipt: &CanonicalReceipt) -> Block {
        let date = receipt.cheque_receive_on.map(format_date);
        let spans = vec![
            Span::plain("By Cheque No. "),
            Span::bold(or_dash(receipt.cheque_number.as_deref())),
            Span::plain(" Date "),
            Span::bold(or_dash(date.as_deref())),
            Span::plain(" drawn on "),
            Span::bold(or_dash(receipt.bank_name.as_deref())),
            Span::plain(format!(" on account of {}.", self.organization.name)),
        ];
        Block::new(
            BlockKind::ChequeDetails,
            Content::Paragraph(Paragraph::new(spans, TextStyle::size(10.0))),
            10.0,
        )
    }
}

fn metadata(receipt: &CanonicalReceipt) -> Block {
    let size = TextStyle::size(10.0);
    Block::new(
        BlockKind::Metadata,
        Content::Columns {
            columns: vec![
                Column {
                    width: ColumnWidth::Auto,
                    items: vec![Item::Paragraph(Paragraph::new(
                        vec![Span::bold("No.: ")],
                        size,
                    ))],
                },
                Column {
                    width: ColumnWidth::Star,
                    items: vec![Item::Paragraph(Paragraph::text(
                        or_dash(Some(receipt.receipt_number.as_str())),
                        size,
                    ))],
                },
                Column {
                    width: ColumnWidth::Star,
                    items: vec![Item::Paragraph(Paragraph::text(
                        format!("Date: {}", format_date(receipt.receipt_date.date())),
                        size.align(Alignment::Right),
                    ))],
                },
            ],
        },
        10.0,
    )
}

fn receipt_styles() -> BTreeMap<String, TextStyle> {
    BTreeMap::from([
        (
            STYLE_ASSOCIATION_NAME.to_string(),
            TextStyle {
                font_size: Some(10.0),
                bold: Some(false),
                margin_top: Some(5.0),
                ..Default::default()
            },
        ),
        (
            STYLE_VOUCHER_HEADER.to_string(),
            TextStyle {
                font_size: Some(14.0),
                bold: Some(true),
                underline: Some(true),
                ..Default::default()
            },
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{PaymentType, ReceiptSource};

    fn receipt(payment_type: PaymentType) -> CanonicalReceipt {
        CanonicalReceipt {
            receipt_number: "RC-2024-001".into(),
            receipt_date: NaiveDate::from_ymd_opt(2024, 4, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            received_amount: Decimal::new(15000050, 2),
            payment_type,
            cheque_number: Some("00234".into()),
            cheque_receive_on: NaiveDate::from_ymd_opt(2024, 4, 3),
            bank_name: None,
            payment_purpose: "Annual Payment".into(),
            source: ReceiptSource::Yearly,
            membership_id: 7,
        }
    }

    fn member() -> Member {
        Member {
            membership_id: 7,
            member_name: "Ravi Kumar".into(),
            company_name: Some("Kumar Offset Works".into()),
            email: Some("ravi@example.com".into()),
        }
    }

    fn text_of(doc: &DocumentDescription, kind: BlockKind) -> String {
        doc.block(kind).map(Block::plain_text).unwrap_or_default()
    }

    #[test]
    fn test_block_order_without_cheque() {
        let doc = ReceiptDocumentBuilder::default().build(&receipt(PaymentType::Cash), &member());
        assert_eq!(
            doc.kinds(),
            vec![
                BlockKind::OrganizationHeader,
                BlockKind::Title,
                BlockKind::Metadata,
                BlockKind::Narrative,
                BlockKind::AmountLine,
                BlockKind::SignatureLine,
                BlockKind::Signatory,
            ]
        );
    }

    #[test]
    fn test_cheque_block_with_missing_bank() {
        let doc = ReceiptDocumentBuilder::default().build(&receipt(PaymentType::Cheque), &member());
        assert_eq!(
            text_of(&doc, BlockKind::ChequeDetails),
            "By Cheque No. 00234 Date 3/4/2024 drawn on - on account of Okhla Printers & Providers Association."
        );
        assert_eq!(doc.kinds()[4], BlockKind::ChequeDetails);
    }

    #[test]
    fn test_narrative_sentence() {
        let doc = ReceiptDocumentBuilder::default().build(&receipt(PaymentType::Cheque), &member());
        assert_eq!(
            text_of(&doc, BlockKind::Narrative),
            "Received with thanks from M/s Kumar Offset Works the sum of rupees \
             One lakh fifty thousand and fifty paise only. via Cheque towards \
             Annual Payment for Okhla Printers & Providers Association."
        );
    }

    #[test]
    fn test_metadata_and_amount() {
        let doc = ReceiptDocumentBuilder::default().build(&receipt(PaymentType::Online), &member());
        assert_eq!(text_of(&doc, BlockKind::Metadata), "No.: \nRC-2024-001\nDate: 5/4/2024");
        assert_eq!(text_of(&doc, BlockKind::AmountLine), "₹ 150000.50");
        assert_eq!(text_of(&doc, BlockKind::Title), "RECEIPT VOUCHER");
        assert_eq!(
            text_of(&doc, BlockKind::SignatureLine),
            "For Okhla Printers & Providers Association"
        );
    }

    #[test]
    fn test_missing_fields_render_dash() {
        let mut r = receipt(PaymentType::Unspecified);
        r.payment_purpose = " ".into();
        let mut m = member();
        m.company_name = None;
        m.member_name = String::new();
        let doc = ReceiptDocumentBuilder::default().build(&r, &m);
        let narrative = text_of(&doc, BlockKind::Narrative);
        assert!(narrative.starts_with("Received with thanks from M/s - the sum"));
        assert!(narrative.contains(" via - towards - for "));
    }

    #[test]
    fn test_zero_amount() {
        let mut r = receipt(PaymentType::Cash);
        r.received_amount = Decimal::ZERO;
        let doc = ReceiptDocumentBuilder::default().build(&r, &member());
        assert!(text_of(&doc, BlockKind::Narrative).contains("the sum of rupees zero via"));
        assert_eq!(text_of(&doc, BlockKind::AmountLine), "₹ 0.00");
    }

    #[test]
    fn test_build_is_repeatable() {
        let builder = ReceiptDocumentBuilder::default();
        let r = receipt(PaymentType::Cheque);
        assert_eq!(builder.build(&r, &member()), builder.build(&r, &member()));
    }

    #[test]
    fn test_header_content() {
        let doc = ReceiptDocumentBuilder::default().build(&receipt(PaymentType::Cash), &member());
        let header = text_of(&doc, BlockKind::OrganizationHeader);
        assert!(header.starts_with("OKHLA PRINTERS & PROVIDERS ASSOCIATION\n67, DSIDC Sheds"));
        assert!(header.contains("CIN : U93090DL2018NPL341412"));
        assert!(doc.styles.contains_key(STYLE_VOUCHER_HEADER));
    }

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(format_date(d), "1/12/2024");
    }
}
