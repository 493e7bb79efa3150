//! Receipt delivery: resolve, lay out, render and optionally email
//!
//! Nothing is returned or sent until every step has succeeded, so a
//! failure never leaves a partial PDF or a half-sent message behind.

use oppa_pdf::PdfError;
use shared::models::{CanonicalReceipt, Member};
use shared::util::non_blank;
use thiserror::Error;

use super::builder::ReceiptDocumentBuilder;
use super::render::PdfRenderer;
use super::resolver::{MemberStore, PaymentStore, ResolveError, StoreError, resolve_receipt};
use crate::email::{Attachment, MailError, Mailer, OutgoingEmail};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Member {0} not found")]
    MemberNotFound(i64),

    #[error("No recipient address for receipt {0}")]
    MissingRecipient(String),

    #[error("Rendering failed: {0}")]
    Render(#[from] PdfError),

    #[error(transparent)]
    Mail(#[from] MailError),
}

impl From<StoreError> for DeliveryError {
    fn from(err: StoreError) -> Self {
        DeliveryError::Resolve(ResolveError::Store(err))
    }
}

/// A rendered receipt with the data it was built from
#[derive(Debug, Clone)]
pub struct ReceiptPdf {
    pub receipt: CanonicalReceipt,
    pub member: Member,
    pub bytes: Vec<u8>,
}

impl ReceiptPdf {
    /// Name used when the PDF is viewed inline
    pub fn inline_filename(&self) -> String {
        format!("Receipt_{}.pdf", self.receipt.receipt_number)
    }

    /// Name used for the email attachment
    pub fn attachment_filename(&self) -> String {
        format!("Receipt-{}.pdf", self.receipt.receipt_number)
    }
}

/// Outcome of a successful email delivery
#[derive(Debug, Clone, PartialEq)]
pub struct SentReceipt {
    pub receipt_number: String,
    pub to: String,
}

pub fn email_subject(receipt_number: &str) -> String {
    format!("Payment Receipt - {receipt_number}")
}

pub fn email_body(member_name: &str, receipt_number: &str) -> String {
    format!(
        "<p>Hello <b>{member_name}</b>,<br>Your payment receipt <b>{receipt_number}</b> is attached.<br>Thank you.</p>"
    )
}

/// Receipt operations over one store and renderer
pub struct ReceiptService<'a, S> {
    store: &'a S,
    renderer: &'a PdfRenderer,
    builder: &'a ReceiptDocumentBuilder,
}

impl<'a, S: PaymentStore + MemberStore> ReceiptService<'a, S> {
    pub fn new(
        store: &'a S,
        renderer: &'a PdfRenderer,
        builder: &'a ReceiptDocumentBuilder,
    ) -> Self {
        Self {
            store,
            renderer,
            builder,
        }
    }

    /// Resolve the receipt and its member
    pub async fn lookup(
        &self,
        receipt_number: &str,
    ) -> Result<(CanonicalReceipt, Member), DeliveryError> {
        let receipt = resolve_receipt(self.store, receipt_number).await?;
        let member = self
            .store
            .find_member(receipt.membership_id)
            .await?
            .ok_or(DeliveryError::MemberNotFound(receipt.membership_id))?;
        Ok((receipt, member))
    }

    pub async fn render_receipt(&self, receipt_number: &str) -> Result<ReceiptPdf, DeliveryError> {
        let (receipt, member) = self.lookup(receipt_number).await?;
        let doc = self.builder.build(&receipt, &member);
        let bytes = self.renderer.render(&doc)?;
        tracing::info!(
            receipt_number = %receipt.receipt_number,
            source = ?receipt.source,
            size = bytes.len(),
            "Receipt rendered"
        );
        Ok(ReceiptPdf {
            receipt,
            member,
            bytes,
        })
    }

    /// Render the receipt and mail it as a PDF attachment
    ///
    /// The recipient is `to_email` when given, else the member's address.
    pub async fn email_receipt<M: Mailer>(
        &self,
        mailer: &M,
        from: &str,
        receipt_number: &str,
        to_email: Option<&str>,
    ) -> Result<SentReceipt, DeliveryError> {
        let pdf = self.render_receipt(receipt_number).await?;
        let number = pdf.receipt.receipt_number.clone();
        let to = non_blank(to_email)
            .or_else(|| pdf.member.email().map(str::to_string))
            .ok_or_else(|| DeliveryError::MissingRecipient(number.clone()))?;

        let email = OutgoingEmail {
            from: from.to_string(),
            to: to.clone(),
            subject: email_subject(&number),
            html: email_body(pdf.member.member_name.trim(), &number),
            attachments: vec![Attachment::pdf(pdf.attachment_filename(), pdf.bytes)],
        };
        mailer.send(&email).await?;

        tracing::info!(receipt_number = %number, to = %to, "Receipt emailed");
        Ok(SentReceipt {
            receipt_number: number,
            to,
        })
    }

    /// Email address on file for the receipt's member
    pub async fn member_email(
        &self,
        receipt_number: &str,
    ) -> Result<Option<String>, DeliveryError> {
        let (_, member) = self.lookup(receipt_number).await?;
        Ok(member.email().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::render::RenderingConfig;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::models::{OtherPaymentRecord, YearlySummaryRecord};
    use std::sync::Mutex;

    use crate::receipt::resolver::StoreResult;

    #[derive(Default)]
    struct Store {
        yearly: Vec<YearlySummaryRecord>,
        members: Vec<Member>,
    }

    impl PaymentStore for Store {
        async fn find_yearly(&self, receipt_number: &str) -> StoreResult<Vec<YearlySummaryRecord>> {
            Ok(self
                .yearly
                .iter()
                .filter(|r| r.receipt_number == receipt_number)
                .cloned()
                .collect())
        }

        async fn find_other(&self, _: &str, _: &[&str]) -> StoreResult<Vec<OtherPaymentRecord>> {
            Ok(Vec::new())
        }
    }

    impl MemberStore for Store {
        async fn find_member(&self, membership_id: i64) -> StoreResult<Option<Member>> {
            Ok(self
                .members
                .iter()
                .find(|m| m.membership_id == membership_id)
                .cloned())
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail: bool,
    }

    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Delivery("smtp down".into()));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn store(email: Option<&str>) -> Store {
        Store {
            yearly: vec![YearlySummaryRecord {
                receipt_number: "RC-2024-001".into(),
                receipt_date: NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(),
                amount_paid: Some(Decimal::new(1500005, 1)),
                cheque_number: Some("00234".into()),
                cheque_receive_on: NaiveDate::from_ymd_opt(2024, 4, 3),
                payment_type: Some("Cheque".into()),
                bank_name: Some("HDFC".into()),
                payment_year: Some(2024),
                membership_id: 7,
            }],
            members: vec![Member {
                membership_id: 7,
                member_name: "Ravi Kumar".into(),
                company_name: Some("Kumar Offset Works".into()),
                email: email.map(Into::into),
            }],
        }
    }

    fn renderer() -> PdfRenderer {
        PdfRenderer::new(RenderingConfig::default())
    }

    #[tokio::test]
    async fn test_render_receipt() {
        let store = store(None);
        let renderer = renderer();
        let builder = ReceiptDocumentBuilder::default();
        let service = ReceiptService::new(&store, &renderer, &builder);

        let pdf = service.render_receipt("RC-2024-001").await.unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF-"));
        assert_eq!(pdf.member.membership_id, 7);
        assert_eq!(pdf.inline_filename(), "Receipt_RC-2024-001.pdf");
    }

    #[tokio::test]
    async fn test_missing_member() {
        let mut store = store(None);
        store.members.clear();
        let renderer = renderer();
        let builder = ReceiptDocumentBuilder::default();
        let service = ReceiptService::new(&store, &renderer, &builder);

        assert!(matches!(
            service.render_receipt("RC-2024-001").await,
            Err(DeliveryError::MemberNotFound(7))
        ));
    }

    #[tokio::test]
    async fn test_email_to_member_address() {
        let store = store(Some("ravi@example.com"));
        let renderer = renderer();
        let builder = ReceiptDocumentBuilder::default();
        let service = ReceiptService::new(&store, &renderer, &builder);
        let mailer = RecordingMailer::default();

        let sent = service
            .email_receipt(&mailer, "accounts@oppa.in", "RC-2024-001", None)
            .await
            .unwrap();
        assert_eq!(sent.to, "ravi@example.com");

        let outbox = mailer.sent.lock().unwrap();
        assert_eq!(outbox.len(), 1);
        let email = &outbox[0];
        assert_eq!(email.subject, "Payment Receipt - RC-2024-001");
        assert_eq!(email.attachments[0].filename, "Receipt-RC-2024-001.pdf");
        assert!(email.attachments[0].data.starts_with(b"%PDF-"));
        assert!(email.html.contains("<b>Ravi Kumar</b>"));
    }

    #[tokio::test]
    async fn test_explicit_recipient_wins() {
        let store = store(Some("ravi@example.com"));
        let renderer = renderer();
        let builder = ReceiptDocumentBuilder::default();
        let service = ReceiptService::new(&store, &renderer, &builder);
        let mailer = RecordingMailer::default();

        let sent = service
            .email_receipt(&mailer, "accounts@oppa.in", "RC-2024-001", Some(" desk@kumar.in "))
            .await
            .unwrap();
        assert_eq!(sent.to, "desk@kumar.in");
    }

    #[tokio::test]
    async fn test_no_recipient_sends_nothing() {
        let store = store(None);
        let renderer = renderer();
        let builder = ReceiptDocumentBuilder::default();
        let service = ReceiptService::new(&store, &renderer, &builder);
        let mailer = RecordingMailer::default();

        let result = service
            .email_receipt(&mailer, "accounts@oppa.in", "RC-2024-001", None)
            .await;
        assert!(matches!(result, Err(DeliveryError::MissingRecipient(_))));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mail_failure_surfaces() {
        let store = store(Some("ravi@example.com"));
        let renderer = renderer();
        let builder = ReceiptDocumentBuilder::default();
        let service = ReceiptService::new(&store, &renderer, &builder);
        let mailer = RecordingMailer {
            fail: true,
            ..Default::default()
        };

        let result = service
            .email_receipt(&mailer, "accounts@oppa.in", "RC-2024-001", None)
            .await;
        assert!(matches!(result, Err(DeliveryError::Mail(_))));
    }

    #[tokio::test]
    async fn test_unknown_receipt() {
        let store = store(None);
        let renderer = renderer();
        let builder = ReceiptDocumentBuilder::default();
        let service = ReceiptService::new(&store, &renderer, &builder);

        assert!(matches!(
            service.member_email("RC-404").await,
            Err(DeliveryError::Resolve(ResolveError::NotFound(_)))
        ));
    }
}
