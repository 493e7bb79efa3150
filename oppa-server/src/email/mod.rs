//! Outgoing email
//!
//! Receipts are sent as raw MIME messages through AWS SES so the PDF can
//! travel as an attachment. The transport sits behind [`Mailer`].

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::primitives::Blob;
use aws_sdk_sesv2::types::{Destination, EmailContent, RawMessage};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Base64 line length required by RFC 2045
const LINE_LENGTH: usize = 76;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn pdf(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "application/pdf".to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

/// Email transport
#[allow(async_fn_in_trait)]
pub trait Mailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Header values must stay on one line
fn header_value<'a>(name: &str, value: &'a str) -> Result<&'a str, MailError> {
    if value.contains(['\r', '\n']) {
        return Err(MailError::InvalidMessage(format!(
            "{name} header contains a line break"
        )));
    }
    Ok(value)
}

/// RFC 2047 encoded-word for non-ASCII header text
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value))
    }
}

fn push_base64(out: &mut String, data: &[u8]) {
    let encoded = STANDARD.encode(data);
    for chunk in encoded.as_bytes().chunks(LINE_LENGTH) {
        // Base64 output is ASCII
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push_str("\r\n");
    }
}

/// Serialize `email` as a multipart/mixed MIME message
pub fn build_raw_message(email: &OutgoingEmail, boundary: &str) -> Result<Vec<u8>, MailError> {
    let from = header_value("From", &email.from)?;
    let to = header_value("To", &email.to)?;
    let subject = header_value("Subject", &email.subject)?;
    if from.trim().is_empty() || to.trim().is_empty() {
        return Err(MailError::InvalidMessage(
            "sender and recipient are required".into(),
        ));
    }

    let mut out = String::with_capacity(1024);
    out.push_str(&format!("From: {from}\r\n"));
    out.push_str(&format!("To: {to}\r\n"));
    out.push_str(&format!("Subject: {}\r\n", encode_header(subject)));
    out.push_str("MIME-Version: 1.0\r\n");
    out.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n"
    ));

    out.push_str(&format!("--{boundary}\r\n"));
    out.push_str("Content-Type: text/html; charset=UTF-8\r\n");
    out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
    push_base64(&mut out, email.html.as_bytes());

    for attachment in &email.attachments {
        let filename = header_value("Attachment filename", &attachment.filename)?.replace('"', "");
        out.push_str(&format!("--{boundary}\r\n"));
        out.push_str(&format!(
            "Content-Type: {}; name=\"{filename}\"\r\n",
            attachment.content_type
        ));
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{filename}\"\r\n"
        ));
        out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
        push_base64(&mut out, &attachment.data);
    }
    out.push_str(&format!("--{boundary}--\r\n"));

    Ok(out.into_bytes())
}

/// AWS SES v2 transport
#[derive(Clone)]
pub struct SesMailer {
    ses: SesClient,
}

impl SesMailer {
    pub fn new(ses: SesClient) -> Self {
        Self { ses }
    }
}

impl Mailer for SesMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let boundary = format!("oppa-{:016x}", rand::random::<u64>());
        let raw = build_raw_message(email, &boundary)?;

        let message = RawMessage::builder()
            .data(Blob::new(raw))
            .build()
            .map_err(|e| MailError::InvalidMessage(e.to_string()))?;

        self.ses
            .send_email()
            .from_email_address(&email.from)
            .destination(Destination::builder().to_addresses(&email.to).build())
            .content(EmailContent::builder().raw(message).build())
            .send()
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        tracing::info!(
            to = %email.to,
            attachments = email.attachments.len(),
            "Email sent"
        );
        Ok(())
    }
}
