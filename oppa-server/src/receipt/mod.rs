//! Receipt generation
//!
//! - [`words`]: amounts in words, Indian numbering
//! - [`resolver`]: receipt lookup across both payment tables
//! - [`builder`] / [`report`]: declarative document layout
//! - [`render`]: PDF output
//! - [`delivery`]: the end-to-end render and email flow

pub mod builder;
pub mod delivery;
pub mod document;
pub mod render;
pub mod report;
pub mod resolver;
pub mod words;

pub use builder::{Organization, ReceiptDocumentBuilder};
pub use delivery::{DeliveryError, ReceiptPdf, ReceiptService, SentReceipt};
pub use document::{BlockKind, DocumentDescription};
pub use render::{PdfRenderer, RenderingConfig};
pub use report::ReportDocumentBuilder;
pub use resolver::{MemberStore, PaymentStore, ResolveError, StoreError, resolve_receipt};
pub use words::{Amount, InvalidAmount, amount_to_words};
