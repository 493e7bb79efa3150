//! # oppa-pdf
//!
//! Minimal PDF writer - low-level page output only.
//!
//! ## Scope
//!
//! This crate handles HOW to draw:
//! - Page objects, content streams and the cross-reference table
//! - WinAnsi encoding for the standard Helvetica faces
//! - Text measurement, word wrapping and alignment
//! - Logo processing (optional, `image` feature)
//!
//! Business logic (WHAT to draw) stays in application code:
//! - Receipt vouchers and summary reports → oppa-server
//!
//! ## Example
//!
//! ```
//! use oppa_pdf::{Align, PageSize, PdfBuilder, TextOptions, TextRun};
//!
//! let mut pdf = PdfBuilder::new(PageSize::A4, 40.0).unwrap();
//! let width = pdf.content_width();
//! let opts = TextOptions { size: 14.0, align: Align::Center, ..Default::default() };
//! let height = pdf.text(0.0, width, &[TextRun::bold("RECEIPT VOUCHER")], &opts);
//! pdf.advance(height);
//!
//! let bytes = pdf.build();
//! assert!(bytes.starts_with(b"%PDF-1.4"));
//! ```

mod builder;
mod encoding;
mod error;
mod fonts;
mod logo;

// Re-exports
pub use builder::{Align, PageSize, PdfBuilder, TextOptions, TextRun};
pub use encoding::{encode_win_ansi, normalize_text};
pub use error::{PdfError, PdfResult};
pub use fonts::{Font, text_width};
pub use logo::LogoImage;

#[cfg(feature = "image")]
pub use logo::process_logo;
