//! Error types for the PDF library

use thiserror::Error;

/// PDF output error types
#[derive(Debug, Error)]
pub enum PdfError {
    /// IO error while reading assets or writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image data does not match its declared dimensions
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Page geometry leaves no room for content
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for PDF operations
pub type PdfResult<T> = Result<T, PdfError>;
