//! Error types for the chiller-core library.

use thiserror::Error;

/// Main error type for the chiller library.
#[derive(Error, Debug)]
pub enum ChillerError {
    /// The input could not be opened or read as a document at all.
    #[error("document unreadable: {0}")]
    DocumentUnreadable(#[from] PdfError),

    /// A field definition could not be compiled into the field table.
    #[error("invalid field definition '{key}': {reason}")]
    FieldDefinition { key: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Result type for the chiller library.
pub type Result<T> = std::result::Result<T, ChillerError>;
