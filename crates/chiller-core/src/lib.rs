//! Core library for chiller datasheet comparison.
//!
//! This crate provides:
//! - PDF loading and page text joining
//! - Rule-based extraction of engineering fields from vendor datasheets
//! - Side-by-side comparison and a simple OPEX / payback estimate

pub mod compare;
pub mod datasheet;
pub mod error;
pub mod models;
pub mod pdf;

pub use compare::{ComparisonTable, OpexInputs, OpexSummary};
pub use datasheet::{DatasheetExtractor, DatasheetParser, FieldSpec, FieldTable};
pub use error::{ChillerError, PdfError, Result};
pub use models::config::ChillerConfig;
pub use models::datasheet::{ExtractionResult, FieldValue, ValueClass};
pub use pdf::{join_pages, PdfExtractor, PdfProcessor};

/// Extract datasheet fields from PDF bytes with the built-in field table.
///
/// Fails with [`ChillerError::DocumentUnreadable`] when the bytes cannot be
/// opened as a PDF. Fields that are not found are absent from the result.
pub fn extract(pdf_bytes: &[u8]) -> Result<ExtractionResult> {
    let mut processor = PdfExtractor::new();
    DatasheetParser::new().extract(pdf_bytes, &mut processor)
}
