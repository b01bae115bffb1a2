//! Datasheet field extraction module.

pub mod fields;
mod parser;
pub mod rules;

pub use fields::{FieldDefinition, FieldSpec, FieldTable};
pub use parser::DatasheetParser;

use crate::models::datasheet::ExtractionResult;
use crate::pdf::PdfProcessor;

/// Result type for extraction operations.
pub type Result<T> = crate::error::Result<T>;

/// Trait for datasheet field extractors.
pub trait DatasheetExtractor {
    /// Load a document with `processor` and extract its fields.
    ///
    /// Fails only when the document itself cannot be read; missing fields
    /// are simply absent from the result.
    fn extract(&self, pdf_bytes: &[u8], processor: &mut dyn PdfProcessor)
        -> Result<ExtractionResult>;

    /// Extract fields from already-joined document text.
    fn extract_from_text(&self, text: &str) -> ExtractionResult;
}
