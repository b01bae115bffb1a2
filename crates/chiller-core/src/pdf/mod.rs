//! PDF processing module.

mod extractor;
mod join;

pub use extractor::PdfExtractor;
pub use join::join_pages;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
///
/// Pages are 1-indexed. A page without a text layer (e.g. a scanned image)
/// yields an empty string rather than an error.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page.
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract text from the entire PDF as one string, pages in order.
    fn extract_text(&self) -> Result<String> {
        let pages = (1..=self.page_count())
            .map(|page| self.extract_page_text(page))
            .collect::<Result<Vec<_>>>()?;
        Ok(join_pages(&pages))
    }
}
