//! Rule-based datasheet parser.

use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::models::datasheet::{ExtractionResult, FieldValue};
use crate::pdf::PdfProcessor;

use super::fields::FieldTable;
use super::rules::{clean_value, grab, truncate_model};
use super::{DatasheetExtractor, Result};

/// Applies a field table to datasheet text.
///
/// The parser holds no mutable state; one instance can be shared across
/// threads and documents.
#[derive(Debug, Clone)]
pub struct DatasheetParser {
    table: Arc<FieldTable>,
}

impl DatasheetParser {
    /// Create a parser over the built-in field table.
    pub fn new() -> Self {
        Self {
            table: FieldTable::builtin(),
        }
    }

    /// Use a custom field table.
    pub fn with_table(mut self, table: Arc<FieldTable>) -> Self {
        self.table = table;
        self
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    /// Extract all fields from joined document text.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new(text);

        for definition in self.table.iter() {
            let Some(raw) = grab(definition.pattern(), text) else {
                trace!("{}: no match", definition.key());
                continue;
            };

            match clean_value(raw, definition.class()) {
                Some(value) => {
                    trace!("{}: {:?}", definition.key(), value);
                    result.insert(definition.key(), value);
                }
                None => {
                    trace!("{}: matched {:?} but no value", definition.key(), raw);
                }
            }
        }

        Self::fix_model(&mut result);

        debug!(
            "Extracted {} of {} fields from {} characters",
            result.len(),
            self.table.len(),
            text.len()
        );

        result
    }

    // Vendor quirk, see `truncate_model`.
    fn fix_model(result: &mut ExtractionResult) {
        if let Some(FieldValue::Text(model)) = result.get_mut("model") {
            let truncated = truncate_model(model);
            if truncated.len() != model.len() {
                debug!("Truncated model from {} characters", model.chars().count());
                *model = truncated;
            }
        }
    }
}

impl Default for DatasheetParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasheetExtractor for DatasheetParser {
    fn extract(
        &self,
        pdf_bytes: &[u8],
        processor: &mut dyn PdfProcessor,
    ) -> Result<ExtractionResult> {
        processor.load(pdf_bytes)?;
        info!("Extracting datasheet fields from {} pages", processor.page_count());

        let text = processor.extract_text()?;
        Ok(self.parse(&text))
    }

    fn extract_from_text(&self, text: &str) -> ExtractionResult {
        self.parse(text)
    }
}
