//! Comparison of two extracted datasheets and a simple OPEX estimate.

mod opex;
mod table;

pub use opex::{OpexInputs, OpexRow, OpexSummary, OptionCost};
pub use table::{ComparisonRow, ComparisonTable, DISPLAY_FIELDS};
