//! Configuration structures for datasheet extraction and comparison.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::compare::OpexInputs;
use crate::datasheet::{FieldSpec, FieldTable};
use crate::error::{ChillerError, Result};

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChillerConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Default OPEX assumptions.
    pub opex: OpexInputs,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Field definitions added to (or replacing) the built-in table.
    pub extra_fields: Vec<FieldSpec>,

    /// Per-document extraction deadline in seconds (0 = none).
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            extra_fields: Vec::new(),
            timeout_secs: 30,
        }
    }
}

impl ChillerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ChillerError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ChillerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The effective field table: built-in definitions plus configured extras.
    pub fn field_table(&self) -> Result<Arc<FieldTable>> {
        if self.extraction.extra_fields.is_empty() {
            return Ok(FieldTable::builtin());
        }
        Ok(Arc::new(FieldTable::with_extra(&self.extraction.extra_fields)?))
    }
}
