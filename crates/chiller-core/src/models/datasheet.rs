//! Extracted datasheet record.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::datasheet::rules::clean_value;

/// Value class of a field definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueClass {
    /// Coerced to a floating-point number.
    Numeric,
    /// Kept as trimmed text.
    Text,
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueClass::Numeric => write!(f, "numeric"),
            ValueClass::Text => write!(f, "text"),
        }
    }
}

/// A single extracted field value.
///
/// Numbers are always finite and text is never blank; a field that would
/// violate either is simply absent from the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// The value if it was extracted as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// The value if it was extracted as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => Some(s),
        }
    }

    /// Numeric reading of the value: numbers as-is, text only when the whole
    /// string (commas removed) parses as a number.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s
                .trim()
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Structured output of applying the field table to one document.
///
/// Fields are kept sorted by key so that identical documents serialize
/// identically. The joined document text is always retained for auditing
/// patterns that failed to match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Document identifier, attached by the caller.
    #[serde(rename = "_file_name", default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,

    /// Extracted fields keyed by field key.
    #[serde(flatten)]
    fields: BTreeMap<String, FieldValue>,

    /// Joined document text.
    #[serde(rename = "_raw_text")]
    raw_text: String,
}

impl ExtractionResult {
    /// Create an empty result for the given document text.
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            source: None,
            fields: BTreeMap::new(),
            raw_text: raw_text.into(),
        }
    }

    /// Attach a document identifier (usually the file's display name).
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Numeric value of a field, if present and extracted as a number.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(FieldValue::as_number)
    }

    /// Text value of a field, if present and extracted as text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(FieldValue::as_text)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterate over present fields in key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Override a field with a user-supplied value.
    ///
    /// The value goes through the same cleanup and coercion as extracted
    /// text. A value that does not survive coercion (blank, or no number for
    /// a numeric field) clears the field. Returns the stored value.
    pub fn set_field(&mut self, key: &str, raw: &str, class: ValueClass) -> Option<&FieldValue> {
        match clean_value(raw, class) {
            Some(value) => {
                self.fields.insert(key.to_string(), value);
                self.fields.get(key)
            }
            None => {
                self.fields.remove(key);
                None
            }
        }
    }

    /// Remove a field, returning its previous value.
    pub fn remove_field(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    pub(crate) fn insert(&mut self, key: &str, value: FieldValue) {
        self.fields.insert(key.to_string(), value);
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(key)
    }
}
