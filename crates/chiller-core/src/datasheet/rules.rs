//! Capture selection, cleanup and coercion rules.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::datasheet::{FieldValue, ValueClass};

/// Longest `model` value kept before truncation.
pub const MODEL_MAX_CHARS: usize = 60;

lazy_static! {
    // First signed decimal number in a captured value
    static ref NUMBER: Regex = Regex::new(r"-?[0-9]+(?:\.[0-9]+)?").unwrap();
}

/// Return the first capture group of the first match that is present and
/// non-blank, trimmed.
///
/// Patterns express alternative phrasings as separate groups, so a group
/// that did not participate is skipped rather than treated as a miss.
pub fn grab<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    let caps = pattern.captures(text)?;

    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().trim())
        .find(|s| !s.is_empty())
}

/// Parse the first number in `value`, ignoring thousands separators.
pub fn to_float(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let value = value.replace(',', "");
    NUMBER
        .find(&value)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Turn a captured string into a field value for the given class.
pub fn clean_value(raw: &str, class: ValueClass) -> Option<FieldValue> {
    match class {
        ValueClass::Numeric => to_float(raw).map(FieldValue::Number),
        ValueClass::Text => {
            let text = raw.trim();
            (!text.is_empty()).then(|| FieldValue::Text(text.to_string()))
        }
    }
}

/// Trane reports restate the full model number string further down, and it
/// can be captured by the short `Model` label. Keep at most the first
/// [`MODEL_MAX_CHARS`] characters.
pub fn truncate_model(model: &str) -> String {
    if model.chars().count() <= MODEL_MAX_CHARS {
        return model.to_string();
    }

    let truncated: String = model.chars().take(MODEL_MAX_CHARS).collect();
    truncated.trim().to_string()
}
