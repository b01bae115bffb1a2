//! Field definitions: the schema the extraction engine fills in.
//!
//! Each definition pairs a stable key with a case-insensitive pattern and a
//! value class. Alternative label phrasings for the same quantity are written
//! as alternatives with their own capture group; the first group that
//! captures non-blank text wins.

use std::collections::HashSet;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{ChillerError, Result};
use crate::models::datasheet::ValueClass;

use ValueClass::{Numeric, Text};

/// Built-in definitions for Trane Select Assist "Product Report" datasheets.
///
/// Numeric captures accept thousands separators (`1,234.5`); the comma is
/// removed during coercion.
const BUILTIN_FIELDS: &[(&str, &str, ValueClass)] = &[
    // Unit overview
    ("range", r"Range\s+(.+)", Text),
    ("chiller_model", r"Chiller model\s+(.+)", Text),
    ("model", r"Model\s+([A-Z0-9\-\s]+?)(?:\n|$)", Text),
    ("unit_application", r"Unit Application\s+(.+)", Text),
    ("compressor_type", r"Compressor type\s+(.+)", Text),
    ("refrigerant", r"Refrigerant Type.*?\s([Rr]\d{3,4}[A-Za-z0-9]*)", Text),
    ("refrigerant_gwp", r"Refrigerant GWP\s+(\d[\d,]*(?:\.\d+)?)", Numeric),
    ("electrical_supply", r"Electrical supply\s+(.+)", Text),
    // Project conditions
    (
        "design_ambient_c",
        r"Outdoor air dry bulb temperature\s+(-?\d[\d,]*(?:\.\d+)?)\s*C",
        Numeric,
    ),
    ("ewt_c", r"Fluid entering temperature\s+(-?\d[\d,]*(?:\.\d+)?)\s*C", Numeric),
    ("lwt_c", r"Fluid leaving temperature\s+(-?\d[\d,]*(?:\.\d+)?)\s*C", Numeric),
    ("fluid", r"Fluid Type and concentration\s+([A-Za-z ]+)", Text),
    (
        "antifreeze_pct",
        r"Fluid Type and concentration.*?/\s+(\d[\d,]*(?:\.\d+)?)\s*%",
        Numeric,
    ),
    ("elevation_m", r"Elevation\s+(\d[\d,]*(?:\.\d+)?)\s*m", Numeric),
    // Unit performance
    ("gross_capacity_kw", r"Gross capacity\s+(\d[\d,]*(?:\.\d+)?)\s*kW", Numeric),
    ("net_capacity_kw", r"Net capacity\s+(\d[\d,]*(?:\.\d+)?)\s*kW", Numeric),
    (
        "power_kw",
        r"(?:Gross unit power|Total absorbed power)\s+(\d[\d,]*(?:\.\d+)?)\s*kW",
        Numeric,
    ),
    ("gross_eer_kw_per_kw", r"Gross EER\s+(\d[\d,]*(?:\.\d+)?)\s*EER", Numeric),
    ("net_eer_kw_per_kw", r"Net EER\s+(\d[\d,]*(?:\.\d+)?)\s*EER", Numeric),
    ("design_flow_ls", r"Design flow rate\s+(\d[\d,]*(?:\.\d+)?)\s*L/s", Numeric),
    (
        "evap_pressure_drop_kpa",
        r"Evaporator Pressure drop \(Design\)\s+(\d[\d,]*(?:\.\d+)?)\s*kPa",
        Numeric,
    ),
    // Acoustic
    (
        "sound_power_dba",
        r"Outdoor sound power level.*?\s(\d[\d,]*(?:\.\d+)?)\s*dBA",
        Numeric,
    ),
    (
        "sound_pressure_dba",
        r"Outdoor sound pressure level.*?\s(\d[\d,]*(?:\.\d+)?)\s*dBA",
        Numeric,
    ),
    // Part-load headline KPI
    ("iplv_si", r"IPLV\.SI\s+(\d[\d,]*(?:\.\d+)?)", Numeric),
    ("nplv_si", r"NPLV\.SI\s+(\d[\d,]*(?:\.\d+)?)", Numeric),
    // Electrical block
    ("running_current_a", r"Current\s+(\d[\d,]*(?:\.\d+)?)\s*A", Numeric),
    ("startup_current_a", r"Start-up current\s+(\d[\d,]*(?:\.\d+)?)\s*A", Numeric),
    (
        "max_amps_a",
        r"Max amps\s+(\d[\d,]*(?:\.\d+)?)\s*A|Maximum running current\s+(\d[\d,]*(?:\.\d+)?)\s*A",
        Numeric,
    ),
    (
        "max_power_kw",
        r"Maximum power at maximum current\s+(\d[\d,]*(?:\.\d+)?)\s*kW",
        Numeric,
    ),
    (
        "cos_phi",
        r"Displacement power factor \(cos-phi\)\s+(\d[\d,]*(?:\.\d+)?)",
        Numeric,
    ),
    // Dimensions/weight
    ("length_mm", r"Length\s+(\d[\d,]*(?:\.\d+)?)\s*mm", Numeric),
    ("width_mm", r"Width\s+(\d[\d,]*(?:\.\d+)?)\s*mm", Numeric),
    ("height_mm", r"Height\s+(\d[\d,]*(?:\.\d+)?)\s*mm", Numeric),
    (
        "shipping_weight_kg",
        r"(?:Unit shipping weight|Shipping weight including packaging)\s+(\d[\d,]*(?:\.\d+)?)\s*kg",
        Numeric,
    ),
    ("operating_weight_kg", r"Operating weight\s+(\d[\d,]*(?:\.\d+)?)\s*kg", Numeric),
];

lazy_static! {
    static ref BUILTIN_TABLE: Arc<FieldTable> = Arc::new(
        FieldTable::new(
            BUILTIN_FIELDS
                .iter()
                .map(|(key, pattern, class)| FieldSpec::new(*key, *pattern, *class))
                .collect(),
        )
        .expect("built-in field patterns are valid")
    );
}

/// Uncompiled field definition, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Stable field key, e.g. `net_capacity_kw`.
    pub key: String,
    /// Regular expression; matched case-insensitively.
    pub pattern: String,
    /// How the captured text is coerced.
    pub class: ValueClass,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, pattern: impl Into<String>, class: ValueClass) -> Self {
        Self {
            key: key.into(),
            pattern: pattern.into(),
            class,
        }
    }
}

/// A compiled field definition.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    key: String,
    pattern: Regex,
    class: ValueClass,
}

impl FieldDefinition {
    /// Compile a field definition.
    ///
    /// Keys starting with `_` are reserved for result metadata. The pattern
    /// must contain at least one capture group.
    pub fn compile(spec: &FieldSpec) -> Result<Self> {
        let invalid = |reason: String| ChillerError::FieldDefinition {
            key: spec.key.clone(),
            reason,
        };

        if spec.key.trim().is_empty() {
            return Err(invalid("key is empty".to_string()));
        }
        if spec.key.starts_with('_') {
            return Err(invalid("keys starting with '_' are reserved".to_string()));
        }

        let pattern = RegexBuilder::new(&spec.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        if pattern.captures_len() < 2 {
            return Err(invalid("pattern has no capture group".to_string()));
        }

        Ok(Self {
            key: spec.key.clone(),
            pattern,
            class: spec.class,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn class(&self) -> ValueClass {
        self.class
    }

    /// The definition in uncompiled form.
    pub fn spec(&self) -> FieldSpec {
        FieldSpec::new(self.key.clone(), self.pattern.as_str(), self.class)
    }
}

/// Ordered, immutable set of field definitions.
#[derive(Debug, Clone)]
pub struct FieldTable {
    definitions: Vec<FieldDefinition>,
}

impl FieldTable {
    /// Compile a table from specs. Keys must be unique.
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut definitions = Vec::with_capacity(specs.len());

        for spec in &specs {
            if !seen.insert(spec.key.as_str()) {
                return Err(ChillerError::FieldDefinition {
                    key: spec.key.clone(),
                    reason: "duplicate key".to_string(),
                });
            }
            definitions.push(FieldDefinition::compile(spec)?);
        }

        Ok(Self { definitions })
    }

    /// The shared built-in table, compiled once per process.
    pub fn builtin() -> Arc<FieldTable> {
        Arc::clone(&BUILTIN_TABLE)
    }

    /// Built-in definitions followed by `extra` ones.
    ///
    /// An extra definition whose key matches a built-in one replaces it in
    /// place, so vendor-specific phrasings can override the defaults.
    pub fn with_extra(extra: &[FieldSpec]) -> Result<Self> {
        let mut seen = HashSet::new();
        for spec in extra {
            if !seen.insert(spec.key.as_str()) {
                return Err(ChillerError::FieldDefinition {
                    key: spec.key.clone(),
                    reason: "duplicate key".to_string(),
                });
            }
        }

        let mut definitions = BUILTIN_TABLE.definitions.clone();
        for spec in extra {
            let definition = FieldDefinition::compile(spec)?;
            match definitions.iter_mut().find(|d| d.key == spec.key) {
                Some(existing) => *existing = definition,
                None => definitions.push(definition),
            }
        }

        Ok(Self { definitions })
    }

    pub fn get(&self, key: &str) -> Option<&FieldDefinition> {
        self.definitions.iter().find(|d| d.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_table_compiles() {
        let table = FieldTable::builtin();
        assert_eq!(table.len(), BUILTIN_FIELDS.len());
        assert_eq!(table.get("max_amps_a").unwrap().class(), Numeric);
        assert_eq!(table.get("model").unwrap().class(), Text);
        assert!(table.get("_raw_text").is_none());
    }

    #[test]
    fn test_builtin_keys_unique_and_ordered() {
        let table = FieldTable::builtin();
        let keys: Vec<&str> = table.iter().map(|d| d.key()).collect();
        let expected: Vec<&str> = BUILTIN_FIELDS.iter().map(|(k, _, _)| *k).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_builtin_is_shared() {
        assert!(Arc::ptr_eq(&FieldTable::builtin(), &FieldTable::builtin()));
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let table = FieldTable::builtin();
        let def = table.get("net_capacity_kw").unwrap();
        assert!(def.pattern().is_match("NET CAPACITY 100 KW"));
    }

    #[test]
    fn test_compile_rejects_bad_specs() {
        let bad_regex = FieldSpec::new("x", r"Label\s+(\d+", Numeric);
        assert!(matches!(
            FieldDefinition::compile(&bad_regex),
            Err(ChillerError::FieldDefinition { .. })
        ));

        let no_group = FieldSpec::new("x", r"Label\s+\d+", Numeric);
        assert!(FieldDefinition::compile(&no_group).is_err());

        let reserved = FieldSpec::new("_raw_text", r"(.+)", Text);
        assert!(FieldDefinition::compile(&reserved).is_err());

        let empty = FieldSpec::new(" ", r"(.+)", Text);
        assert!(FieldDefinition::compile(&empty).is_err());
    }

    #[test]
    fn test_new_rejects_duplicate_keys() {
        let specs = vec![
            FieldSpec::new("a", r"A\s+(\d+)", Numeric),
            FieldSpec::new("a", r"B\s+(\d+)", Numeric),
        ];
        let err = FieldTable::new(specs).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid field definition 'a': duplicate key"
        );
    }

    #[test]
    fn test_with_extra_replaces_and_appends() {
        let extra = vec![
            FieldSpec::new("net_capacity_kw", r"Cooling capacity\s+([\d.,]+)", Numeric),
            FieldSpec::new("serial_number", r"Serial\s+(\S+)", Text),
        ];
        let table = FieldTable::with_extra(&extra).unwrap();

        assert_eq!(table.len(), BUILTIN_FIELDS.len() + 1);
        assert_eq!(
            table.get("net_capacity_kw").unwrap().pattern().as_str(),
            r"Cooling capacity\s+([\d.,]+)"
        );

        let position = table.iter().position(|d| d.key() == "net_capacity_kw");
        let builtin_position = BUILTIN_FIELDS
            .iter()
            .position(|(k, _, _)| *k == "net_capacity_kw");
        assert_eq!(position, builtin_position);
        assert_eq!(table.iter().last().unwrap().key(), "serial_number");
    }

    #[test]
    fn test_spec_roundtrip() {
        let table = FieldTable::builtin();
        let spec = table.get("iplv_si").unwrap().spec();
        assert_eq!(spec.key, "iplv_si");
        assert_eq!(spec.class, Numeric);
        assert_eq!(spec.pattern, r"IPLV\.SI\s+(\d[\d,]*(?:\.\d+)?)");
    }
}
