//! Side-by-side comparison of two extracted datasheets.

use serde::Serialize;

use crate::models::datasheet::{ExtractionResult, FieldValue};

/// Rows shown in a comparison, in display order.
pub const DISPLAY_FIELDS: &[(&str, &str)] = &[
    ("Model", "model"),
    ("Range / Series", "range"),
    ("Chiller model", "chiller_model"),
    ("Application", "unit_application"),
    ("Compressor type", "compressor_type"),
    ("Refrigerant", "refrigerant"),
    ("Refrigerant GWP", "refrigerant_gwp"),
    ("Electrical supply", "electrical_supply"),
    ("Design ambient (°C)", "design_ambient_c"),
    ("LWT (°C)", "lwt_c"),
    ("EWT (°C)", "ewt_c"),
    ("Fluid", "fluid"),
    ("Antifreeze (%)", "antifreeze_pct"),
    ("Elevation (m)", "elevation_m"),
    ("Net capacity (kW)", "net_capacity_kw"),
    ("Gross capacity (kW)", "gross_capacity_kw"),
    ("Power input (kW)", "power_kw"),
    ("Net EER (kW/kW)", "net_eer_kw_per_kw"),
    ("Gross EER (kW/kW)", "gross_eer_kw_per_kw"),
    ("Design flow (L/s)", "design_flow_ls"),
    ("Evap ΔP (kPa)", "evap_pressure_drop_kpa"),
    ("Sound power (dBA)", "sound_power_dba"),
    ("Sound pressure (dBA)", "sound_pressure_dba"),
    ("IPLV.SI", "iplv_si"),
    ("NPLV.SI", "nplv_si"),
    ("Start-up current (A)", "startup_current_a"),
    ("Running current (A)", "running_current_a"),
    ("Max amps (A)", "max_amps_a"),
    ("Max power (kW)", "max_power_kw"),
    ("cos φ", "cos_phi"),
    ("Length (mm)", "length_mm"),
    ("Width (mm)", "width_mm"),
    ("Height (mm)", "height_mm"),
    ("Shipping weight (kg)", "shipping_weight_kg"),
    ("Operating weight (kg)", "operating_weight_kg"),
];

/// One metric compared across both options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub label: &'static str,
    pub key: &'static str,
    pub a: Option<FieldValue>,
    pub b: Option<FieldValue>,
    /// `b - a`, when both sides read as numbers.
    pub difference: Option<f64>,
}

/// Comparison of option A against option B.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub label_a: String,
    pub label_b: String,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Compare two records over [`DISPLAY_FIELDS`].
    ///
    /// Column labels default to the records' source names, falling back to
    /// "Option A" / "Option B".
    pub fn build(a: &ExtractionResult, b: &ExtractionResult) -> Self {
        let rows = DISPLAY_FIELDS
            .iter()
            .map(|&(label, key)| {
                let va = a.get(key).cloned();
                let vb = b.get(key).cloned();
                let difference = match (
                    va.as_ref().and_then(FieldValue::to_number),
                    vb.as_ref().and_then(FieldValue::to_number),
                ) {
                    (Some(na), Some(nb)) => Some(nb - na),
                    _ => None,
                };

                ComparisonRow {
                    label,
                    key,
                    a: va,
                    b: vb,
                    difference,
                }
            })
            .collect();

        Self {
            label_a: a.source().unwrap_or("Option A").to_string(),
            label_b: b.source().unwrap_or("Option B").to_string(),
            rows,
        }
    }

    pub fn row(&self, key: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.key == key)
    }
}
