//! Operating-cost estimate and simple payback for two options.

use serde::{Deserialize, Serialize};

use crate::models::datasheet::{ExtractionResult, FieldValue};

/// Project assumptions for the OPEX estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpexInputs {
    /// Electricity price per kWh.
    pub electricity_price: f64,

    /// Equivalent full-load hours per year.
    pub eflh: f64,

    /// Analysis period in years.
    pub years: u32,

    /// Display-only currency symbol.
    pub currency: String,

    /// Purchase cost of option A.
    pub capex_a: f64,

    /// Purchase cost of option B.
    pub capex_b: f64,
}

impl Default for OpexInputs {
    fn default() -> Self {
        Self {
            electricity_price: 0.12,
            eflh: 2500.0,
            years: 10,
            currency: "€".to_string(),
            capex_a: 0.0,
            capex_b: 0.0,
        }
    }
}

/// Per-option energy figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OptionCost {
    /// Design power used for the estimate (kW).
    pub power_kw: Option<f64>,
    pub annual_kwh: Option<f64>,
    pub annual_cost: Option<f64>,
    pub period_cost: Option<f64>,
}

impl OptionCost {
    fn compute(record: &ExtractionResult, inputs: &OpexInputs) -> Self {
        let power_kw = design_power(record);
        let annual_kwh = power_kw.map(|p| p * inputs.eflh);
        let annual_cost = annual_kwh.map(|kwh| kwh * inputs.electricity_price);
        let period_cost = annual_cost.map(|c| c * f64::from(inputs.years));

        Self {
            power_kw,
            annual_kwh,
            annual_cost,
            period_cost,
        }
    }
}

/// One labelled line of the OPEX summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpexRow {
    pub item: String,
    pub a: Option<f64>,
    pub b: Option<f64>,
}

/// OPEX and simple payback comparison of option A against option B.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpexSummary {
    pub inputs: OpexInputs,
    pub a: OptionCost,
    pub b: OptionCost,
    /// Annual cost A - B; positive means B is cheaper to run.
    pub annual_savings: Option<f64>,
    /// CAPEX B - A.
    pub capex_delta: f64,
    /// Years for B's savings to repay its extra CAPEX.
    pub payback_years: Option<f64>,
}

impl OpexSummary {
    pub fn compute(a: &ExtractionResult, b: &ExtractionResult, inputs: &OpexInputs) -> Self {
        let cost_a = OptionCost::compute(a, inputs);
        let cost_b = OptionCost::compute(b, inputs);

        let annual_savings = match (cost_a.annual_cost, cost_b.annual_cost) {
            (Some(ca), Some(cb)) => Some(ca - cb),
            _ => None,
        };
        let capex_delta = inputs.capex_b - inputs.capex_a;

        let payback_years = match annual_savings {
            Some(savings) if savings > 0.0 && capex_delta > 0.0 => Some(capex_delta / savings),
            _ => None,
        };

        Self {
            inputs: inputs.clone(),
            a: cost_a,
            b: cost_b,
            annual_savings,
            capex_delta,
            payback_years,
        }
    }

    /// Summary lines in display order. Difference lines carry their value
    /// in the B column only.
    pub fn rows(&self) -> Vec<OpexRow> {
        let currency = &self.inputs.currency;
        let row = |item: String, a: Option<f64>, b: Option<f64>| OpexRow { item, a, b };

        vec![
            row("Power used (kW)".to_string(), self.a.power_kw, self.b.power_kw),
            row(
                format!("Annual energy (kWh) @ {:.0} h/y", self.inputs.eflh),
                self.a.annual_kwh,
                self.b.annual_kwh,
            ),
            row(
                format!("Annual energy cost ({})", currency),
                self.a.annual_cost,
                self.b.annual_cost,
            ),
            row(
                format!("{}-year energy cost ({})", self.inputs.years, currency),
                self.a.period_cost,
                self.b.period_cost,
            ),
            row(
                format!("Annual savings (A - B) ({})", currency),
                None,
                self.annual_savings,
            ),
            row(
                format!("CAPEX delta (B - A) ({})", currency),
                None,
                Some(self.capex_delta),
            ),
            row("Simple payback (years)".to_string(), None, self.payback_years),
        ]
    }
}

/// Design power of a unit: the datasheet's `power_kw`, else capacity / EER.
///
/// A net value of zero defers to the gross one, which is taken as-is. No
/// power when capacity is missing or the EER is missing or zero.
fn design_power(record: &ExtractionResult) -> Option<f64> {
    let num = |key: &str| record.get(key).and_then(FieldValue::to_number);
    let net_or_gross = |net: &str, gross: &str| {
        num(net).filter(|n| *n != 0.0).or_else(|| num(gross))
    };

    if let Some(power) = num("power_kw") {
        return Some(power);
    }

    let capacity = net_or_gross("net_capacity_kw", "gross_capacity_kw")?;
    let eer = net_or_gross("net_eer_kw_per_kw", "gross_eer_kw_per_kw").filter(|e| *e != 0.0)?;

    Some(capacity / eer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::datasheet::ValueClass;
    use pretty_assertions::assert_eq;

    fn record(values: &[(&str, &str)]) -> ExtractionResult {
        let mut result = ExtractionResult::new("");
        for (key, raw) in values {
            result.set_field(key, raw, ValueClass::Numeric);
        }
        result
    }

    fn inputs() -> OpexInputs {
        OpexInputs {
            electricity_price: 0.1,
            eflh: 2000.0,
            years: 10,
            currency: "EUR".to_string(),
            capex_a: 100_000.0,
            capex_b: 110_000.0,
        }
    }

    #[test]
    fn test_power_from_datasheet() {
        let a = record(&[("power_kw", "200"), ("net_capacity_kw", "600")]);
        assert_eq!(design_power(&a), Some(200.0));
    }

    #[test]
    fn test_power_from_capacity_and_eer() {
        let a = record(&[("net_capacity_kw", "600"), ("net_eer_kw_per_kw", "3")]);
        assert_eq!(design_power(&a), Some(200.0));

        let gross = record(&[("gross_capacity_kw", "450"), ("gross_eer_kw_per_kw", "3")]);
        assert_eq!(design_power(&gross), Some(150.0));
    }

    #[test]
    fn test_zero_net_values_defer_to_gross() {
        let a = record(&[
            ("net_capacity_kw", "0"),
            ("gross_capacity_kw", "300"),
            ("net_eer_kw_per_kw", "0"),
            ("gross_eer_kw_per_kw", "3"),
        ]);
        assert_eq!(design_power(&a), Some(100.0));

        let zero_eer = record(&[("net_capacity_kw", "300"), ("gross_eer_kw_per_kw", "0")]);
        assert_eq!(design_power(&zero_eer), None);

        let no_capacity = record(&[("net_eer_kw_per_kw", "3")]);
        assert_eq!(design_power(&no_capacity), None);

        assert_eq!(design_power(&record(&[])), None);
    }

    #[test]
    fn test_zero_power_and_capacity_are_kept() {
        let zero_power = record(&[
            ("power_kw", "0"),
            ("net_capacity_kw", "600"),
            ("net_eer_kw_per_kw", "3"),
        ]);
        assert_eq!(design_power(&zero_power), Some(0.0));

        let zero_capacity = record(&[
            ("net_capacity_kw", "0"),
            ("gross_capacity_kw", "0"),
            ("net_eer_kw_per_kw", "3"),
        ]);
        assert_eq!(design_power(&zero_capacity), Some(0.0));

        let summary = OpexSummary::compute(&zero_power, &zero_capacity, &inputs());
        assert_eq!(summary.a.power_kw, Some(0.0));
        assert_eq!(summary.a.annual_cost, Some(0.0));
    }

    #[test]
    fn test_summary_and_payback() {
        let a = record(&[("power_kw", "250")]);
        let b = record(&[("power_kw", "200")]);

        let summary = OpexSummary::compute(&a, &b, &inputs());

        assert_eq!(summary.a.annual_kwh, Some(500_000.0));
        assert_eq!(summary.b.annual_kwh, Some(400_000.0));
        assert_eq!(summary.a.annual_cost, Some(50_000.0));
        assert_eq!(summary.b.annual_cost, Some(40_000.0));
        assert_eq!(summary.b.period_cost, Some(400_000.0));
        assert_eq!(summary.annual_savings, Some(10_000.0));
        assert_eq!(summary.capex_delta, 10_000.0);
        assert_eq!(summary.payback_years, Some(1.0));
    }

    #[test]
    fn test_no_payback_when_b_costs_more_to_run() {
        let a = record(&[("power_kw", "200")]);
        let b = record(&[("power_kw", "250")]);

        let summary = OpexSummary::compute(&a, &b, &inputs());
        assert_eq!(summary.annual_savings, Some(-10_000.0));
        assert_eq!(summary.payback_years, None);
    }

    #[test]
    fn test_no_payback_without_capex_delta() {
        let a = record(&[("power_kw", "250")]);
        let b = record(&[("power_kw", "200")]);

        let summary = OpexSummary::compute(&a, &b, &OpexInputs::default());
        assert_eq!(summary.capex_delta, 0.0);
        assert_eq!(summary.payback_years, None);
    }

    #[test]
    fn test_missing_power_leaves_gaps() {
        let a = record(&[("power_kw", "250")]);
        let b = record(&[]);

        let summary = OpexSummary::compute(&a, &b, &inputs());
        assert_eq!(summary.b.annual_cost, None);
        assert_eq!(summary.annual_savings, None);
        assert_eq!(summary.payback_years, None);
    }

    #[test]
    fn test_rows_labels() {
        let summary = OpexSummary::compute(&record(&[]), &record(&[]), &inputs());
        let items: Vec<String> = summary.rows().into_iter().map(|r| r.item).collect();

        assert_eq!(
            items,
            vec![
                "Power used (kW)",
                "Annual energy (kWh) @ 2000 h/y",
                "Annual energy cost (EUR)",
                "10-year energy cost (EUR)",
                "Annual savings (A - B) (EUR)",
                "CAPEX delta (B - A) (EUR)",
                "Simple payback (years)",
            ]
        );
    }
}
