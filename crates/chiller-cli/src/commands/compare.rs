//! Compare command - side-by-side comparison and OPEX estimate for two datasheets.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use chiller_core::compare::OpexRow;
use chiller_core::{
    ComparisonTable, DatasheetParser, ExtractionResult, FieldTable, OpexInputs, OpexSummary,
    ValueClass,
};

use super::config::load_config;
use super::extract::{extract_file, OutputFormat};

/// Arguments for the compare command.
#[derive(Args)]
pub struct CompareArgs {
    /// Datasheet for option A
    #[arg(required = true)]
    input_a: PathBuf,

    /// Datasheet for option B
    #[arg(required = true)]
    input_b: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Electricity price per kWh
    #[arg(long)]
    price: Option<f64>,

    /// Equivalent full-load hours per year
    #[arg(long)]
    eflh: Option<f64>,

    /// Analysis period in years
    #[arg(long)]
    years: Option<u32>,

    /// Currency label for costs
    #[arg(long)]
    currency: Option<String>,

    /// Purchase cost of option A
    #[arg(long)]
    capex_a: Option<f64>,

    /// Purchase cost of option B
    #[arg(long)]
    capex_b: Option<f64>,

    /// Override an extracted value of option A (key=value, empty value clears)
    #[arg(long = "set-a", value_name = "KEY=VALUE")]
    set_a: Vec<String>,

    /// Override an extracted value of option B (key=value, empty value clears)
    #[arg(long = "set-b", value_name = "KEY=VALUE")]
    set_b: Vec<String>,
}

#[derive(Serialize)]
struct ComparisonReport<'a> {
    generated_at: String,
    comparison: &'a ComparisonTable,
    opex: &'a OpexSummary,
}

pub async fn run(args: CompareArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    for input in [&args.input_a, &args.input_b] {
        if !input.exists() {
            anyhow::bail!("Input file not found: {}", input.display());
        }
    }

    let parser = DatasheetParser::new().with_table(config.field_table()?);

    info!("Extracting option A: {}", args.input_a.display());
    let mut a = extract_file(&args.input_a, &parser)?;
    info!("Extracting option B: {}", args.input_b.display());
    let mut b = extract_file(&args.input_b, &parser)?;

    apply_overrides(&mut a, &args.set_a, parser.table())?;
    apply_overrides(&mut b, &args.set_b, parser.table())?;

    let inputs = opex_inputs(&args, config.opex.clone());
    let comparison = ComparisonTable::build(&a, &b);
    let opex = OpexSummary::compute(&a, &b, &inputs);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&ComparisonReport {
            generated_at: Utc::now().to_rfc3339(),
            comparison: &comparison,
            opex: &opex,
        })?,
        OutputFormat::Csv => format_csv(&comparison, &opex)?,
        OutputFormat::Text => format_text(&comparison, &opex),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Flags take precedence over configured defaults.
fn opex_inputs(args: &CompareArgs, mut inputs: OpexInputs) -> OpexInputs {
    if let Some(price) = args.price {
        inputs.electricity_price = price;
    }
    if let Some(eflh) = args.eflh {
        inputs.eflh = eflh;
    }
    if let Some(years) = args.years {
        inputs.years = years;
    }
    if let Some(currency) = &args.currency {
        inputs.currency = currency.clone();
    }
    if let Some(capex) = args.capex_a {
        inputs.capex_a = capex;
    }
    if let Some(capex) = args.capex_b {
        inputs.capex_b = capex;
    }
    inputs
}

/// Apply `key=value` edits to an extracted record.
///
/// Known keys are coerced with their field class; unknown keys are kept as
/// text.
fn apply_overrides(
    record: &mut ExtractionResult,
    overrides: &[String],
    table: &FieldTable,
) -> anyhow::Result<()> {
    for entry in overrides {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid override '{}', expected KEY=VALUE", entry))?;
        let key = key.trim();
        if key.is_empty() || key.starts_with('_') {
            anyhow::bail!("Invalid override key in '{}'", entry);
        }

        if value.trim().is_empty() {
            if record.remove_field(key).is_some() {
                info!("Cleared {}", key);
            }
            continue;
        }

        let class = table
            .get(key)
            .map(|d| d.class())
            .unwrap_or(ValueClass::Text);

        match record.set_field(key, value, class) {
            Some(stored) => info!("Override {} = {}", key, stored),
            None => info!("Cleared {} ({:?} has no {} value)", key, value, class),
        }
    }
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn format_csv(comparison: &ComparisonTable, opex: &OpexSummary) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "metric",
        comparison.label_a.as_str(),
        comparison.label_b.as_str(),
        "b_minus_a",
    ])?;
    for row in &comparison.rows {
        wtr.write_record([
            row.label.to_string(),
            row.a.as_ref().map(|v| v.to_string()).unwrap_or_default(),
            row.b.as_ref().map(|v| v.to_string()).unwrap_or_default(),
            row.difference.map(|d| d.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.write_record(["item", "option_a", "option_b", ""])?;
    for OpexRow { item, a, b } in opex.rows() {
        wtr.write_record([item, cell(a), cell(b), String::new()])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(comparison: &ComparisonTable, opex: &OpexSummary) -> String {
    let mut output = String::new();

    let label_width = comparison
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0);

    output.push_str(&format!(
        "{} A: {}\n{} B: {}\n\n",
        style("Option").bold(),
        comparison.label_a,
        style("Option").bold(),
        comparison.label_b
    ));

    output.push_str(&format!(
        "{:<lw$}  {:>24}  {:>24}  {:>12}\n",
        "Metric",
        "A",
        "B",
        "B - A",
        lw = label_width
    ));
    for row in &comparison.rows {
        output.push_str(&format!(
            "{:<lw$}  {:>24}  {:>24}  {:>12}\n",
            row.label,
            row.a.as_ref().map(|v| v.to_string()).unwrap_or_default(),
            row.b.as_ref().map(|v| v.to_string()).unwrap_or_default(),
            row.difference.map(|d| format!("{:+.2}", d)).unwrap_or_default(),
            lw = label_width
        ));
    }

    output.push_str(&format!("\n{}\n", style("OPEX & simple payback").bold()));
    for OpexRow { item, a, b } in opex.rows() {
        output.push_str(&format!("  {:<40}  {:>16}  {:>16}\n", item, cell(a), cell(b)));
    }

    output
}
