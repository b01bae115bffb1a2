//! Fields command - list the effective field table.

use clap::Args;
use serde::Serialize;

use chiller_core::{FieldTable, ValueClass};

use super::config::load_config;
use super::extract::OutputFormat;

/// Arguments for the fields command.
#[derive(Args)]
pub struct FieldsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Serialize)]
struct FieldRow<'a> {
    key: &'a str,
    class: ValueClass,
    pattern: &'a str,
}

pub async fn run(args: FieldsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let table = config.field_table()?;

    println!("{}", format_table(&table, args.format)?);

    Ok(())
}

fn rows(table: &FieldTable) -> Vec<FieldRow<'_>> {
    table
        .iter()
        .map(|d| FieldRow {
            key: d.key(),
            class: d.class(),
            pattern: d.pattern().as_str(),
        })
        .collect()
}

fn format_table(table: &FieldTable, format: OutputFormat) -> anyhow::Result<String> {
    let rows = rows(table);

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["key", "class", "pattern"])?;
            for row in &rows {
                let class = row.class.to_string();
                wtr.write_record([row.key, class.as_str(), row.pattern])?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
            let mut output = String::new();
            for row in &rows {
                output.push_str(&format!(
                    "{:<width$}  {:<7}  {}\n",
                    row.key,
                    row.class.to_string(),
                    row.pattern,
                    width = width
                ));
            }
            Ok(output)
        }
    }
}
