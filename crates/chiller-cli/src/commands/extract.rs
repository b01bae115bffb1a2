//! Extract command - pull datasheet fields from a single PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use chiller_core::datasheet::DatasheetExtractor;
use chiller_core::{DatasheetParser, ExtractionResult, FieldTable, PdfExtractor};

use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input datasheet (PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include the joined document text in the output
    #[arg(long)]
    raw: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Extracting datasheet fields...");

    let parser = DatasheetParser::new().with_table(config.field_table()?);
    let result = extract_file(&args.input, &parser)?;

    pb.finish_and_clear();

    let output = format_result(&result, parser.table(), args.format, args.raw)?;

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

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read and extract one datasheet, tagging the result with the file name.
pub fn extract_file(path: &Path, parser: &DatasheetParser) -> anyhow::Result<ExtractionResult> {
    let data = fs::read(path)?;
    let mut processor = PdfExtractor::new();
    let result = parser.extract(&data, &mut processor)?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("datasheet.pdf");

    debug!("{}: {} fields found", name, result.len());
    Ok(result.with_source(name))
}

pub fn format_result(
    result: &ExtractionResult,
    table: &FieldTable,
    format: OutputFormat,
    include_raw: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(result, include_raw),
        OutputFormat::Csv => format_csv(result, table),
        OutputFormat::Text => Ok(format_text(result, table, include_raw)),
    }
}

fn format_json(result: &ExtractionResult, include_raw: bool) -> anyhow::Result<String> {
    let mut json = serde_json::to_value(result)?;
    if !include_raw {
        if let Some(obj) = json.as_object_mut() {
            obj.remove("_raw_text");
        }
    }
    Ok(serde_json::to_string_pretty(&json)?)
}

fn format_csv(result: &ExtractionResult, table: &FieldTable) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["file"];
    header.extend(table.iter().map(|d| d.key()));
    wtr.write_record(&header)?;

    let mut row = vec![result.source().unwrap_or("").to_string()];
    row.extend(
        table
            .iter()
            .map(|d| result.get(d.key()).map(|v| v.to_string()).unwrap_or_default()),
    );
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult, table: &FieldTable, include_raw: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Datasheet: {}\n",
        result.source().unwrap_or("(unnamed)")
    ));
    output.push_str(&format!(
        "Fields found: {} of {}\n\n",
        result.len(),
        table.len()
    ));

    let width = table.iter().map(|d| d.key().len()).max().unwrap_or(0);
    for definition in table.iter() {
        let value = result
            .get(definition.key())
            .map(|v| v.to_string())
            .unwrap_or_default();
        output.push_str(&format!("  {:<width$}  {}\n", definition.key(), value, width = width));
    }

    if include_raw {
        output.push_str("\nRaw text:\n");
        output.push_str(result.raw_text());
        output.push('\n');
    }

    output
}
