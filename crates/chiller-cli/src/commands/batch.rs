//! Batch processing command for multiple datasheets.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, warn};

use chiller_core::{DatasheetParser, ExtractionResult, FieldTable};

use super::config::load_config;
use super::extract::{extract_file, format_result, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("pdf")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(DatasheetParser::new().with_table(config.field_table()?));
    let deadline = match config.extraction.timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    let handles: Vec<(PathBuf, JoinHandle<(anyhow::Result<ExtractionResult>, u64)>)> = files
        .iter()
        .cloned()
        .map(|path| {
            let task = process_file(
                path.clone(),
                Arc::clone(&parser),
                Arc::clone(&semaphore),
                deadline,
            );
            (path, tokio::spawn(task))
        })
        .collect();

    let mut results = Vec::with_capacity(files.len());
    let mut pending = handles.into_iter();
    while let Some((path, handle)) = pending.next() {
        let processed = settle(path, handle.await);

        if let Some(error_msg) = &processed.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", processed.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", processed.path.display(), error_msg);
                for (_, rest) in pending.by_ref() {
                    rest.abort();
                }
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }

        results.push(processed);
        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.result.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for processed in &successful {
            if let Some(result) = &processed.result {
                let output_name = processed
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("datasheet");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                let content = format_result(result, parser.table(), args.format, false)?;
                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results, parser.table())?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for processed in &failed {
            println!(
                "  - {}: {}",
                processed.path.display(),
                processed.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Wait for a worker slot, then extract one file under the deadline.
async fn process_file(
    path: PathBuf,
    parser: Arc<DatasheetParser>,
    semaphore: Arc<Semaphore>,
    deadline: Option<Duration>,
) -> (anyhow::Result<ExtractionResult>, u64) {
    let permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => return (Err(e.into()), 0),
    };

    let file_start = Instant::now();
    let outcome = run_with_deadline(move || extract_file(&path, &parser), permit, deadline).await;
    (outcome, file_start.elapsed().as_millis() as u64)
}

/// Run blocking work on the blocking pool, giving up after `deadline`.
///
/// An expired deadline is reported like an unreadable document. The blocking
/// work cannot be cancelled; it keeps `permit` until it actually finishes so
/// abandoned extractions still count against the worker limit.
async fn run_with_deadline<F>(
    work: F,
    permit: OwnedSemaphorePermit,
    deadline: Option<Duration>,
) -> anyhow::Result<ExtractionResult>
where
    F: FnOnce() -> anyhow::Result<ExtractionResult> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    });

    match deadline {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined?,
            Err(_) => anyhow::bail!(
                "document unreadable: extraction did not finish within {}s",
                limit.as_secs()
            ),
        },
        None => task.await?,
    }
}

/// Turn a finished worker into a per-file result. A worker that panicked is a
/// failure of that file only.
fn settle(
    path: PathBuf,
    joined: Result<(anyhow::Result<ExtractionResult>, u64), JoinError>,
) -> ProcessResult {
    let (outcome, processing_time_ms) = match joined {
        Ok(finished) => finished,
        Err(e) => (Err(anyhow::anyhow!("worker failed: {}", e)), 0),
    };

    match outcome {
        Ok(result) => ProcessResult {
            path,
            result: Some(result),
            error: None,
            processing_time_ms,
        },
        Err(e) => ProcessResult {
            path,
            result: None,
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}

fn write_summary(
    path: &Path,
    results: &[ProcessResult],
    table: &FieldTable,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec![
        "filename".to_string(),
        "status".to_string(),
        "fields_found".to_string(),
    ];
    header.extend(table.iter().map(|d| d.key().to_string()));
    header.push("processing_time_ms".to_string());
    header.push("error".to_string());
    wtr.write_record(&header)?;

    for processed in results {
        let filename = processed
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let mut row = vec![filename.to_string()];
        match &processed.result {
            Some(result) => {
                row.push("success".to_string());
                row.push(result.len().to_string());
                row.extend(table.iter().map(|d| {
                    result
                        .get(d.key())
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                }));
            }
            None => {
                row.push("error".to_string());
                row.push(String::new());
                row.extend(table.iter().map(|_| String::new()));
            }
        }
        row.push(processed.processing_time_ms.to_string());
        row.push(processed.error.clone().unwrap_or_default());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreadable() -> anyhow::Result<ExtractionResult> {
        anyhow::bail!("document unreadable: test")
    }

    async fn crashing_worker() -> (anyhow::Result<ExtractionResult>, u64) {
        panic!("extractor crashed")
    }

    #[tokio::test]
    async fn test_timed_out_work_keeps_its_slot() {
        let semaphore = Arc::new(Semaphore::new(1));
        let permit = Arc::clone(&semaphore).acquire_owned().await.unwrap();

        let outcome = run_with_deadline(
            || {
                std::thread::sleep(Duration::from_millis(300));
                unreadable()
            },
            permit,
            Some(Duration::from_millis(10)),
        )
        .await;

        let err = outcome.unwrap_err().to_string();
        assert!(err.contains("did not finish"), "{}", err);
        assert_eq!(semaphore.available_permits(), 0);

        // The slot comes back once the abandoned work really ends
        let _permit = tokio::time::timeout(Duration::from_secs(5), semaphore.acquire())
            .await
            .expect("slot released after work finished")
            .unwrap();
    }

    #[tokio::test]
    async fn test_work_within_deadline() {
        let semaphore = Arc::new(Semaphore::new(1));
        let permit = Arc::clone(&semaphore).acquire_owned().await.unwrap();

        let result = run_with_deadline(
            || Ok(DatasheetParser::new().parse("Net capacity 10 kW")),
            permit,
            Some(Duration::from_secs(5)),
        )
        .await
        .unwrap();

        assert_eq!(result.number("net_capacity_kw"), Some(10.0));
        assert_eq!(semaphore.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_panicking_worker_fails_only_its_file() {
        let joined = tokio::spawn(crashing_worker()).await;

        let processed = settle(PathBuf::from("a.pdf"), joined);
        assert!(processed.result.is_none());
        assert!(processed.error.unwrap().starts_with("worker failed"));
        assert_eq!(processed.path, PathBuf::from("a.pdf"));
    }

    #[tokio::test]
    async fn test_panic_in_blocking_work_is_an_error() {
        let semaphore = Arc::new(Semaphore::new(1));
        let permit = Arc::clone(&semaphore).acquire_owned().await.unwrap();

        let outcome = run_with_deadline(
            || -> anyhow::Result<ExtractionResult> { panic!("pdf backend crashed") },
            permit,
            None,
        ).await;

        assert!(outcome.is_err());
        assert_eq!(semaphore.available_permits(), 1);
    }

    #[test]
    fn test_settle_keeps_extraction_error() {
        let processed = settle(PathBuf::from("b.pdf"), Ok((unreadable(), 12)));
        assert_eq!(processed.error.as_deref(), Some("document unreadable: test"));
        assert_eq!(processed.processing_time_ms, 12);
    }
}
