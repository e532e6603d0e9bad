//! Batch processing command for multiple catalog files.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use mazad_core::{ExtractionResult, Pipeline};

use super::process::{self, OutputFormat};

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

    /// Skip structural table extraction
    #[arg(long)]
    no_tables: bool,
}

/// Result of processing a single file.
struct BatchItem {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = process::load_config(config_path, args.no_tables)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            ext == "pdf" || process::is_image_extension(&ext)
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
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let pipeline = Arc::new(Pipeline::new(config));
    let jobs = args.jobs.max(1);

    // Process files in parallel on blocking worker threads, bounded by
    // the requested job count.
    let mut items: Vec<BatchItem> = stream::iter(files)
        .map(|path| {
            let pipeline = Arc::clone(&pipeline);
            let pb = overall_pb.clone();
            let fallback_path = path.clone();
            async move {
                let item = tokio::task::spawn_blocking(move || {
                    let file_start = Instant::now();
                    let result = process_one(&pipeline, &path);
                    let processing_time_ms = file_start.elapsed().as_millis() as u64;
                    match result {
                        Ok(result) => BatchItem {
                            path,
                            result: Some(result),
                            error: None,
                            processing_time_ms,
                        },
                        Err(e) => BatchItem {
                            path,
                            result: None,
                            error: Some(e.to_string()),
                            processing_time_ms,
                        },
                    }
                })
                .await
                .unwrap_or_else(|e| BatchItem {
                    path: fallback_path,
                    result: None,
                    error: Some(format!("worker failed: {}", e)),
                    processing_time_ms: 0,
                });
                pb.inc(1);
                item
            }
        })
        .buffer_unordered(jobs)
        .collect()
        .await;

    overall_pb.finish_with_message("Complete");

    items.sort_by(|a, b| a.path.cmp(&b.path));

    if !args.continue_on_error {
        if let Some(failed) = items.iter().find(|i| i.error.is_some()) {
            anyhow::bail!(
                "Processing failed for {}: {}",
                failed.path.display(),
                failed.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let successful: Vec<_> = items.iter().filter(|i| i.result.is_some()).collect();
    let failed: Vec<_> = items.iter().filter(|i| i.error.is_some()).collect();

    for item in &successful {
        if let (Some(result), Some(output_dir)) = (&item.result, &args.output_dir) {
            let output_name = item
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("catalog");

            let extension = match args.format {
                OutputFormat::Json => "json",
                OutputFormat::Csv => "csv",
                OutputFormat::Xml => "xml",
                OutputFormat::Text => "txt",
            };

            let output_path = output_dir.join(format!("{}.{}", output_name, extension));
            let content = process::format_result(result, args.format)?;

            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &items)?;
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
        items.len(),
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
        for item in &failed {
            warn!("failed: {}", item.path.display());
            println!(
                "  - {}: {}",
                item.path.display(),
                item.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_one(pipeline: &Pipeline, path: &PathBuf) -> anyhow::Result<ExtractionResult> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let pb = ProgressBar::hidden();
    process::extract_file(pipeline, path, &extension, &pb)
}

fn write_summary(path: &PathBuf, items: &[BatchItem]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let processed_at = chrono::Utc::now().to_rfc3339();

    wtr.write_record([
        "filename",
        "status",
        "method",
        "pages",
        "tables",
        "records",
        "processing_time_ms",
        "processed_at",
        "error",
    ])?;

    for item in items {
        let filename = item
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(result) = &item.result {
            wtr.write_record([
                filename,
                "success",
                result.method.as_str(),
                &result.page_count.to_string(),
                &result.table_count.to_string(),
                &result.records.len().to_string(),
                &item.processing_time_ms.to_string(),
                &processed_at,
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                &item.processing_time_ms.to_string(),
                &processed_at,
                item.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
