//! Process command - extract lot records from a single catalog file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use mazad_core::error::PdfError;
use mazad_core::pdf::{self, PageSource};
use mazad_core::{CancelToken, ExtractionResult, Pipeline, PipelineConfig};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Skip structural table extraction
    #[arg(long)]
    no_tables: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per lot record
    Csv,
    /// XML output
    Xml,
    /// Plain text summary
    Text,
}

/// A standalone image treated as a one-page scanned document, which
/// routes it straight to the OCR path.
pub struct ImageSource {
    image: DynamicImage,
}

impl ImageSource {
    pub fn open(path: &std::path::Path) -> anyhow::Result<Self> {
        Ok(Self {
            image: image::open(path)?,
        })
    }
}

impl PageSource for ImageSource {
    fn load(&mut self, _data: &[u8]) -> pdf::Result<()> {
        Ok(())
    }

    fn page_count(&self) -> u32 {
        1
    }

    fn page_text(&self, page: u32) -> pdf::Result<String> {
        if page == 1 {
            Ok(String::new())
        } else {
            Err(PdfError::InvalidPage(page))
        }
    }

    fn render_page(&self, page: u32, _dpi: u32) -> pdf::Result<DynamicImage> {
        if page == 1 {
            Ok(self.image.clone())
        } else {
            Err(PdfError::InvalidPage(page))
        }
    }
}

pub fn load_config(config_path: Option<&str>, no_tables: bool) -> anyhow::Result<PipelineConfig> {
    let mut config = if let Some(path) = config_path {
        PipelineConfig::from_file(std::path::Path::new(path))?
    } else {
        PipelineConfig::default()
    };
    if no_tables {
        config.tables_enabled = false;
    }
    Ok(config)
}

pub fn is_image_extension(ext: &str) -> bool {
    matches!(ext, "png" | "jpg" | "jpeg" | "webp" | "tiff" | "tif" | "bmp")
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path, args.no_tables)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    pb.set_message("Loading document...");
    pb.set_position(10);

    let pipeline = Pipeline::new(config);
    let result = extract_file(&pipeline, &args.input, &extension, &pb)?;

    pb.finish_with_message("Done");

    let output = format_result(&result, args.format)?;

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

pub fn extract_file(
    pipeline: &Pipeline,
    input: &std::path::Path,
    extension: &str,
    pb: &ProgressBar,
) -> anyhow::Result<ExtractionResult> {
    let source_file = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    pb.set_message("Extracting...");
    pb.set_position(40);

    let result = match extension {
        "pdf" => pipeline.process_file(input)?,
        ext if is_image_extension(ext) => {
            let source = ImageSource::open(input)?;
            pipeline.process_source(&source, &source_file, &CancelToken::new())?
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    pb.set_position(100);
    Ok(result)
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Xml => Ok(quick_xml::se::to_string(result)?),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "source_file",
        "method",
        "segment_index",
        "lot_id",
        "title",
        "short_description",
        "identifiers",
        "dates",
        "prices",
    ])?;

    for record in &result.records {
        wtr.write_record([
            result.source_file.as_str(),
            result.method.as_str(),
            &record.segment_index.to_string(),
            &record.lot_id,
            &record.title,
            &record.short_description,
            &record.identifiers.join(";"),
            &record.dates.join(";"),
            &record.prices.join(";"),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Document: {}\n", result.source_file));
    output.push_str(&format!("Method: {}\n", result.method));
    output.push_str(&format!("Pages: {}\n", result.page_count));
    output.push_str(&format!("Tables: {}\n", result.table_count));
    output.push_str(&format!("Records: {}\n", result.records.len()));

    for record in &result.records {
        output.push('\n');
        output.push_str(&format!("Lot {}:\n", record.lot_id));
        if !record.title.is_empty() {
            output.push_str(&format!("  Title: {}\n", record.title));
        }
        if !record.identifiers.is_empty() {
            output.push_str(&format!("  Identifiers: {}\n", record.identifiers.join(", ")));
        }
        if !record.dates.is_empty() {
            output.push_str(&format!("  Dates: {}\n", record.dates.join(", ")));
        }
        if !record.prices.is_empty() {
            output.push_str(&format!("  Prices: {}\n", record.prices.join(", ")));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazad_core::{ExtractionMethod, ListingRecord};

    fn sample_result() -> ExtractionResult {
        ExtractionResult {
            source_file: "catalog.pdf".to_string(),
            method: ExtractionMethod::Native,
            page_count: 1,
            table_count: 0,
            records: vec![ListingRecord {
                segment_index: 0,
                lot_id: "12".to_string(),
                title: "Peugeot 307 2015".to_string(),
                short_description: "Peugeot 307 2015".to_string(),
                full_text: "Peugeot 307 2015".to_string(),
                identifiers: vec!["VF32A5FXF12345678".to_string()],
                dates: vec!["12/08/2025".to_string()],
                prices: vec!["15000".to_string()],
                source_file: "catalog.pdf".to_string(),
            }],
        }
    }

    #[test]
    fn test_csv_output_one_row_per_record() {
        let output = format_csv(&sample_result()).unwrap();
        let lines: Vec<&str> = output.trim().lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("source_file,method"));
        assert!(lines[1].contains("Peugeot 307 2015"));
        assert!(lines[1].contains("15000"));
    }

    #[test]
    fn test_text_output_summary() {
        let output = format_text(&sample_result());
        assert!(output.contains("Method: native"));
        assert!(output.contains("Lot 12:"));
        assert!(output.contains("Prices: 15000"));
    }

    #[test]
    fn test_image_extension_detection() {
        assert!(is_image_extension("png"));
        assert!(is_image_extension("jpeg"));
        assert!(!is_image_extension("pdf"));
        assert!(!is_image_extension("docx"));
    }
}
