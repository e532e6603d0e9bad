//! End-to-end extraction pipeline.
//!
//! Orchestrates page text acquisition, OCR routing, table extraction,
//! segmentation and field parsing into a single [`ExtractionResult`].
//! The pipeline is synchronous per document; callers parallelize across
//! documents. A run carries no wall-clock state, so re-processing the
//! same bytes with the same configuration yields an identical result.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{MazadError, OcrError, Result};
use crate::listing::{ListingParser, Segmenter};
use crate::models::{
    ExtractionMethod, ExtractionResult, PageRecord, PipelineConfig, TableRecord,
};
use crate::ocr::{ImagePreprocessor, OcrEngine, TesseractEngine};
use crate::pdf::{PageSource, PdfExtractor};
use crate::table::{LatticeTableEngine, TableEngine};

/// Cooperative cancellation handle, checked between pages. Work already
/// completed when cancellation lands is kept; the run still merges,
/// segments and parses whatever it finished.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Document extraction pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    ocr: Arc<dyn OcrEngine>,
    tables: Arc<dyn TableEngine>,
    preprocessor: ImagePreprocessor,
}

impl Pipeline {
    /// Build a pipeline with the default engines from the configuration.
    pub fn new(config: PipelineConfig) -> Self {
        let ocr = Arc::new(TesseractEngine::from_config(&config.ocr));
        Self::with_engines(config, ocr, Arc::new(LatticeTableEngine::new()))
    }

    /// Build a pipeline with injected engines.
    pub fn with_engines(
        config: PipelineConfig,
        ocr: Arc<dyn OcrEngine>,
        tables: Arc<dyn TableEngine>,
    ) -> Self {
        Self {
            config,
            ocr,
            tables,
            preprocessor: ImagePreprocessor::new(),
        }
    }

    /// Process a document file from disk.
    pub fn process_file(&self, path: &Path) -> Result<ExtractionResult> {
        let data = std::fs::read(path)?;
        let source_file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.process_bytes(&data, &source_file)
    }

    /// Process a document from raw bytes.
    pub fn process_bytes(&self, data: &[u8], source_file: &str) -> Result<ExtractionResult> {
        self.process_bytes_with_cancel(data, source_file, &CancelToken::new())
    }

    pub fn process_bytes_with_cancel(
        &self,
        data: &[u8],
        source_file: &str,
        cancel: &CancelToken,
    ) -> Result<ExtractionResult> {
        let mut source = PdfExtractor::new();
        source.load(data).map_err(MazadError::from)?;
        self.process_source(&source, source_file, cancel)
    }

    /// Run the pipeline against an already-loaded page source.
    pub fn process_source(
        &self,
        source: &dyn PageSource,
        source_file: &str,
        cancel: &CancelToken,
    ) -> Result<ExtractionResult> {
        let page_count = source.page_count();
        info!(document = source_file, pages = page_count, "processing document");

        let mut pages = self.native_pages(source, source_file, page_count);

        let blank_count = pages.iter().filter(|p| p.text.trim().is_empty()).count();
        let method = select_method(blank_count, pages.len(), self.config.blank_page_threshold);
        debug!(
            document = source_file,
            blank = blank_count,
            method = method.as_str(),
            "selected extraction method"
        );

        match method {
            ExtractionMethod::Native => {}
            ExtractionMethod::ImageOcr => {
                self.ocr_pages(source, source_file, &mut pages, cancel, |_| true);
            }
            ExtractionMethod::NativeWithOcrFallback => {
                self.ocr_pages(source, source_file, &mut pages, cancel, |p| {
                    p.text.trim().is_empty()
                });
            }
        }

        let tables = if self.config.tables_enabled {
            self.extract_tables(source, source_file, page_count, cancel)
        } else {
            Vec::new()
        };

        let merged = merge_pages(&pages);
        let segments = Segmenter::new(
            self.config.min_segment_len,
            self.config.segment_chunk_size,
        )
        .segment(&merged);

        let parser = ListingParser::new(self.config.segment_sample_len);
        let records = segments
            .iter()
            .map(|segment| parser.parse(segment, source_file))
            .collect::<Vec<_>>();

        info!(
            document = source_file,
            records = records.len(),
            tables = tables.len(),
            "document processed"
        );

        Ok(ExtractionResult {
            source_file: source_file.to_string(),
            method,
            page_count: page_count as usize,
            table_count: tables.len(),
            records,
        })
    }

    fn native_pages(
        &self,
        source: &dyn PageSource,
        source_file: &str,
        page_count: u32,
    ) -> Vec<PageRecord> {
        (1..=page_count)
            .map(|page_number| {
                let text = match source.page_text(page_number) {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(
                            document = source_file,
                            page = page_number,
                            error = %err,
                            "native text extraction failed"
                        );
                        String::new()
                    }
                };
                PageRecord {
                    page_number,
                    text,
                    is_scanned: false,
                }
            })
            .collect()
    }

    /// OCR each page selected by the predicate, in page order. A failed
    /// page keeps empty text; remaining pages are still attempted.
    fn ocr_pages(
        &self,
        source: &dyn PageSource,
        source_file: &str,
        pages: &mut [PageRecord],
        cancel: &CancelToken,
        should_ocr: impl Fn(&PageRecord) -> bool,
    ) {
        for page in pages.iter_mut() {
            if cancel.is_cancelled() {
                warn!(
                    document = source_file,
                    page = page.page_number,
                    "cancelled, skipping remaining OCR"
                );
                return;
            }
            if !should_ocr(page) {
                continue;
            }

            page.is_scanned = true;
            page.text = match self.ocr_page(source, page.page_number) {
                Ok(text) => text,
                Err((stage, err)) => {
                    warn!(
                        document = source_file,
                        page = page.page_number,
                        stage,
                        error = %err,
                        "page OCR failed, recording empty text"
                    );
                    String::new()
                }
            };
        }
    }

    fn ocr_page(
        &self,
        source: &dyn PageSource,
        page_number: u32,
    ) -> std::result::Result<String, (&'static str, MazadError)> {
        let image = source
            .render_page(page_number, self.config.ocr.dpi)
            .map_err(|e| ("render", MazadError::from(e)))?;
        let prepared = self.preprocessor.prepare(&image);
        self.recognize_bounded(prepared)
            .map_err(|e| ("recognize", MazadError::from(e)))
    }

    /// Run recognition, with the configured per-page time budget if any.
    fn recognize_bounded(&self, image: DynamicImage) -> crate::ocr::Result<String> {
        let Some(timeout_ms) = self.config.ocr.page_timeout_ms else {
            return self.ocr.recognize(&image);
        };

        let (tx, rx) = mpsc::channel();
        let engine = Arc::clone(&self.ocr);
        thread::spawn(move || {
            let _ = tx.send(engine.recognize(&image));
        });
        match rx.recv_timeout(Duration::from_millis(timeout_ms)) {
            Ok(result) => result,
            Err(_) => Err(OcrError::Timeout(timeout_ms)),
        }
    }

    /// Best-effort table pass. Any per-page failure yields zero tables
    /// for that page and never affects the text pipeline.
    fn extract_tables(
        &self,
        source: &dyn PageSource,
        source_file: &str,
        page_count: u32,
        cancel: &CancelToken,
    ) -> Vec<TableRecord> {
        let mut tables = Vec::new();
        for page_number in 1..=page_count {
            if cancel.is_cancelled() {
                return tables;
            }
            let image = match source.render_page(page_number, self.config.ocr.dpi) {
                Ok(image) => image,
                Err(err) => {
                    debug!(
                        document = source_file,
                        page = page_number,
                        error = %err,
                        "no page image for table pass"
                    );
                    continue;
                }
            };
            match self.tables.extract(&image, page_number, self.ocr.as_ref()) {
                Ok(mut page_tables) => tables.append(&mut page_tables),
                Err(err) => {
                    debug!(
                        document = source_file,
                        page = page_number,
                        error = %err,
                        "table extraction failed"
                    );
                }
            }
        }
        tables
    }
}

/// Pick the document-level extraction method from the blank-page ratio.
fn select_method(blank_count: usize, page_count: usize, threshold: f32) -> ExtractionMethod {
    if blank_count == 0 || page_count == 0 {
        return ExtractionMethod::Native;
    }
    let ratio = blank_count as f32 / page_count as f32;
    if ratio > threshold {
        ExtractionMethod::ImageOcr
    } else {
        ExtractionMethod::NativeWithOcrFallback
    }
}

/// Merge page texts with page markers so that downstream consumers can
/// trace each segment back to its page.
fn merge_pages(pages: &[PageRecord]) -> String {
    pages
        .iter()
        .map(|page| format!("---PAGE {}---\n{}", page.page_number, page.text))
        .collect::<Vec<_>>()
        .join("\n")
}
