//! Core library for auction catalog extraction.
//!
//! This crate provides:
//! - PDF processing (native text layers and page images)
//! - OCR routing with scan preprocessing (deskew, equalize, binarize)
//! - Bordered table extraction from page images
//! - Lot segmentation and rule-based field extraction (lot ids, VINs,
//!   dates, amounts) for Arabic/French auction catalogs

pub mod error;
pub mod listing;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod table;

pub use error::{MazadError, Result};
pub use listing::{ListingParser, Segmenter};
pub use models::{
    ExtractionMethod, ExtractionResult, ListingRecord, OcrConfig, PageRecord, PageSegMode,
    PipelineConfig, Segment, TableRecord,
};
pub use ocr::{ImagePreprocessor, OcrEngine, TesseractEngine};
pub use pdf::{PageSource, PdfExtractor};
pub use pipeline::{CancelToken, Pipeline};
pub use table::{LatticeTableEngine, TableEngine};
