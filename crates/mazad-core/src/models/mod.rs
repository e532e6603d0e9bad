//! Data models: extraction records and pipeline configuration.

pub mod config;
pub mod record;

pub use config::{OcrConfig, PageSegMode, PipelineConfig};
pub use record::{
    ExtractionMethod, ExtractionResult, ListingRecord, PageRecord, Segment, TableRecord,
};
