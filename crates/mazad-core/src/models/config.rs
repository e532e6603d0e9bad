//! Configuration structures for the extraction pipeline.
//!
//! Configuration is passed by value into each pipeline invocation; nothing
//! is read from the environment, so document runs stay pure and safely
//! parallelizable.

use serde::{Deserialize, Serialize};

/// Main configuration for the mazad pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Fraction of blank pages above which the whole document is
    /// re-extracted via OCR instead of keeping native text.
    pub blank_page_threshold: f32,

    /// Window length (characters) for fixed-size chunk segmentation.
    pub segment_chunk_size: usize,

    /// Marker-delimited segments at or below this length are dropped
    /// as noise.
    pub min_segment_len: usize,

    /// Characters of each segment fed to the field extractors.
    pub segment_sample_len: usize,

    /// Attempt structural table extraction.
    pub tables_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            blank_page_threshold: 0.4,
            segment_chunk_size: 900,
            min_segment_len: 20,
            segment_sample_len: 2000,
            tables_enabled: true,
        }
    }
}

/// Page segmentation mode passed to the OCR engine.
///
/// Mirrors the Tesseract `--psm` values this pipeline uses. Block mode is
/// the default; callers may re-invoke with another mode when block mode
/// under-performs, but no automatic retry is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegMode {
    /// Fully automatic page segmentation (psm 3).
    Auto,
    /// Single column of text of variable sizes (psm 4).
    SingleColumn,
    /// Single uniform block of text (psm 6).
    SingleBlock,
    /// Treat the image as a single text line (psm 7).
    SingleLine,
}

impl PageSegMode {
    /// Numeric `--psm` argument for the engine.
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::Auto => "3",
            Self::SingleColumn => "4",
            Self::SingleBlock => "6",
            Self::SingleLine => "7",
        }
    }
}

impl Default for PageSegMode {
    fn default() -> Self {
        Self::SingleBlock
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Language hints, in priority order (Tesseract language codes).
    pub languages: Vec<String>,

    /// Page segmentation mode.
    pub psm: PageSegMode,

    /// Target DPI when scaling page images for recognition.
    pub dpi: u32,

    /// Path to the tesseract binary (relies on PATH by default).
    pub tesseract_path: String,

    /// Per-page recognition time budget in milliseconds. Pages that
    /// exceed it are recorded as empty. `None` disables the bound.
    pub page_timeout_ms: Option<u64>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: vec!["ara".to_string(), "fra".to_string(), "eng".to_string()],
            psm: PageSegMode::SingleBlock,
            dpi: 200,
            tesseract_path: "tesseract".to_string(),
            page_timeout_ms: None,
        }
    }
}

impl OcrConfig {
    /// Joined language string for the engine's `-l` flag, e.g. `ara+fra+eng`.
    pub fn language_arg(&self) -> String {
        self.languages.join("+")
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
