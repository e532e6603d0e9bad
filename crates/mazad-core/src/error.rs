//! Error types for the mazad-core library.

use thiserror::Error;

/// Main error type for the mazad library.
#[derive(Error, Debug)]
pub enum MazadError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Table extraction error.
    #[error("table error: {0}")]
    Table(#[from] TableError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to obtain a page image.
    #[error("failed to extract page image: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The external OCR engine could not be invoked.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine ran but failed to recognize the page.
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// Image preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Recognition exceeded the caller-supplied time budget.
    #[error("recognition timed out after {0}ms")]
    Timeout(u64),
}

/// Errors related to structural table extraction.
///
/// These are always recoverable: the pipeline records zero tables and
/// continues.
#[derive(Error, Debug)]
pub enum TableError {
    /// No grid structure could be located on the page.
    #[error("no ruled grid found")]
    NoGrid,

    /// The page image could not be obtained or decoded.
    #[error("unreadable page image: {0}")]
    UnreadableImage(String),

    /// The detected grid is implausible (too many cells, degenerate spans).
    #[error("implausible grid: {0}")]
    ImplausibleGrid(String),
}

/// Result type for the mazad library.
pub type Result<T> = std::result::Result<T, MazadError>;
