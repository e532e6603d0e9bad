//! OCR engine adapter and scan preprocessing.

mod preprocess;
mod tesseract;

pub use preprocess::ImagePreprocessor;
pub use tesseract::TesseractEngine;

use image::DynamicImage;

use crate::error::OcrError;

/// Result type for OCR operations.
pub type Result<T> = std::result::Result<T, OcrError>;

/// Adapter over an external optical-recognition engine.
///
/// Implementations receive an already-preprocessed page image and return
/// the raw recognized text, possibly empty. No retries are performed;
/// callers may re-invoke with a different page segmentation mode as a
/// manual fallback.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in a page image.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;

    /// Short engine name for logs.
    fn name(&self) -> &str;
}
