//! Document page source: native text layers and page images.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for page source operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Per-page access to a paginated document.
///
/// Implementations expose the native text layer of each page and, for
/// pages without one, a rasterized image suitable for OCR.
pub trait PageSource {
    /// Load a document from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Extract the native text layer of a page (1-indexed). Empty output
    /// means the page has no usable text layer.
    fn page_text(&self, page: u32) -> Result<String>;

    /// Obtain a page image for OCR, scaled towards the given DPI.
    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage>;
}
