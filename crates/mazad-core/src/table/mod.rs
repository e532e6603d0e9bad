//! Structural table extraction for bordered ("lattice") layouts.
//!
//! Best-effort and fully isolated from the text pipeline: every failure
//! here yields zero tables and is logged, never propagated. Extracted
//! tables are advisory output for downstream review and are not merged
//! into segment text.

mod lattice;

pub use lattice::LatticeTableEngine;

use image::DynamicImage;

use crate::error::TableError;
use crate::models::record::TableRecord;
use crate::ocr::OcrEngine;

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Adapter over a table-structure engine.
pub trait TableEngine: Send + Sync {
    /// Extract bordered tables from a page image, filling cell text with
    /// the given OCR engine. Per-cell recognition failures leave the cell
    /// empty rather than failing the table.
    fn extract(
        &self,
        image: &DynamicImage,
        page_number: u32,
        ocr: &dyn OcrEngine,
    ) -> Result<Vec<TableRecord>>;
}

/// Serialize rows of cell text to CSV.
pub(crate) fn rows_to_csv(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| escape_csv(cell))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
