//! Ruled-grid table detection from page images.
//!
//! Locates long horizontal and vertical ruling lines via ink-run
//! projections, intersects them into a cell grid, and OCRs each cell.
//! Whitespace-aligned ("stream") tables are out of reach of this engine
//! and fall through to prose extraction.

use image::{DynamicImage, GenericImageView};
use ndarray::Array2;
use tracing::{debug, trace};

use super::{rows_to_csv, Result, TableEngine};
use crate::error::TableError;
use crate::models::record::TableRecord;
use crate::ocr::OcrEngine;

/// Fraction of the page dimension a run of ink must span to count as a
/// ruling line.
const MIN_LINE_COVERAGE: f32 = 0.5;

/// Upper bound on detected cells; anything larger is noise, not a table.
const MAX_CELLS: usize = 400;

/// Pixels trimmed from each cell edge so ruling ink does not leak into
/// cell OCR.
const CELL_INSET: u32 = 2;

/// Lattice table engine working on binarizable page images.
pub struct LatticeTableEngine {
    min_line_coverage: f32,
}

impl LatticeTableEngine {
    /// Create an engine with default line-coverage requirements.
    pub fn new() -> Self {
        Self {
            min_line_coverage: MIN_LINE_COVERAGE,
        }
    }

    fn detect_grid(&self, image: &DynamicImage) -> Result<(Vec<u32>, Vec<u32>)> {
        let (width, height) = image.dimensions();
        if width < 20 || height < 20 {
            return Err(TableError::UnreadableImage(format!(
                "page image too small: {}x{}",
                width, height
            )));
        }

        let mask = binarize_dark(image);

        let horizontal = ruling_positions(
            (0..height).map(|y| longest_run((0..width).map(|x| mask[[y as usize, x as usize]]))),
            (width as f32 * self.min_line_coverage) as u32,
        );
        let vertical = ruling_positions(
            (0..width).map(|x| longest_run((0..height).map(|y| mask[[y as usize, x as usize]]))),
            (height as f32 * self.min_line_coverage) as u32,
        );

        trace!(
            horizontal = horizontal.len(),
            vertical = vertical.len(),
            "ruling lines"
        );

        if horizontal.len() < 2 || vertical.len() < 2 {
            return Err(TableError::NoGrid);
        }

        let cells = (horizontal.len() - 1) * (vertical.len() - 1);
        if cells > MAX_CELLS {
            return Err(TableError::ImplausibleGrid(format!("{} cells", cells)));
        }

        Ok((horizontal, vertical))
    }
}

impl Default for LatticeTableEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TableEngine for LatticeTableEngine {
    fn extract(
        &self,
        image: &DynamicImage,
        page_number: u32,
        ocr: &dyn OcrEngine,
    ) -> Result<Vec<TableRecord>> {
        let (horizontal, vertical) = self.detect_grid(image)?;
        let rows = horizontal.len() - 1;
        let cols = vertical.len() - 1;

        debug!(page = page_number, rows, cols, "lattice grid detected");

        let mut cell_rows: Vec<Vec<String>> = Vec::with_capacity(rows);
        for r in 0..rows {
            let mut row = Vec::with_capacity(cols);
            for c in 0..cols {
                let x0 = vertical[c] + CELL_INSET;
                let x1 = vertical[c + 1].saturating_sub(CELL_INSET);
                let y0 = horizontal[r] + CELL_INSET;
                let y1 = horizontal[r + 1].saturating_sub(CELL_INSET);

                if x1 <= x0 || y1 <= y0 {
                    row.push(String::new());
                    continue;
                }

                let cell = image.crop_imm(x0, y0, x1 - x0, y1 - y0);
                // A failed cell stays empty; the table survives.
                let text = ocr
                    .recognize(&cell)
                    .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
                    .unwrap_or_default();
                row.push(text);
            }
            cell_rows.push(row);
        }

        Ok(vec![TableRecord {
            page_number,
            serialized_rows: rows_to_csv(&cell_rows),
            shape: (rows, cols),
        }])
    }
}

/// Dark-pixel mask over the page, thresholded at half intensity.
fn binarize_dark(image: &DynamicImage) -> Array2<bool> {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    let mut mask = Array2::from_elem((height as usize, width as usize), false);
    for (x, y, pixel) in gray.enumerate_pixels() {
        mask[[y as usize, x as usize]] = pixel[0] < 128;
    }
    mask
}

/// Length of the longest consecutive run of `true` values.
fn longest_run(values: impl Iterator<Item = bool>) -> u32 {
    let mut best = 0u32;
    let mut current = 0u32;
    for v in values {
        if v {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

/// Collapse consecutive qualifying scanlines into single ruling positions.
fn ruling_positions(run_lengths: impl Iterator<Item = u32>, min_run: u32) -> Vec<u32> {
    let mut positions = Vec::new();
    let mut band_start: Option<u32> = None;

    for (i, run) in run_lengths.enumerate() {
        let i = i as u32;
        if run >= min_run {
            if band_start.is_none() {
                band_start = Some(i);
            }
        } else if let Some(start) = band_start.take() {
            positions.push((start + i - 1) / 2);
        }
    }
    if let Some(start) = band_start {
        positions.push(start);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use image::{Rgb, RgbImage};

    struct NoTextOcr;

    impl OcrEngine for NoTextOcr {
        fn recognize(&self, _image: &DynamicImage) -> crate::ocr::Result<String> {
            Ok(String::new())
        }

        fn name(&self) -> &str {
            "none"
        }
    }

    struct FailingOcr;

    impl OcrEngine for FailingOcr {
        fn recognize(&self, _image: &DynamicImage) -> crate::ocr::Result<String> {
            Err(OcrError::Recognition("simulated".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// 100x100 white page with a 3-row, 2-column ruled grid.
    fn ruled_page() -> DynamicImage {
        let mut page = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        for &y in &[10u32, 40, 70, 90] {
            for x in 5..95 {
                page.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        for &x in &[5u32, 50, 95] {
            for y in 10..91 {
                page.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        DynamicImage::ImageRgb8(page)
    }

    #[test]
    fn test_detects_ruled_grid_shape() {
        let engine = LatticeTableEngine::new();
        let tables = engine.extract(&ruled_page(), 1, &NoTextOcr).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].shape, (3, 2));
        assert_eq!(tables[0].page_number, 1);
    }

    #[test]
    fn test_blank_page_has_no_grid() {
        let engine = LatticeTableEngine::new();
        let page = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([255, 255, 255])));
        assert!(matches!(
            engine.extract(&page, 1, &NoTextOcr),
            Err(TableError::NoGrid)
        ));
    }

    #[test]
    fn test_cell_ocr_failure_leaves_cells_empty() {
        let engine = LatticeTableEngine::new();
        let tables = engine.extract(&ruled_page(), 1, &FailingOcr).unwrap();
        assert_eq!(tables[0].serialized_rows, ",\n,\n,");
    }

    #[test]
    fn test_tiny_image_is_unreadable() {
        let engine = LatticeTableEngine::new();
        let page = DynamicImage::new_rgb8(4, 4);
        assert!(matches!(
            engine.extract(&page, 1, &NoTextOcr),
            Err(TableError::UnreadableImage(_))
        ));
    }

    #[test]
    fn test_longest_run() {
        let values = [true, true, false, true, true, true, false].into_iter();
        assert_eq!(longest_run(values), 3);
    }
}
