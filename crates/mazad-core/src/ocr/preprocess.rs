//! Scan preprocessing ahead of OCR.
//!
//! Fixed stage order: deskew, luminance equalization + denoise, adaptive
//! binarization. Each stage is a pure image-to-image function; when a
//! stage fails the pipeline keeps the output of the last successful one.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use ndarray::Array2;
use tracing::{debug, warn};

use super::Result;
use crate::error::OcrError;

/// Minimum number of ink pixels for a skew estimate to be meaningful.
const MIN_INK_PIXELS: usize = 10;

/// Scan preprocessor for the OCR pipeline.
pub struct ImagePreprocessor {
    /// Adaptive threshold neighborhood size (odd).
    block_size: u32,
    /// Constant subtracted from the local mean.
    threshold_c: i32,
}

impl ImagePreprocessor {
    /// Create a preprocessor with default settings.
    pub fn new() -> Self {
        Self {
            block_size: 31,
            threshold_c: 15,
        }
    }

    /// Set the adaptive threshold block size.
    pub fn with_block_size(mut self, size: u32) -> Self {
        self.block_size = size.max(3) | 1;
        self
    }

    /// Run the full preprocessing chain. Never fails: each stage falls
    /// back to the previous stage's output on error.
    pub fn prepare(&self, image: &DynamicImage) -> DynamicImage {
        let mut current = image.to_rgb8();

        match self.deskew(&current) {
            Ok(img) => current = img,
            Err(e) => warn!(stage = "deskew", error = %e, "preprocessing stage skipped"),
        }

        match self.equalize_and_denoise(&current) {
            Ok(img) => current = img,
            Err(e) => warn!(stage = "equalize", error = %e, "preprocessing stage skipped"),
        }

        match self.binarize(&current) {
            Ok(img) => current = img,
            Err(e) => warn!(stage = "binarize", error = %e, "preprocessing stage skipped"),
        }

        DynamicImage::ImageRgb8(current)
    }

    /// Estimate page skew from the ink-pixel distribution and rotate to
    /// correct it. Images with almost no ink are returned unchanged.
    pub fn deskew(&self, image: &RgbImage) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage("zero-sized image".to_string()));
        }

        let mask = ink_mask(image);
        let angle = match skew_angle(&mask) {
            Some(a) => a,
            None => {
                debug!("too few ink pixels, skipping deskew");
                return Ok(image.clone());
            }
        };

        if angle.abs() < 0.05 {
            return Ok(image.clone());
        }

        debug!(angle_deg = angle, "deskewing page");
        Ok(rotate_about_center(image, -angle.to_radians()))
    }

    /// Equalize the luminance channel and apply a 3x3 median denoise.
    pub fn equalize_and_denoise(&self, image: &RgbImage) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage("zero-sized image".to_string()));
        }

        // BT.601 luma histogram over the whole page.
        let mut histogram = [0u64; 256];
        for pixel in image.pixels() {
            histogram[luma(pixel) as usize] += 1;
        }

        let total = (width as u64) * (height as u64);
        let mut lut = [0u8; 256];
        let mut cumulative = 0u64;
        for (i, &count) in histogram.iter().enumerate() {
            cumulative += count;
            lut[i] = ((cumulative * 255) / total) as u8;
        }

        let mut equalized = RgbImage::new(width, height);
        for (x, y, pixel) in image.enumerate_pixels() {
            let y_old = luma(pixel);
            let y_new = lut[y_old as usize];
            equalized.put_pixel(x, y, scale_luma(pixel, y_old, y_new));
        }

        Ok(median_filter(&equalized))
    }

    /// Local-mean adaptive binarization, restored to 3 channels for the
    /// downstream engine.
    pub fn binarize(&self, image: &RgbImage) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage("zero-sized image".to_string()));
        }

        let mut gray = GrayImage::new(width, height);
        for (x, y, pixel) in image.enumerate_pixels() {
            gray.put_pixel(x, y, Luma([luma(pixel)]));
        }

        let binary = adaptive_threshold(&gray, self.block_size, self.threshold_c);

        let mut rgb = RgbImage::new(width, height);
        for (x, y, pixel) in binary.enumerate_pixels() {
            let v = pixel[0];
            rgb.put_pixel(x, y, Rgb([v, v, v]));
        }
        Ok(rgb)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

/// Scale a pixel's channels so its luma moves from `y_old` to `y_new`,
/// preserving chroma without a full color-space round trip.
fn scale_luma(pixel: &Rgb<u8>, y_old: u8, y_new: u8) -> Rgb<u8> {
    if y_old == 0 {
        return Rgb([y_new, y_new, y_new]);
    }
    let ratio = y_new as f32 / y_old as f32;
    let [r, g, b] = pixel.0;
    Rgb([
        (r as f32 * ratio).round().clamp(0.0, 255.0) as u8,
        (g as f32 * ratio).round().clamp(0.0, 255.0) as u8,
        (b as f32 * ratio).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Binarized and inverted ink mask (true = ink) using Otsu's threshold.
fn ink_mask(image: &RgbImage) -> Array2<bool> {
    let (width, height) = image.dimensions();

    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[luma(pixel) as usize] += 1;
    }
    let threshold = otsu_threshold(&histogram, (width as u64) * (height as u64));

    let mut mask = Array2::from_elem((height as usize, width as usize), false);
    for (x, y, pixel) in image.enumerate_pixels() {
        // Dark pixels are ink.
        mask[[y as usize, x as usize]] = luma(pixel) < threshold;
    }
    mask
}

fn otsu_threshold(histogram: &[u64; 256], total: u64) -> u8 {
    if total == 0 {
        return 128;
    }

    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut sum_bg = 0.0f64;
    let mut weight_bg = 0u64;
    let mut best_threshold = 128u8;
    let mut best_variance = 0.0f64;

    for t in 0..256usize {
        weight_bg += histogram[t];
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }

        sum_bg += t as f64 * histogram[t] as f64;
        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;

        let variance =
            weight_bg as f64 * weight_fg as f64 * (mean_bg - mean_fg) * (mean_bg - mean_fg);
        if variance > best_variance {
            best_variance = variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

/// Dominant ink orientation from second-order moments, in degrees,
/// normalized to (-45, 45]. None when the page has too little ink.
fn skew_angle(mask: &Array2<bool>) -> Option<f32> {
    let mut count = 0usize;
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;

    for ((y, x), &ink) in mask.indexed_iter() {
        if ink {
            count += 1;
            sum_x += x as f64;
            sum_y += y as f64;
        }
    }

    if count < MIN_INK_PIXELS {
        return None;
    }

    let mean_x = sum_x / count as f64;
    let mean_y = sum_y / count as f64;

    let mut mu11 = 0.0f64;
    let mut mu20 = 0.0f64;
    let mut mu02 = 0.0f64;
    for ((y, x), &ink) in mask.indexed_iter() {
        if ink {
            let dx = x as f64 - mean_x;
            let dy = y as f64 - mean_y;
            mu11 += dx * dy;
            mu20 += dx * dx;
            mu02 += dy * dy;
        }
    }

    let mut angle = (0.5 * (2.0 * mu11).atan2(mu20 - mu02)).to_degrees() as f32;
    while angle > 45.0 {
        angle -= 90.0;
    }
    while angle <= -45.0 {
        angle += 90.0;
    }
    Some(angle)
}

/// Rotate an image about its center by `theta` radians, bilinear sampling
/// with edge replication.
fn rotate_about_center(image: &RgbImage, theta: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let (sin, cos) = theta.sin_cos();

    let mut output = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            // Inverse mapping into the source image.
            let sx = cos * dx + sin * dy + cx;
            let sy = -sin * dx + cos * dy + cy;
            output.put_pixel(x, y, bilinear_sample(image, sx, sy));
        }
    }
    output
}

fn bilinear_sample(image: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let (width, height) = image.dimensions();
    let clamp_x = |v: i64| v.clamp(0, width as i64 - 1) as u32;
    let clamp_y = |v: i64| v.clamp(0, height as i64 - 1) as u32;

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = image.get_pixel(clamp_x(x0), clamp_y(y0)).0;
    let p10 = image.get_pixel(clamp_x(x0 + 1), clamp_y(y0)).0;
    let p01 = image.get_pixel(clamp_x(x0), clamp_y(y0 + 1)).0;
    let p11 = image.get_pixel(clamp_x(x0 + 1), clamp_y(y0 + 1)).0;

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
        let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// 3x3 median filter per channel. Edges are clamped.
fn median_filter(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut output = RgbImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut windows = [[0u8; 9]; 3];
            let mut i = 0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                    let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                    let pixel = image.get_pixel(sx, sy).0;
                    for c in 0..3 {
                        windows[c][i] = pixel[c];
                    }
                    i += 1;
                }
            }
            let mut out = [0u8; 3];
            for c in 0..3 {
                windows[c].sort_unstable();
                out[c] = windows[c][4];
            }
            output.put_pixel(x, y, Rgb(out));
        }
    }
    output
}

/// Local-mean adaptive threshold over an integral image.
fn adaptive_threshold(image: &GrayImage, block_size: u32, c: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);

    // Integral image with a zero row/column of padding.
    let mut integral = Array2::<u64>::zeros((h + 1, w + 1));
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += image.get_pixel(x as u32, y as u32)[0] as u64;
            integral[[y + 1, x + 1]] = integral[[y, x + 1]] + row_sum;
        }
    }

    let half = (block_size / 2) as i64;
    let mut result = GrayImage::new(width, height);

    for y in 0..h {
        for x in 0..w {
            let x0 = (x as i64 - half).max(0) as usize;
            let y0 = (y as i64 - half).max(0) as usize;
            let x1 = ((x as i64 + half + 1).min(w as i64)) as usize;
            let y1 = ((y as i64 + half + 1).min(h as i64)) as usize;

            let area = ((x1 - x0) * (y1 - y0)) as u64;
            let sum = integral[[y1, x1]] + integral[[y0, x0]]
                - integral[[y0, x1]]
                - integral[[y1, x0]];

            let mean = (sum / area) as i32;
            let value = image.get_pixel(x as u32, y as u32)[0] as i32;
            let output = if value > mean - c { 255 } else { 0 };
            result.put_pixel(x as u32, y as u32, Luma([output]));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_page(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_deskew_skips_blank_page() {
        let preprocessor = ImagePreprocessor::new();
        let page = blank_page(64, 64);
        let result = preprocessor.deskew(&page).unwrap();
        assert_eq!(result, page);
    }

    #[test]
    fn test_deskew_rejects_empty_image() {
        let preprocessor = ImagePreprocessor::new();
        assert!(preprocessor.deskew(&RgbImage::new(0, 0)).is_err());
    }

    #[test]
    fn test_binarize_output_is_two_level() {
        let preprocessor = ImagePreprocessor::new();
        let mut page = blank_page(40, 40);
        for x in 5..35 {
            page.put_pixel(x, 20, Rgb([0, 0, 0]));
        }

        let result = preprocessor.binarize(&page).unwrap();
        assert!(result.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(result.dimensions(), (40, 40));
    }

    #[test]
    fn test_prepare_never_panics_on_tiny_image() {
        let preprocessor = ImagePreprocessor::new();
        let image = DynamicImage::new_rgb8(1, 1);
        let result = preprocessor.prepare(&image);
        assert_eq!(result.width(), 1);
    }

    #[test]
    fn test_skew_angle_of_horizontal_line_is_near_zero() {
        let mut mask = Array2::from_elem((50, 50), false);
        for x in 0..50 {
            mask[[25, x]] = true;
        }
        let angle = skew_angle(&mask).unwrap();
        assert!(angle.abs() < 1.0, "angle was {}", angle);
    }

    #[test]
    fn test_skew_angle_normalized_range() {
        let mut mask = Array2::from_elem((50, 50), false);
        // A vertical stroke normalizes back into (-45, 45].
        for y in 0..50 {
            mask[[y, 25]] = true;
        }
        let angle = skew_angle(&mask).unwrap();
        assert!(angle > -45.0 && angle <= 45.0);
    }

    #[test]
    fn test_otsu_separates_bimodal_histogram() {
        let mut histogram = [0u64; 256];
        histogram[10] = 500;
        histogram[240] = 500;
        let threshold = otsu_threshold(&histogram, 1000);
        assert!(threshold >= 10 && threshold < 240);
    }

    #[test]
    fn test_equalize_preserves_dimensions() {
        let preprocessor = ImagePreprocessor::new();
        let page = blank_page(16, 24);
        let result = preprocessor.equalize_and_denoise(&page).unwrap();
        assert_eq!(result.dimensions(), (16, 24));
    }
}
