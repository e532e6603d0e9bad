//! Tesseract CLI adapter.
//!
//! Invokes the system `tesseract` binary with language hints and a page
//! segmentation mode, reading recognized text from stdout. Requires
//! tesseract (and the `ara`/`fra` language packs) installed on the host.

use std::process::Command;

use image::DynamicImage;
use tracing::{debug, trace};

use super::{OcrEngine, Result};
use crate::error::OcrError;
use crate::models::config::{OcrConfig, PageSegMode};

/// OCR engine backed by the external tesseract binary.
pub struct TesseractEngine {
    binary: String,
    language_arg: String,
    psm: PageSegMode,
}

impl TesseractEngine {
    /// Create an engine from OCR configuration.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
            language_arg: config.language_arg(),
            psm: config.psm,
        }
    }

    /// Override the page segmentation mode.
    pub fn with_psm(mut self, psm: PageSegMode) -> Self {
        self.psm = psm;
        self
    }

    /// Check whether the tesseract binary can be invoked.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let dir = tempfile::tempdir()
            .map_err(|e| OcrError::Recognition(format!("temp dir: {}", e)))?;
        let input_path = dir.path().join("page.png");

        image
            .save(&input_path)
            .map_err(|e| OcrError::InvalidImage(format!("write page image: {}", e)))?;

        trace!(
            langs = %self.language_arg,
            psm = self.psm.as_flag(),
            "invoking tesseract"
        );

        let output = Command::new(&self.binary)
            .arg(&input_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language_arg)
            .arg("--psm")
            .arg(self.psm.as_flag())
            .output()
            .map_err(|e| {
                OcrError::EngineUnavailable(format!(
                    "failed to run tesseract (path='{}'): {}",
                    self.binary, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!(chars = text.len(), "tesseract recognized page");
        Ok(text)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_binary_detected() {
        let engine = TesseractEngine {
            binary: "/nonexistent/tesseract".to_string(),
            language_arg: "eng".to_string(),
            psm: PageSegMode::SingleBlock,
        };
        assert!(!engine.is_available());
    }

    #[test]
    fn test_recognize_fails_cleanly_without_binary() {
        let engine = TesseractEngine {
            binary: "/nonexistent/tesseract".to_string(),
            language_arg: "eng".to_string(),
            psm: PageSegMode::SingleBlock,
        };
        let image = DynamicImage::new_rgb8(10, 10);
        assert!(matches!(
            engine.recognize(&image),
            Err(OcrError::EngineUnavailable(_))
        ));
    }

    #[test]
    fn test_from_config_joins_languages() {
        let config = OcrConfig::default();
        let engine = TesseractEngine::from_config(&config);
        assert_eq!(engine.language_arg, "ara+fra+eng");
    }
}
