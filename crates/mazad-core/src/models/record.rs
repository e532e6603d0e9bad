//! Data models for extracted auction catalog records.
//!
//! These are the boundary artifacts handed to the external persistence
//! layer. Field order is significant for the interchange representation;
//! unmatched text fields serialize as `""` and unmatched list fields as
//! `[]`, never as null.

use serde::{Deserialize, Serialize};

/// Text extracted from a single document page.
///
/// Created once per page and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number (1-indexed).
    pub page_number: u32,

    /// Extracted text, possibly empty.
    pub text: String,

    /// Whether this page's text came from OCR on a rasterized image.
    pub is_scanned: bool,
}

/// A structurally extracted table.
///
/// Advisory output for downstream review; never merged into segment text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecord {
    /// Page the table was found on (1-indexed).
    pub page_number: u32,

    /// Table rows serialized as CSV.
    pub serialized_rows: String,

    /// Table shape as (rows, columns).
    pub shape: (usize, usize),
}

/// A contiguous span of the merged document text believed to correspond
/// to one listing/lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Dense 0-based index within the document.
    pub segment_index: usize,

    /// Byte offset of the segment start in the full text.
    pub start_offset: usize,

    /// Byte offset of the segment end in the full text.
    pub end_offset: usize,

    /// Trimmed segment text.
    pub raw_text: String,
}

/// One structured listing extracted from a segment.
///
/// Created once per segment, never mutated after creation. Uniqueness and
/// durable identity are the external persistence layer's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Index of the source segment.
    pub segment_index: usize,

    /// Lot/group identifier, empty when no marker matched.
    pub lot_id: String,

    /// Best-effort listing title, empty when no heuristic fired.
    pub title: String,

    /// Whitespace-collapsed description, truncated to 160 characters
    /// with a trailing ellipsis when longer.
    pub short_description: String,

    /// The segment text the fields were extracted from.
    pub full_text: String,

    /// Candidate serial/VIN strings, de-duplicated, insertion order.
    pub identifiers: Vec<String>,

    /// Date strings as matched, de-duplicated, insertion order.
    pub dates: Vec<String>,

    /// Normalized numeric amount strings, de-duplicated, insertion order.
    pub prices: Vec<String>,

    /// Name of the source document.
    pub source_file: String,
}

/// How page text was obtained for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Every page had a usable native text layer.
    Native,

    /// All pages were rasterized and OCR'd.
    ImageOcr,

    /// Native text kept, with OCR run only on blank pages.
    NativeWithOcrFallback,
}

impl ExtractionMethod {
    /// Stable string form used in the interchange representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::ImageOcr => "image_ocr",
            Self::NativeWithOcrFallback => "native_with_ocr_fallback",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level artifact produced by one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Name of the source document.
    pub source_file: String,

    /// How page text was obtained.
    pub method: ExtractionMethod,

    /// Number of pages observed in the document.
    pub page_count: usize,

    /// Number of tables extracted structurally.
    pub table_count: usize,

    /// Extracted listings in segment order.
    pub records: Vec<ListingRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_method_serializes_to_stable_strings() {
        assert_eq!(
            serde_json::to_string(&ExtractionMethod::Native).unwrap(),
            "\"native\""
        );
        assert_eq!(
            serde_json::to_string(&ExtractionMethod::ImageOcr).unwrap(),
            "\"image_ocr\""
        );
        assert_eq!(
            serde_json::to_string(&ExtractionMethod::NativeWithOcrFallback).unwrap(),
            "\"native_with_ocr_fallback\""
        );
    }

    #[test]
    fn test_empty_fields_serialize_as_empty_not_null() {
        let record = ListingRecord {
            segment_index: 0,
            lot_id: String::new(),
            title: String::new(),
            short_description: String::new(),
            full_text: String::new(),
            identifiers: Vec::new(),
            dates: Vec::new(),
            prices: Vec::new(),
            source_file: "catalog.pdf".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["lot_id"], serde_json::json!(""));
        assert_eq!(json["identifiers"], serde_json::json!([]));
        assert_eq!(json["prices"], serde_json::json!([]));
    }

    #[test]
    fn test_record_field_order_preserved() {
        let result = ExtractionResult {
            source_file: "catalog.pdf".to_string(),
            method: ExtractionMethod::Native,
            page_count: 1,
            table_count: 0,
            records: Vec::new(),
        };

        let json = serde_json::to_string(&result).unwrap();
        let source_pos = json.find("source_file").unwrap();
        let method_pos = json.find("method").unwrap();
        let records_pos = json.find("records").unwrap();
        assert!(source_pos < method_pos);
        assert!(method_pos < records_pos);
    }
}
