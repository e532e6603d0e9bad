//! Assembles a structured listing record from a raw text segment.

use crate::models::{ListingRecord, Segment};

use super::rules::{
    extract_lot_id, extract_title, make_short_description, DateExtractor, FieldExtractor,
    IdentifierExtractor, PriceExtractor,
};

/// Runs every field rule against a segment and builds the final record.
pub struct ListingParser {
    sample_len: usize,
    identifiers: IdentifierExtractor,
    dates: DateExtractor,
    prices: PriceExtractor,
}

impl ListingParser {
    pub fn new(sample_len: usize) -> Self {
        Self {
            sample_len,
            identifiers: IdentifierExtractor::new(),
            dates: DateExtractor::new(),
            prices: PriceExtractor::new(),
        }
    }

    pub fn parse(&self, segment: &Segment, source_file: &str) -> ListingRecord {
        // Every field rule sees only the leading sample of the segment;
        // text past the limit is ignored entirely.
        let sample = char_prefix(&segment.raw_text, self.sample_len);

        ListingRecord {
            segment_index: segment.segment_index,
            lot_id: extract_lot_id(sample),
            title: extract_title(sample),
            short_description: make_short_description(sample),
            full_text: sample.to_string(),
            identifiers: self.identifiers.extract_all(sample),
            dates: self.dates.extract_all(sample),
            prices: self.prices.extract_all(sample),
            source_file: source_file.to_string(),
        }
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary.
fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn segment(text: &str) -> Segment {
        Segment {
            segment_index: 0,
            start_offset: 0,
            end_offset: text.len(),
            raw_text: text.to_string(),
        }
    }

    #[test]
    fn test_parse_auction_lot() {
        let text = "المجموعة 12\nPeugeot 307 2015 رمادية اللون\nرقم الهيكل VF32A5FXF12345678\nالسعر الافتتاحي 15000 د.ت\nتاريخ البيع 12/08/2025";
        let parser = ListingParser::new(2000);
        let record = parser.parse(&segment(text), "catalog.pdf");

        assert_eq!(record.lot_id, "12");
        assert!(record.title.contains("Peugeot 307 2015"));
        assert_eq!(record.identifiers, vec!["VF32A5FXF12345678".to_string()]);
        assert_eq!(record.prices, vec!["15000".to_string()]);
        assert_eq!(record.dates, vec!["12/08/2025".to_string()]);
        assert_eq!(record.full_text, text);
        assert_eq!(record.source_file, "catalog.pdf");
    }

    #[test]
    fn test_parse_unstructured_segment() {
        let parser = ListingParser::new(2000);
        let record = parser.parse(&segment("plain running text with no fields at all"), "x.pdf");
        assert_eq!(record.lot_id, "");
        assert!(record.identifiers.is_empty());
        assert!(record.dates.is_empty());
        assert!(record.prices.is_empty());
    }

    #[test]
    fn test_full_text_sampled_to_limit() {
        let text = "م".repeat(3000);
        let parser = ListingParser::new(2000);
        let record = parser.parse(&segment(&text), "x.pdf");
        assert_eq!(record.full_text.chars().count(), 2000);
    }

    #[test]
    fn test_fields_past_sample_limit_ignored() {
        // Fields sit before and after the sample boundary; only the
        // leading ones may be extracted.
        let mut text = String::from("LOT 9 sale on 12/08/2025\n");
        text.push_str(&"i".repeat(2500));
        text.push_str("\n15/09/2026 price 15000 د.ت VF32A5FXF12345678");

        let parser = ListingParser::new(2000);
        let record = parser.parse(&segment(&text), "catalog.pdf");

        assert_eq!(record.lot_id, "9");
        assert_eq!(record.dates, vec!["12/08/2025".to_string()]);
        assert!(record.prices.is_empty());
        assert!(record.identifiers.is_empty());
        assert_eq!(record.full_text.chars().count(), 2000);
    }

    #[test]
    fn test_char_prefix_boundary_safe() {
        assert_eq!(char_prefix("abcdef", 3), "abc");
        assert_eq!(char_prefix("abc", 10), "abc");
        assert_eq!(char_prefix("ممم", 2).chars().count(), 2);
    }
}
