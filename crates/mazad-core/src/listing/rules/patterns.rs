//! Regex patterns for segmentation and field extraction.
//!
//! Tuned against Tunisian customs auction catalogs: boundary tokens and
//! lot labels appear in Arabic ("المجموعة", "مجموعة", "رقم") and in
//! French/Latin forms ("LOT", "N°"). Latin tokens match
//! case-insensitively; Arabic has no case.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Segment boundary tokens: a group/lot marker followed by a number.
    pub static ref BOUNDARY_MARKER: Regex = Regex::new(
        r"(?i)المجموعة\s*[-:]*\s*\d+|N(?:°|o|º)\s*\d+|LOT\s*\d+|مجموعة\s*[-:]*\s*\d+"
    ).unwrap();

    // Lot/group identifier: marker token immediately followed by 1-6 digits.
    pub static ref LOT_ID: Regex = Regex::new(
        r"(?i)(?:المجموعة|مجموعة|LOT|N(?:°|o|º)|رقم)\s*[-:]*\s*(\d{1,6})"
    ).unwrap();

    // Serial/VIN candidates: uppercase alphanumeric runs of 10-17 chars in
    // the VIN alphabet (I, O and Q excluded). Pure numeric runs are
    // filtered afterwards since they are more likely prices or dates.
    pub static ref IDENTIFIER_RUN: Regex = Regex::new(
        r"\b[A-HJ-NPR-Z0-9]{10,17}\b"
    ).unwrap();

    // Numeric dates, day-first and year-first. Syntactic matches only; no
    // calendar validation is performed.
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b\d{4}[/\-]\d{1,2}[/\-]\d{1,2}\b"
    ).unwrap();

    // Amounts adjacent to a Tunisian dinar marker, on either side.
    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        r"(?i)(?:د\.ت|TND|DT\.?)\s*(\d+(?:[ ,]\d{3})*(?:[.,]\d{1,2})?)|(\d+(?:[ ,]\d{3})*(?:[.,]\d{1,2})?)\s*(?:د\.ت|TND|DT\.?)"
    ).unwrap();

    // Bare amounts with thousands separators (space or comma).
    pub static ref THOUSANDS_AMOUNT: Regex = Regex::new(
        r"\b\d{1,3}(?:[ ,]\d{3})+(?:[.,]\d{1,2})?\b"
    ).unwrap();

    // Bare amounts with a decimal part.
    pub static ref DECIMAL_AMOUNT: Regex = Regex::new(
        r"\b\d+[.,]\d{1,2}\b"
    ).unwrap();

    // Vehicle brand keyword with up to 60 trailing characters on the line.
    pub static ref BRAND_TITLE: Regex = Regex::new(
        r"(?i)\b(?:Mercedes|Peugeot|Renault|Fiat|Volkswagen|BMW|Toyota|Lifan|Hyundai|Kia|Mitsubishi|Nissan|Opel|Citroen|Ford|Seat|Skoda)\b[^\n]{0,60}"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_marker_arabic_and_latin() {
        assert!(BOUNDARY_MARKER.is_match("المجموعة 12"));
        assert!(BOUNDARY_MARKER.is_match("مجموعة - 3"));
        assert!(BOUNDARY_MARKER.is_match("lot 7"));
        assert!(BOUNDARY_MARKER.is_match("N° 45"));
        assert!(!BOUNDARY_MARKER.is_match("a plain paragraph"));
    }

    #[test]
    fn test_lot_id_captures_digits() {
        let caps = LOT_ID.captures("المجموعة : 12 سيارة").unwrap();
        assert_eq!(&caps[1], "12");

        let caps = LOT_ID.captures("LOT-034").unwrap();
        assert_eq!(&caps[1], "034");
    }

    #[test]
    fn test_identifier_run_excludes_ioq_letters() {
        assert!(IDENTIFIER_RUN.is_match("VF32A5FXF12345678"));
        assert!(!IDENTIFIER_RUN.is_match("OOOOOOOOOOOO"));
    }

    #[test]
    fn test_date_patterns() {
        assert!(DATE_DMY.is_match("12/08/2025"));
        assert!(DATE_DMY.is_match("1-9-25"));
        assert!(DATE_YMD.is_match("2025/08/12"));
        assert!(!DATE_DMY.is_match("12.08.2025"));
    }

    #[test]
    fn test_currency_amount_either_side() {
        let caps = CURRENCY_AMOUNT.captures("15000 د.ت").unwrap();
        assert_eq!(caps.get(2).unwrap().as_str(), "15000");

        let caps = CURRENCY_AMOUNT.captures("TND 2 500,00").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "2 500,00");
    }
}
