//! Lot/group identifier extraction.

use super::patterns::LOT_ID;

/// Extract the lot identifier: the first marker token immediately
/// followed by a 1-6 digit number. Empty string when nothing matches.
pub fn extract_lot_id(text: &str) -> String {
    LOT_ID
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arabic_group_marker() {
        assert_eq!(extract_lot_id("المجموعة 12 : سيارة بيجو"), "12");
    }

    #[test]
    fn test_latin_markers() {
        assert_eq!(extract_lot_id("LOT 7 - Mercedes Sprinter"), "7");
        assert_eq!(extract_lot_id("N° 450"), "450");
        assert_eq!(extract_lot_id("رقم : 3"), "3");
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(extract_lot_id("LOT 1 then LOT 2"), "1");
    }

    #[test]
    fn test_no_marker_yields_empty() {
        assert_eq!(extract_lot_id("just a description"), "");
        assert_eq!(extract_lot_id(""), "");
    }
}
