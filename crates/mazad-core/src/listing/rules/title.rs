//! Listing title and short-description derivation.

use super::patterns::BRAND_TITLE;

const MIN_TITLE_LEN: usize = 6;
const MAX_TITLE_LEN: usize = 120;
const SHORT_DESCRIPTION_LEN: usize = 160;

/// Pick a title for a segment. A line starting with a known vehicle
/// brand wins; otherwise the first line of plausible title length is
/// used. Returns an empty string when nothing qualifies.
pub fn extract_title(text: &str) -> String {
    if let Some(m) = BRAND_TITLE.find(text) {
        return m.as_str().trim().to_string();
    }

    for line in text.lines() {
        let candidate = line.trim();
        let len = candidate.chars().count();
        if len > MIN_TITLE_LEN && len < MAX_TITLE_LEN && candidate.chars().any(|c| c.is_alphabetic())
        {
            return candidate.to_string();
        }
    }

    String::new()
}

/// Collapse whitespace and truncate to a preview of at most 160
/// characters, appending an ellipsis when text was dropped.
pub fn make_short_description(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= SHORT_DESCRIPTION_LEN {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(SHORT_DESCRIPTION_LEN).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_brand_line_preferred() {
        let text = "المجموعة 12\nحالة متوسطة\nPeugeot 307 2015 grey sedan\nmore details";
        assert_eq!(extract_title(text), "Peugeot 307 2015 grey sedan");
    }

    #[test]
    fn test_fallback_first_plausible_line() {
        let text = "N 5\nهيكل سيارة بدون محرك للبيع\n12/08/2025";
        assert_eq!(extract_title(text), "هيكل سيارة بدون محرك للبيع");
    }

    #[test]
    fn test_short_lines_skipped() {
        assert_eq!(extract_title("ab\ncd\n12345678"), "");
    }

    #[test]
    fn test_overlong_line_skipped() {
        let long = "x".repeat(200);
        assert_eq!(extract_title(&long), "");
    }

    #[test]
    fn test_short_description_collapses_whitespace() {
        assert_eq!(
            make_short_description("  a  b\n\tc  "),
            "a b c".to_string()
        );
    }

    #[test]
    fn test_short_description_truncates() {
        let text = "word ".repeat(100);
        let short = make_short_description(&text);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 163);
    }

    #[test]
    fn test_short_description_empty() {
        assert_eq!(make_short_description(""), "");
    }
}
