//! Monetary amount extraction.
//!
//! Strategies are tried in order with the first non-empty result winning:
//! currency-adjacent amounts, then bare amounts with thousands
//! separators, then bare decimal amounts. Catalog segments are dense with
//! incidental numbers (years, engine sizes, lot numbers), so bare-number
//! capture only runs when no currency-marked amount exists.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::patterns::{CURRENCY_AMOUNT, DECIMAL_AMOUNT, THOUSANDS_AMOUNT};
use super::{push_unique, FieldExtractor};

/// Extractor for normalized numeric amount strings.
pub struct PriceExtractor;

impl PriceExtractor {
    pub fn new() -> Self {
        Self
    }

    fn currency_adjacent(&self, text: &str) -> Vec<String> {
        let mut results = Vec::new();
        for caps in CURRENCY_AMOUNT.captures_iter(text) {
            let raw = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            if let Some(normalized) = normalize_amount(raw) {
                push_unique(&mut results, normalized);
            }
        }
        results
    }

    fn bare_amounts(&self, text: &str, pattern: &regex::Regex) -> Vec<String> {
        let mut results = Vec::new();
        for m in pattern.find_iter(text) {
            if let Some(normalized) = normalize_amount(m.as_str()) {
                push_unique(&mut results, normalized);
            }
        }
        results
    }
}

impl Default for PriceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PriceExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<String> {
        let strategies = [
            self.currency_adjacent(text),
            self.bare_amounts(text, &THOUSANDS_AMOUNT),
            self.bare_amounts(text, &DECIMAL_AMOUNT),
        ];

        strategies
            .into_iter()
            .find(|candidates| !candidates.is_empty())
            .unwrap_or_default()
    }
}

/// Strip thousands separators and validate that the remainder is a
/// parseable decimal number. Malformed candidates yield None and are
/// skipped.
fn normalize_amount(raw: &str) -> Option<String> {
    let stripped: String = raw.chars().filter(|c| *c != ' ' && *c != ',').collect();
    if stripped.is_empty() {
        return None;
    }
    Decimal::from_str(&stripped).ok()?;
    Some(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_currency_adjacent_wins_over_bare_numbers() {
        let extractor = PriceExtractor::new();
        let text = "Peugeot 307 2015 model, price 15000 د.ت at auction";
        assert_eq!(extractor.extract_all(text), vec!["15000".to_string()]);
    }

    #[test]
    fn test_currency_prefix_form() {
        let extractor = PriceExtractor::new();
        assert_eq!(
            extractor.extract_all("reserve TND 2 500 firm"),
            vec!["2500".to_string()]
        );
    }

    #[test]
    fn test_thousands_separated_fallback() {
        let extractor = PriceExtractor::new();
        assert_eq!(
            extractor.extract_all("estimated at 12 500 approximately"),
            vec!["12500".to_string()]
        );
    }

    #[test]
    fn test_decimal_fallback() {
        let extractor = PriceExtractor::new();
        assert_eq!(
            extractor.extract_all("fee of 250.75 applies"),
            vec!["250.75".to_string()]
        );
    }

    #[test]
    fn test_no_amounts_yields_empty() {
        let extractor = PriceExtractor::new();
        assert!(extractor.extract_all("no numbers here").is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let extractor = PriceExtractor::new();
        let text = "15000 DT now, still 15000 DT later";
        assert_eq!(extractor.extract_all(text), vec!["15000".to_string()]);
    }

    #[test]
    fn test_normalize_amount() {
        assert_eq!(normalize_amount("1 234.56"), Some("1234.56".to_string()));
        assert_eq!(normalize_amount("15000"), Some("15000".to_string()));
        assert_eq!(normalize_amount(""), None);
    }
}
