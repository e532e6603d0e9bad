//! Serial/VIN candidate extraction.

use super::patterns::IDENTIFIER_RUN;
use super::{push_unique, FieldExtractor};

/// Extractor for serial/VIN-like identifier candidates.
///
/// Matches uppercase alphanumeric runs of 10-17 characters in the VIN
/// alphabet. Runs without a letter are dropped as likely prices or dates.
pub struct IdentifierExtractor;

impl IdentifierExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for IdentifierExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<String> {
        let upper = text.to_uppercase();
        let mut results = Vec::new();

        for m in IDENTIFIER_RUN.find_iter(&upper) {
            let candidate = m.as_str();
            if candidate.chars().any(|c| c.is_ascii_alphabetic()) {
                push_unique(&mut results, candidate.to_string());
            }
        }

        results
    }
}
