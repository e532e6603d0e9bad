//! Date string extraction.
//!
//! Matches are syntactic only: "32/13/2025" is accepted. Downstream
//! review decides what the strings mean.

use super::patterns::{DATE_DMY, DATE_YMD};
use super::{push_unique, FieldExtractor};

/// Extractor for numeric date strings with `/` or `-` separators, in
/// day-first or year-first order.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<String> {
        // Collect from both patterns and order by position in the text so
        // first-seen order holds across field orders.
        let mut matches: Vec<(usize, &str)> = DATE_DMY
            .find_iter(text)
            .chain(DATE_YMD.find_iter(text))
            .map(|m| (m.start(), m.as_str()))
            .collect();
        matches.sort_by_key(|(start, _)| *start);

        let mut results = Vec::new();
        for (_, date) in matches {
            push_unique(&mut results, date.to_string());
        }
        results
    }
}
