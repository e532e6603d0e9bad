//! Rule-based field extractors for auction listing segments.
//!
//! Every extractor is a pure function of the segment text: idempotent,
//! side-effect-free, and tolerant of malformed matches, which are skipped
//! rather than failing the segment.

pub mod dates;
pub mod identifiers;
pub mod lot;
pub mod patterns;
pub mod prices;
pub mod title;

pub use dates::DateExtractor;
pub use identifiers::IdentifierExtractor;
pub use lot::extract_lot_id;
pub use prices::PriceExtractor;
pub use title::{extract_title, make_short_description};

/// Trait for list-producing field extractors.
pub trait FieldExtractor {
    /// The value type this extractor produces.
    type Output;

    /// Extract the first occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences, de-duplicated in first-seen order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Push a value unless it is already present, preserving insertion order.
pub(crate) fn push_unique(values: &mut Vec<String>, candidate: String) {
    if !values.contains(&candidate) {
        values.push(candidate);
    }
}
