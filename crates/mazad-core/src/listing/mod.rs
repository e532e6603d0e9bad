//! Listing extraction: segmentation of merged document text into lot
//! segments and rule-based parsing of each segment into a structured
//! record.

pub mod parser;
pub mod rules;
pub mod segment;

pub use parser::ListingParser;
pub use segment::{FixedChunkSegmenter, MarkerSegmenter, SegmentStrategy, Segmenter};
