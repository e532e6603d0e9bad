//! Document segmentation.
//!
//! Marker-based segmentation splits the merged document at lot boundary
//! tokens. When the document carries no markers at all, a fixed-size
//! chunking strategy takes over so that unstructured text still flows
//! through field extraction.

use tracing::debug;

use crate::models::Segment;

use super::rules::patterns::BOUNDARY_MARKER;

/// A segmentation strategy. Returns None when the strategy does not
/// apply to the given text, which lets the caller fall through to the
/// next strategy.
pub trait SegmentStrategy {
    fn segment(&self, full_text: &str) -> Option<Vec<Segment>>;
}

/// Splits at lot boundary markers. Each segment spans from one marker to
/// the start of the next. Segments whose trimmed body is too short to
/// describe a lot are dropped as marker noise.
pub struct MarkerSegmenter {
    min_segment_len: usize,
}

impl MarkerSegmenter {
    pub fn new(min_segment_len: usize) -> Self {
        Self { min_segment_len }
    }
}

impl SegmentStrategy for MarkerSegmenter {
    fn segment(&self, full_text: &str) -> Option<Vec<Segment>> {
        let starts: Vec<usize> = BOUNDARY_MARKER
            .find_iter(full_text)
            .map(|m| m.start())
            .collect();
        if starts.is_empty() {
            return None;
        }

        let mut segments = Vec::with_capacity(starts.len());
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(full_text.len());
            let raw = full_text[start..end].trim();
            if raw.chars().count() <= self.min_segment_len {
                continue;
            }
            segments.push(Segment {
                segment_index: segments.len(),
                start_offset: start,
                end_offset: end,
                raw_text: raw.to_string(),
            });
        }
        Some(segments)
    }
}

/// Splits into fixed-size character windows. The final window may be
/// shorter; no window is ever dropped for being short.
pub struct FixedChunkSegmenter {
    chunk_size: usize,
}

impl FixedChunkSegmenter {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }
}

impl SegmentStrategy for FixedChunkSegmenter {
    fn segment(&self, full_text: &str) -> Option<Vec<Segment>> {
        if self.chunk_size == 0 {
            return Some(Vec::new());
        }

        let boundaries: Vec<usize> = full_text
            .char_indices()
            .map(|(i, _)| i)
            .step_by(self.chunk_size)
            .chain(std::iter::once(full_text.len()))
            .collect();

        let mut segments = Vec::new();
        for window in boundaries.windows(2) {
            let (start, end) = (window[0], window[1]);
            if start == end {
                continue;
            }
            segments.push(Segment {
                segment_index: segments.len(),
                start_offset: start,
                end_offset: end,
                raw_text: full_text[start..end].trim().to_string(),
            });
        }
        Some(segments)
    }
}

/// Strategy dispatcher: markers take precedence, chunking is the
/// fallback, and a document that still yields nothing becomes a single
/// whole-text segment.
pub struct Segmenter {
    markers: MarkerSegmenter,
    chunks: FixedChunkSegmenter,
}

impl Segmenter {
    pub fn new(min_segment_len: usize, chunk_size: usize) -> Self {
        Self {
            markers: MarkerSegmenter::new(min_segment_len),
            chunks: FixedChunkSegmenter::new(chunk_size),
        }
    }

    pub fn segment(&self, full_text: &str) -> Vec<Segment> {
        let segments = match self.markers.segment(full_text) {
            Some(segments) => {
                debug!(count = segments.len(), "segmented at lot markers");
                segments
            }
            None => {
                let segments = self.chunks.segment(full_text).unwrap_or_default();
                debug!(count = segments.len(), "no markers found, chunked");
                segments
            }
        };

        if segments.is_empty() {
            return vec![Segment {
                segment_index: 0,
                start_offset: 0,
                end_offset: full_text.len(),
                raw_text: full_text.trim().to_string(),
            }];
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_markers_take_precedence() {
        let text = "intro text before the first lot\nالمجموعة 1\nPeugeot 307 grey sedan good state\nالمجموعة 2\nRenault Clio blue with spare parts included";
        let segmenter = Segmenter::new(20, 900);
        let segments = segmenter.segment(text);
        assert_eq!(segments.len(), 2);
        assert!(segments[0].raw_text.starts_with("المجموعة 1"));
        assert!(segments[1].raw_text.starts_with("المجموعة 2"));
    }

    #[test]
    fn test_marker_noise_filtered() {
        // The second marker has almost no body and is dropped.
        let text = "المجموعة 1\nPeugeot 307 grey sedan in working order\nالمجموعة 2\nx";
        let segments = Segmenter::new(20, 900).segment(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].segment_index, 0);
    }

    #[test]
    fn test_no_markers_falls_back_to_chunks() {
        let text = "a".repeat(2000);
        let segments = Segmenter::new(20, 900).segment(&text);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].raw_text.len(), 900);
        assert_eq!(segments[1].raw_text.len(), 900);
        assert_eq!(segments[2].raw_text.len(), 200);
    }

    #[test]
    fn test_chunks_never_length_filtered() {
        let text = "short";
        let segments = Segmenter::new(20, 900).segment(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].raw_text, "short");
    }

    #[test]
    fn test_all_markers_filtered_yields_whole_text() {
        // Markers exist but every segment body is too short, so the whole
        // document becomes a single segment.
        let text = "المجموعة 1 x المجموعة 2 y";
        let segments = Segmenter::new(20, 900).segment(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_offset, 0);
        assert_eq!(segments[0].end_offset, text.len());
    }

    #[test]
    fn test_indices_dense_and_ordered() {
        let text = "المجموعة 1\nMercedes C200 black well maintained vehicle\nالمجموعة 2\nFord Focus silver hatchback low mileage car";
        let segments = Segmenter::new(20, 900).segment(text);
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.segment_index, i);
        }
        for pair in segments.windows(2) {
            assert!(pair[0].end_offset <= pair[1].start_offset);
        }
    }

    #[test]
    fn test_empty_document_single_empty_segment() {
        let segments = Segmenter::new(20, 900).segment("");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].raw_text, "");
    }
}
