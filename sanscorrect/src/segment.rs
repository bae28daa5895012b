//! Subtitle segment data model.

use serde::{Deserialize, Serialize};

/// One timestamped subtitle unit as read from the source file.
///
/// Immutable once read: the pipeline produces a fresh text value and
/// never mutates a segment in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Ordered sequence index within the subtitle file.
    pub index: usize,
    /// Start timestamp in milliseconds.
    pub start_ms: u64,
    /// End timestamp in milliseconds.
    pub end_ms: u64,
    /// Raw segment text as transcribed.
    pub text: String,
}

impl Segment {
    /// Creates a segment.
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Segment {
        Segment {
            index,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }
}

/// A segment paired with its corrected text and correction count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CorrectedSegment {
    /// Index copied from the source segment.
    pub index: usize,
    /// Start timestamp copied from the source segment.
    pub start_ms: u64,
    /// End timestamp copied from the source segment.
    pub end_ms: u64,
    /// Corrected text.
    pub text: String,
    /// Number of correction events applied across all pipeline steps.
    pub corrections: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_roundtrips_through_json() {
        let seg = Segment::new(3, 1000, 2500, "om tat sat");
        let json = serde_json::to_string(&seg).unwrap();
        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(seg, back);
    }
}
