//! Match candidates, final records and overlap resolution.

pub mod overlap;

use crate::model::{Pattern, Scale, Source};

/// A raw match produced by window refinement.
///
/// `source` and `pattern` refer to the full-resolution inputs of the pair,
/// not to the windowed or resized copies used while scoring.
#[derive(Clone, Copy, Debug)]
pub struct MatchCandidate<'a> {
    /// Comparator score at the placement.
    pub confidence: f32,
    /// Column of the top-left corner in source pixels.
    pub x: usize,
    /// Row of the top-left corner in source pixels.
    pub y: usize,
    /// Footprint of the pattern at this placement.
    pub scale: Scale,
    pub pattern: &'a Pattern,
    pub source: &'a Source,
}

impl MatchCandidate<'_> {
    /// Area of the footprint.
    pub fn area(&self) -> usize {
        self.scale.area()
    }
}

/// Sorts by descending confidence. The sort is stable, so equal scores keep
/// their incoming (row-major) order.
pub fn sort_by_confidence_desc(candidates: &mut [MatchCandidate<'_>]) {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

/// A finalised, de-duplicated match.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchRecord {
    /// Identifier of the source image.
    pub source: String,
    /// Identifier of the pattern image.
    pub pattern: String,
    /// Comparator score, nominally in `[0, 1]`.
    pub confidence: f32,
    pub width: usize,
    pub height: usize,
    /// Column of the top-left corner in source pixels.
    pub x: usize,
    /// Row of the top-left corner in source pixels.
    pub y: usize,
}

impl From<&MatchCandidate<'_>> for MatchRecord {
    fn from(value: &MatchCandidate<'_>) -> Self {
        Self {
            source: value.source.name().to_owned(),
            pattern: value.pattern.name().to_owned(),
            confidence: value.confidence,
            width: value.scale.width,
            height: value.scale.height,
            x: value.x,
            y: value.y,
        }
    }
}

impl std::fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} matches {} at {}x{}+{}+{}",
            self.pattern, self.source, self.width, self.height, self.x, self.y
        )
    }
}
