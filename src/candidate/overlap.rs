//! Greedy overlap resolution.
//!
//! Candidates are scanned once, in the order given. Each is compared with the
//! kept set in insertion order using
//!
//! ```text
//! ratio = overlap(k, v) / (2 * area(v) - overlap(k, v))
//! ```
//!
//! where `v` is the incoming candidate. The first kept entry reaching the
//! ratio limit settles the conflict: `v` replaces it in place when strictly
//! more confident, otherwise `v` is dropped. A candidate conflicting with
//! nothing is appended. The result depends on input order; callers feed
//! windows by descending scale area with each window sorted by confidence.

use crate::candidate::MatchCandidate;
use crate::trace::{trace_event, trace_span};

/// Intersection area of two placed footprints.
pub fn overlap_area(a: &MatchCandidate<'_>, b: &MatchCandidate<'_>) -> usize {
    let dx = (a.x + a.scale.width).min(b.x + b.scale.width);
    let dx = dx.saturating_sub(a.x.max(b.x));
    let dy = (a.y + a.scale.height).min(b.y + b.scale.height);
    let dy = dy.saturating_sub(a.y.max(b.y));
    dx * dy
}

/// Overlap of `incoming` against `kept`, normalised by the incoming area.
pub fn overlap_ratio(kept: &MatchCandidate<'_>, incoming: &MatchCandidate<'_>) -> f64 {
    let ol = overlap_area(kept, incoming) as f64;
    let denom = 2.0 * incoming.area() as f64 - ol;
    if denom <= 0.0 {
        return 0.0;
    }
    ol / denom
}

/// Reduces `candidates` to a set without significant overlap.
///
/// A second pass over the output returns it unchanged only when the first
/// pass never replaced a kept entry in place, which holds for input sorted by
/// descending confidence. A replacement can leave the new entry conflicting
/// with a later kept one; the scan does not revisit earlier decisions.
pub fn resolve_overlaps<'a>(
    candidates: Vec<MatchCandidate<'a>>,
    max_ratio: f64,
) -> Vec<MatchCandidate<'a>> {
    let _span = trace_span!("resolve_overlaps", candidates = candidates.len()).entered();

    let mut kept: Vec<MatchCandidate<'a>> = Vec::new();
    'outer: for cand in candidates {
        for slot in kept.iter_mut() {
            if overlap_ratio(slot, &cand) >= max_ratio {
                if cand.confidence > slot.confidence {
                    *slot = cand;
                }
                continue 'outer;
            }
        }
        kept.push(cand);
    }

    trace_event!("resolved_matches", count = kept.len());
    kept
}
