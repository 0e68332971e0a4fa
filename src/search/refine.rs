//! Full-resolution refinement inside coarse windows.
//!
//! Every scale window crops the source, resizes the pattern to the target
//! scale and runs the selected comparator in the fine pass. Scores above the
//! ceiling are zeroed before thresholding. Candidates of one window are
//! sorted by descending confidence and windows are concatenated in the order
//! given (descending scale area), which is the order overlap resolution
//! expects.

use crate::candidate::{sort_by_confidence_desc, MatchCandidate};
use crate::kernel::{classify, Pass};
use crate::model::{Pattern, Source, Window};
use crate::search::coarse::ScaleWindow;
use crate::search::{MatchConfig, SearchStats};
use crate::trace::{trace_event, trace_span};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::borrow::Cow;

/// Candidates of one window and whether a comparator ran for it.
struct WindowResult<'a> {
    candidates: Vec<MatchCandidate<'a>>,
    compared: bool,
}

fn region<'s>(source: &'s Source, window: Window) -> Option<Cow<'s, Source>> {
    let scale = source.scale();
    if window == Window::full(scale.width, scale.height) {
        return Some(Cow::Borrowed(source));
    }
    source.window(window).map(Cow::Owned)
}

fn refine_window<'a>(
    source: &'a Source,
    pattern: &'a Pattern,
    target: &ScaleWindow,
    cfg: &MatchConfig,
) -> WindowResult<'a> {
    let Some(region) = region(source, target.window) else {
        return WindowResult {
            candidates: Vec::new(),
            compared: false,
        };
    };
    let resized = pattern.resize(target.scale);
    let comparator = classify(&resized, &cfg.scan);
    let map = comparator
        .compare(&region, &resized, Pass::Fine, &cfg.scan)
        .suppress_above(cfg.score_ceiling);

    let (dx, dy) = (target.window.left, target.window.top);
    let mut candidates: Vec<MatchCandidate<'a>> = map
        .hits(false)
        .into_iter()
        .map(|hit| MatchCandidate {
            confidence: hit.score,
            x: hit.x + dx,
            y: hit.y + dy,
            scale: target.scale,
            pattern,
            source,
        })
        .collect();
    sort_by_confidence_desc(&mut candidates);
    WindowResult {
        candidates,
        compared: true,
    }
}

/// Refines every scale window and concatenates the candidates in window
/// order.
pub(crate) fn refine_windows<'a>(
    source: &'a Source,
    pattern: &'a Pattern,
    targets: &[ScaleWindow],
    cfg: &MatchConfig,
    stats: &mut SearchStats,
) -> Vec<MatchCandidate<'a>> {
    let _span = trace_span!("window_refinement", windows = targets.len()).entered();

    #[cfg(feature = "rayon")]
    let results: Vec<WindowResult<'a>> = if cfg.parallel {
        targets
            .par_iter()
            .map(|target| refine_window(source, pattern, target, cfg))
            .collect()
    } else {
        targets
            .iter()
            .map(|target| refine_window(source, pattern, target, cfg))
            .collect()
    };
    #[cfg(not(feature = "rayon"))]
    let results: Vec<WindowResult<'a>> = targets
        .iter()
        .map(|target| refine_window(source, pattern, target, cfg))
        .collect();

    stats.windows += targets.len();
    let mut out = Vec::new();
    for result in results {
        if result.compared {
            stats.comparisons += 1;
        }
        out.extend(result.candidates);
    }
    stats.candidates += out.len();
    trace_event!("refined_candidates", count = out.len());
    out
}
