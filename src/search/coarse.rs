//! Coarse scale search with iterative deepening.
//!
//! The bucket list (descending coarse area) is sampled with a stride that
//! halves every round. Each sampled bucket is scored at reduced resolution;
//! buckets whose best score lies within the retention band of the round's
//! best are expanded into a neighbourhood of `step` buckets on either side
//! and form the next round's candidate set. The search is best-effort: it
//! returns scales whose score lies in the retained band, not necessarily the
//! globally best scale.
//!
//! Windows are taken from the last round that produced any hit. A round is
//! cut short at the first bucket whose resized pattern drifts too far in
//! standard deviation from the downsampled pattern.

use crate::kernel::{classify, Hit, Pass};
use crate::model::{sort_by_area_desc, Pattern, Scale, Source, Window};
use crate::search::scales::ScaleSpace;
use crate::search::{MatchConfig, SearchStats};
use crate::trace::{trace_debug, trace_event, trace_span};
use std::collections::{BTreeSet, HashMap};

/// A full-resolution scale and the source region to refine it in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleWindow {
    pub scale: Scale,
    pub window: Window,
}

/// Outcome of probing one sampled bucket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum BucketProbe {
    /// At least one placement passed the threshold.
    Hit { max: f32, window: Window },
    /// The comparator ran but nothing passed.
    Miss,
    /// The resized pattern drifted past the SLOP limit; ends the round.
    Drifted,
}

/// Result of the deepening loop: windows per bucket from the last round
/// with hits, and the number of rounds run.
#[derive(Clone, Debug, Default)]
pub(crate) struct Deepening {
    pub windows: HashMap<usize, Window>,
    pub rounds: usize,
}

/// Bounding window of coarse hits in full-resolution coordinates.
///
/// Hit positions are multiplied by `fact`; each hit covers a footprint of
/// `footprint` plus one pixel. The box is widened by `margin` on every side,
/// clamped at zero on the low side and left unclipped on the high side.
pub fn find_window(hits: &[Hit], fact: usize, footprint: Scale, margin: usize) -> Option<Window> {
    let first = hits.first()?;
    let mut left = first.x * fact;
    let mut top = first.y * fact;
    let mut right = left + footprint.width + 1;
    let mut bottom = top + footprint.height + 1;
    for hit in &hits[1..] {
        let (x, y) = (hit.x * fact, hit.y * fact);
        left = left.min(x);
        top = top.min(y);
        right = right.max(x + footprint.width + 1);
        bottom = bottom.max(y + footprint.height + 1);
    }
    Some(Window {
        left: left.saturating_sub(margin),
        right: right + margin,
        top: top.saturating_sub(margin),
        bottom: bottom + margin,
    })
}

/// True when a resized pattern's std moved more than `slop` away from the
/// downsampled pattern's std.
pub(crate) fn drift_exceeds(base_std: f64, resized_std: f64, slop: f64) -> bool {
    (resized_std - base_std).abs() > slop
}

/// Iterative deepening over `n` buckets.
///
/// Each round probes every `step`-th candidate in order and stops early at
/// the first [`BucketProbe::Drifted`]. Buckets whose max lies strictly above
/// `best - band` are expanded to `[bucket - step, bucket + step)` clipped to
/// `[0, n)`, and `step` halves. A round without hits ends the search and
/// keeps the previous round's windows.
pub(crate) fn deepen<F>(n: usize, initial_step: usize, band: f32, mut probe: F) -> Deepening
where
    F: FnMut(usize) -> BucketProbe,
{
    let mut out = Deepening::default();
    let mut step = initial_step;
    let mut candidates: Vec<usize> = (0..n).collect();

    while step > 0 && candidates.len() >= step {
        let mut scores: Vec<(usize, f32, Window)> = Vec::new();
        let mut sampled = 0usize;
        for &bucket in candidates.iter().step_by(step) {
            sampled += 1;
            match probe(bucket) {
                BucketProbe::Hit { max, window } => scores.push((bucket, max, window)),
                BucketProbe::Miss => {}
                BucketProbe::Drifted => break,
            }
        }
        out.rounds += 1;
        if scores.is_empty() {
            trace_event!("scale_round", step = step, sampled = sampled, matched = 0usize);
            break;
        }

        out.windows = scores.iter().map(|&(b, _, w)| (b, w)).collect();
        let best = scores
            .iter()
            .map(|&(_, max, _)| max)
            .fold(f32::NEG_INFINITY, f32::max);
        let mut next = BTreeSet::new();
        for &(bucket, _, _) in scores.iter().filter(|s| s.1 > best - band) {
            let begin = bucket.saturating_sub(step);
            let end = (bucket + step).min(n);
            next.extend(begin..end);
        }

        trace_event!(
            "scale_round",
            step = step,
            sampled = sampled,
            matched = scores.len(),
            retained = next.len(),
            best = best
        );
        candidates = next.into_iter().collect();
        step /= 2;
    }
    out
}

/// Runs the coarse search and maps every surviving full-resolution scale to
/// its window, ordered by descending scale area.
pub(crate) fn search_scales(
    source: &Source,
    pattern: &Pattern,
    cfg: &MatchConfig,
    stats: &mut SearchStats,
) -> Vec<ScaleWindow> {
    let fact = cfg.factors.factor(pattern.scale());
    let space = ScaleSpace::enumerate(pattern.scale(), source.scale(), fact);
    stats.coarse_factor = fact;
    stats.scales = space.scale_count();
    stats.buckets = space.len();

    let _span = trace_span!("scale_search", fact = fact, buckets = space.len()).entered();
    if space.is_empty() {
        return Vec::new();
    }

    let small_source = source.downscale(fact);
    let small_pattern = pattern.downscale(fact);
    let n = space.len();
    let step = (n / cfg.sample_divisor.max(1)).max(1);
    let mut comparisons = 0usize;
    let result = deepen(n, step, cfg.retention_band, |bucket| {
        probe_bucket(&small_source, &small_pattern, &space, bucket, cfg, &mut comparisons)
    });
    stats.comparisons += comparisons;
    stats.rounds += result.rounds;

    let mut out: Vec<ScaleWindow> = result
        .windows
        .iter()
        .flat_map(|(&bucket, &window)| {
            space.buckets()[bucket]
                .members
                .iter()
                .map(move |&scale| ScaleWindow { scale, window })
        })
        .collect();
    sort_scale_windows(&mut out);
    trace_event!("scale_windows", count = out.len());
    out
}

/// Orders scale windows by descending scale area.
pub(crate) fn sort_scale_windows(windows: &mut [ScaleWindow]) {
    let mut scales: Vec<Scale> = windows.iter().map(|w| w.scale).collect();
    sort_by_area_desc(&mut scales);
    let rank: HashMap<Scale, usize> = scales.into_iter().enumerate().map(|(i, s)| (s, i)).collect();
    windows.sort_by_key(|w| rank.get(&w.scale).copied().unwrap_or(usize::MAX));
}

fn probe_bucket(
    source: &Source,
    pattern: &Pattern,
    space: &ScaleSpace,
    bucket: usize,
    cfg: &MatchConfig,
    comparisons: &mut usize,
) -> BucketProbe {
    let fact = space.factor();
    let low = space.buckets()[bucket].low;
    let resized = pattern.resize(low);
    if drift_exceeds(pattern.std_dev(), resized.std_dev(), cfg.slop_std) {
        trace_debug!(
            "scale_rejected",
            height = low.height,
            width = low.width,
            base_std = pattern.std_dev(),
            resized_std = resized.std_dev()
        );
        return BucketProbe::Drifted;
    }

    let comparator = classify(&resized, &cfg.scan);
    *comparisons += 1;
    let map = comparator
        .compare(source, &resized, Pass::for_factor(fact), &cfg.scan)
        .suppress_above(cfg.score_ceiling);
    let hits = map.hits(true);
    let (Some(max), Some(window)) = (
        map.max(),
        find_window(&hits, fact, low.times(fact), cfg.window_margin),
    ) else {
        return BucketProbe::Miss;
    };
    trace_debug!(
        "scale_scored",
        height = low.height,
        width = low.width,
        max = max,
        hits = hits.len()
    );
    BucketProbe::Hit { max, window }
}
