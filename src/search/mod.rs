//! Matching pipeline: scale search, window refinement, overlap resolution.
//!
//! [`Matcher::match_pair`] is the single entry point. In
//! [`SearchMode::Scaled`] the coarse search proposes scales and windows and
//! each is refined at full resolution; in [`SearchMode::Fixed`] the native
//! pattern is compared once against the whole source. Both end with greedy
//! overlap resolution.

pub mod coarse;
pub(crate) mod refine;
pub mod scales;

pub use coarse::{find_window, ScaleWindow};
pub use scales::{CoarseFactorPolicy, ScaleBucket, ScaleSpace};

use crate::candidate::overlap::resolve_overlaps;
use crate::candidate::MatchRecord;
use crate::kernel::ScanParams;
use crate::model::{Pattern, Source, Window};
use crate::util::{SpimsError, SpimsResult};

/// How a pair is searched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Coarse-to-fine search over every feasible scale.
    #[default]
    Scaled,
    /// One comparison at the pattern's native size over the whole source.
    Fixed,
}

/// Tunable constants of the matcher.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchConfig {
    /// Comparator settings.
    pub scan: ScanParams,
    /// Coarse factor selection.
    pub factors: CoarseFactorPolicy,
    /// Scores above this are treated as numerically degenerate and zeroed.
    pub score_ceiling: f32,
    /// Maximum std drift of a resized coarse pattern before a round stops.
    pub slop_std: f64,
    /// Buckets within this of the round's best score are retained.
    pub retention_band: f32,
    /// Initial sampling stride is `buckets / sample_divisor` (at least 1).
    pub sample_divisor: usize,
    /// Pixels added around each coarse window.
    pub window_margin: usize,
    /// Overlap ratio at which two candidates conflict.
    pub overlap_ratio: f64,
    /// Refine windows in parallel (effective with the `rayon` feature).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            scan: ScanParams::default(),
            factors: CoarseFactorPolicy::default(),
            score_ceiling: 1.015,
            slop_std: 4.5,
            retention_band: 0.02,
            sample_divisor: 100,
            window_margin: 10,
            overlap_ratio: 0.5,
            parallel: false,
        }
    }
}

impl MatchConfig {
    /// Checks ranges that would make the search meaningless.
    pub fn validate(&self) -> SpimsResult<()> {
        if self.sample_divisor == 0 {
            return Err(SpimsError::InvalidConfig("sample_divisor must be positive"));
        }
        if self.factors.large_factor == 0 || self.factors.small_factor == 0 {
            return Err(SpimsError::InvalidConfig("coarse factors must be positive"));
        }
        if !self.scan.thresholds.is_finite()
            || !self.scan.exact_threshold.is_finite()
            || !self.score_ceiling.is_finite()
            || !self.retention_band.is_finite()
        {
            return Err(SpimsError::InvalidConfig("thresholds must be finite"));
        }
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !non_negative(self.slop_std) || !non_negative(self.scan.constant_std) {
            return Err(SpimsError::InvalidConfig("std limits must be non-negative"));
        }
        if !non_negative(self.scan.min_window_variance) {
            return Err(SpimsError::InvalidConfig("min_window_variance must be non-negative"));
        }
        if self.overlap_ratio.is_nan() || self.overlap_ratio <= 0.0 || self.overlap_ratio > 1.0 {
            return Err(SpimsError::InvalidConfig("overlap_ratio must be in (0, 1]"));
        }
        Ok(())
    }
}

/// Counters collected while matching one pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Coarse factor chosen for the pattern (0 when no search ran).
    pub coarse_factor: usize,
    /// Feasible full-resolution scales.
    pub scales: usize,
    /// Coarse buckets.
    pub buckets: usize,
    /// Coarse search rounds executed.
    pub rounds: usize,
    /// Comparator invocations, coarse and fine.
    pub comparisons: usize,
    /// Scale windows handed to refinement.
    pub windows: usize,
    /// Raw candidates before overlap resolution.
    pub candidates: usize,
}

/// Final records with the counters that produced them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchReport {
    pub records: Vec<MatchRecord>,
    pub stats: SearchStats,
}

/// Locates a pattern inside a source.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    cfg: MatchConfig,
}

impl Matcher {
    /// Creates a matcher with default constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// De-duplicated matches of `pattern` in `source`.
    ///
    /// Never fails: a pattern larger than the source, or a search that finds
    /// nothing, yields an empty list.
    pub fn match_pair(&self, source: &Source, pattern: &Pattern, mode: SearchMode) -> Vec<MatchRecord> {
        self.match_pair_report(source, pattern, mode).records
    }

    /// Like [`Matcher::match_pair`], also returning search counters.
    pub fn match_pair_report(
        &self,
        source: &Source,
        pattern: &Pattern,
        mode: SearchMode,
    ) -> MatchReport {
        let mut stats = SearchStats::default();
        if !pattern.scale().fits_in(source.scale()) {
            return MatchReport {
                records: Vec::new(),
                stats,
            };
        }

        let targets = match mode {
            SearchMode::Scaled => coarse::search_scales(source, pattern, &self.cfg, &mut stats),
            SearchMode::Fixed => {
                let full = source.scale();
                vec![ScaleWindow {
                    scale: pattern.scale(),
                    window: Window::full(full.width, full.height),
                }]
            }
        };
        let candidates = refine::refine_windows(source, pattern, &targets, &self.cfg, &mut stats);
        let records = resolve_overlaps(candidates, self.cfg.overlap_ratio)
            .iter()
            .map(MatchRecord::from)
            .collect();
        MatchReport { records, stats }
    }

    /// Scale windows the coarse search proposes for this pair, by
    /// descending scale area. Best-effort: the true scale is only
    /// guaranteed to be considered if it falls in the retained band.
    pub fn scale_windows(&self, source: &Source, pattern: &Pattern) -> Vec<ScaleWindow> {
        if !pattern.scale().fits_in(source.scale()) {
            return Vec::new();
        }
        let mut stats = SearchStats::default();
        coarse::search_scales(source, pattern, &self.cfg, &mut stats)
    }
}

/// Matches with default constants.
pub fn match_pair(source: &Source, pattern: &Pattern, mode: SearchMode) -> Vec<MatchRecord> {
    Matcher::new().match_pair(source, pattern, mode)
}
