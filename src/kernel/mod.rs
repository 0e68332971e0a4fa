//! Comparator strategies and the score maps they produce.
//!
//! Three strategies exist and [`classify`] picks one from pattern properties
//! alone: single-pixel patterns compare RGB values directly, constant
//! patterns compare RGB blocks, everything else goes through FFT-based
//! normalised cross-correlation. Every strategy returns a [`ScoreMap`]
//! carrying its own threshold and mean, and an empty map when the pattern
//! does not fit inside the source.

mod exact;
mod ncc;
pub mod threshold;

pub use threshold::ThresholdPolicy;

use crate::model::{Pattern, Source};
use crate::util::math::mean_std;

/// Which stage a comparison belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    /// Reduced-resolution scale search (`fact > 1`).
    Coarse,
    /// Full-resolution window refinement (`fact == 1`).
    Fine,
}

impl Pass {
    /// Pass implied by a coarse factor.
    pub fn for_factor(fact: usize) -> Self {
        if fact > 1 {
            Pass::Coarse
        } else {
            Pass::Fine
        }
    }
}

/// Comparator configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanParams {
    /// Threshold reported by both exact strategies.
    pub exact_threshold: f32,
    /// Patterns whose correlation-buffer std is below this are constant.
    pub constant_std: f64,
    /// Source windows with variance at or below this score zero.
    pub min_window_variance: f64,
    /// Thresholds for correlation surfaces.
    pub thresholds: ThresholdPolicy,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            exact_threshold: 0.999,
            constant_std: 1e-4,
            min_window_variance: 1e-6,
            thresholds: ThresholdPolicy::default(),
        }
    }
}

/// The closed set of comparison strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparator {
    /// Pattern is one pixel: score 1 where the RGB value is equal.
    ExactPixel,
    /// Pattern is constant: score 1 where the whole RGB block is equal.
    ExactBlock,
    /// Normalised cross-correlation via the Fourier domain.
    Correlation,
}

/// Selects the comparator for `pattern`.
pub fn classify(pattern: &Pattern, params: &ScanParams) -> Comparator {
    let rgb = pattern.picture().rgb();
    if rgb.len() == 1 {
        Comparator::ExactPixel
    } else if pattern.std_dev() < params.constant_std {
        Comparator::ExactBlock
    } else {
        Comparator::Correlation
    }
}

impl Comparator {
    /// Scores every placement of `pattern` in `source`.
    ///
    /// Inputs are never modified. A pattern larger than the source yields
    /// an empty map.
    pub fn compare(
        self,
        source: &Source,
        pattern: &Pattern,
        pass: Pass,
        params: &ScanParams,
    ) -> ScoreMap {
        if !pattern.scale().fits_in(source.scale()) {
            return ScoreMap::empty(params.exact_threshold);
        }
        match self {
            Comparator::ExactPixel => exact::exact_pixel(source, pattern, params),
            Comparator::ExactBlock => exact::exact_block(source, pattern, params),
            Comparator::Correlation => ncc::correlate(source, pattern, pass, params),
        }
    }
}

/// Confidence per top-left placement plus the threshold to apply.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMap {
    data: Vec<f32>,
    width: usize,
    height: usize,
    threshold: f32,
    mean: f32,
}

/// One placement that passed the threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub x: usize,
    pub y: usize,
    pub score: f32,
}

impl ScoreMap {
    pub(crate) fn empty(threshold: f32) -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
            threshold,
            mean: 0.0,
        }
    }

    /// Map with a fixed threshold; the mean is computed from `data`.
    pub(crate) fn with_threshold(data: Vec<f32>, width: usize, height: usize, threshold: f32) -> Self {
        debug_assert_eq!(data.len(), width * height);
        let (mean, _) = mean_std(&data);
        Self {
            data,
            width,
            height,
            threshold,
            mean: mean as f32,
        }
    }

    /// Map whose threshold follows `policy` from the map's own statistics.
    pub(crate) fn with_policy(
        data: Vec<f32>,
        width: usize,
        height: usize,
        policy: &ThresholdPolicy,
        pass: Pass,
    ) -> Self {
        debug_assert_eq!(data.len(), width * height);
        let (mean, std) = mean_std(&data);
        let (mean, std) = (mean as f32, std as f32);
        Self {
            data,
            width,
            height,
            threshold: policy.threshold(mean, std, pass),
            mean,
        }
    }

    /// Placements along x.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Placements along y.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major scores.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// True when there are no placements at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decision threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Mean score.
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Score at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Largest score, `None` for an empty map.
    pub fn max(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::max)
    }

    /// Zeroes every score above `ceiling`. Threshold and mean are kept.
    pub fn suppress_above(mut self, ceiling: f32) -> Self {
        for v in self.data.iter_mut() {
            if *v > ceiling {
                *v = 0.0;
            }
        }
        self
    }

    /// Placements in row-major order whose score reaches the threshold.
    ///
    /// `inclusive` selects `>=` (coarse search) over `>` (refinement).
    pub fn hits(&self, inclusive: bool) -> Vec<Hit> {
        let t = self.threshold;
        let mut out = Vec::new();
        if self.width == 0 {
            return out;
        }
        for (y, row) in self.data.chunks_exact(self.width).enumerate() {
            for (x, &score) in row.iter().enumerate() {
                let pass = if inclusive { score >= t } else { score > t };
                if pass {
                    out.push(Hit { x, y, score });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, Comparator, Pass, ScanParams, ScoreMap};
    use crate::model::Pattern;

    #[test]
    fn classifier_picks_by_pattern_shape_and_spread() {
        let params = ScanParams::default();
        let single = Pattern::from_rgb("p", 1, 1, vec![[9, 9, 9]]).unwrap();
        assert_eq!(classify(&single, &params), Comparator::ExactPixel);

        let flat = Pattern::from_rgb("p", 3, 2, vec![[40, 50, 60]; 6]).unwrap();
        assert_eq!(classify(&flat, &params), Comparator::ExactBlock);

        let textured = Pattern::from_rgb(
            "p",
            2,
            2,
            vec![[0, 0, 0], [255, 255, 255], [10, 10, 10], [90, 90, 90]],
        )
        .unwrap();
        assert_eq!(classify(&textured, &params), Comparator::Correlation);
    }

    #[test]
    fn hits_respect_inclusive_flag() {
        let map = ScoreMap::with_threshold(vec![0.5, 1.0, 0.999, 0.2], 2, 2, 0.999);
        let strict: Vec<_> = map.hits(false).iter().map(|h| (h.x, h.y)).collect();
        assert_eq!(strict, vec![(1, 0)]);
        let inclusive: Vec<_> = map.hits(true).iter().map(|h| (h.x, h.y)).collect();
        assert_eq!(inclusive, vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn suppress_above_zeroes_degenerate_scores() {
        let map = ScoreMap::with_threshold(vec![0.5, 1.2, 1.01, 3.0], 2, 2, 0.9);
        let map = map.suppress_above(1.015);
        assert_eq!(map.data(), &[0.5, 0.0, 1.01, 0.0]);
        assert_eq!(map.max(), Some(1.01));
    }

    #[test]
    fn pass_follows_factor() {
        assert_eq!(Pass::for_factor(4), Pass::Coarse);
        assert_eq!(Pass::for_factor(1), Pass::Fine);
    }
}
