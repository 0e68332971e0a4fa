//! Thresholding policy for correlation surfaces.
//!
//! A nearly flat surface (low standard deviation) makes a mean-relative
//! threshold unstable, so flat surfaces use a fixed or capped offset instead.
//! The fine pass runs on full-resolution data and uses a wider statistical
//! margin with a higher cap.

use crate::kernel::Pass;

/// Threshold constants for the correlation comparator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdPolicy {
    /// Surfaces with a standard deviation below this are treated as flat.
    pub flat_std: f32,
    /// Coarse pass, flat surface: offset added to the mean.
    pub coarse_flat_offset: f32,
    /// Coarse pass, flat surface: upper bound.
    pub coarse_flat_cap: f32,
    /// Fine pass, flat surface: fixed threshold.
    pub fine_flat: f32,
    /// Coarse pass: standard deviations above the mean.
    pub coarse_sigma: f32,
    /// Coarse pass: upper bound.
    pub coarse_cap: f32,
    /// Fine pass: standard deviations above the mean.
    pub fine_sigma: f32,
    /// Fine pass: upper bound.
    pub fine_cap: f32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            flat_std: 0.1,
            coarse_flat_offset: 0.60,
            coarse_flat_cap: 0.70,
            fine_flat: 0.95,
            coarse_sigma: 5.0,
            coarse_cap: 0.69,
            fine_sigma: 5.5,
            fine_cap: 0.984,
        }
    }
}

impl ThresholdPolicy {
    /// Threshold for a surface with the given statistics.
    pub fn threshold(&self, mean: f32, std: f32, pass: Pass) -> f32 {
        match (std < self.flat_std, pass) {
            (true, Pass::Coarse) => (mean + self.coarse_flat_offset).min(self.coarse_flat_cap),
            (true, Pass::Fine) => self.fine_flat,
            (false, Pass::Coarse) => (mean + self.coarse_sigma * std).min(self.coarse_cap),
            (false, Pass::Fine) => (mean + self.fine_sigma * std).min(self.fine_cap),
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        [
            self.flat_std,
            self.coarse_flat_offset,
            self.coarse_flat_cap,
            self.fine_flat,
            self.coarse_sigma,
            self.coarse_cap,
            self.fine_sigma,
            self.fine_cap,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::ThresholdPolicy;
    use crate::kernel::Pass;

    #[test]
    fn flat_surfaces_use_offset_or_fixed_value() {
        let policy = ThresholdPolicy::default();
        assert!((policy.threshold(0.05, 0.01, Pass::Coarse) - 0.65).abs() < 1e-6);
        assert!((policy.threshold(0.30, 0.01, Pass::Coarse) - 0.70).abs() < 1e-6);
        assert!((policy.threshold(0.30, 0.01, Pass::Fine) - 0.95).abs() < 1e-6);
    }

    #[test]
    fn spread_surfaces_use_sigma_margin_with_cap() {
        let policy = ThresholdPolicy::default();
        assert!((policy.threshold(0.0, 0.1, Pass::Coarse) - 0.5).abs() < 1e-6);
        assert!((policy.threshold(0.2, 0.2, Pass::Coarse) - 0.69).abs() < 1e-6);
        assert!((policy.threshold(0.0, 0.1, Pass::Fine) - 0.55).abs() < 1e-6);
        assert!((policy.threshold(0.5, 0.2, Pass::Fine) - 0.984).abs() < 1e-6);
    }
}
