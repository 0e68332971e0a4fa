//! Feasible pattern scales and their coarse buckets.
//!
//! Scales grow from the pattern's native size in steps of its aspect ratio
//! reduced to lowest terms, so every candidate keeps the exact aspect ratio.
//! Each full-resolution scale is bucketed under its floor division by the
//! coarse factor; the coarse search runs once per bucket.

use crate::model::{sort_by_area_desc, Scale};
use crate::util::math::gcd;
use std::collections::HashMap;

/// Chooses the coarse factor from the pattern size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoarseFactorPolicy {
    /// Both dimensions above this use `large_factor`.
    pub large_min_dim: usize,
    pub large_factor: usize,
    /// Both dimensions above this use `small_factor`.
    pub small_min_dim: usize,
    pub small_factor: usize,
}

impl Default for CoarseFactorPolicy {
    fn default() -> Self {
        Self {
            large_min_dim: 1500,
            large_factor: 10,
            small_min_dim: 10,
            small_factor: 4,
        }
    }
}

impl CoarseFactorPolicy {
    /// Coarse factor for a pattern of the given size; 1 disables downsampling.
    pub fn factor(&self, pattern: Scale) -> usize {
        let above = |min: usize| pattern.height > min && pattern.width > min;
        let fact = if above(self.large_min_dim) {
            self.large_factor
        } else if above(self.small_min_dim) {
            self.small_factor
        } else {
            1
        };
        fact.max(1)
    }
}

/// Full-resolution scales sharing one coarse key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaleBucket {
    /// Coarse (downsampled) scale.
    pub low: Scale,
    /// Full-resolution scales in generation order.
    pub members: Vec<Scale>,
}

/// All feasible scales of a pattern inside a source, grouped by bucket.
#[derive(Clone, Debug)]
pub struct ScaleSpace {
    fact: usize,
    buckets: Vec<ScaleBucket>,
}

impl ScaleSpace {
    /// Enumerates `(h0 + k*a, w0 + k*b)` for `k >= 0` while the scale fits in
    /// `source`, where `a:b` is `h0:w0` in lowest terms. Buckets are ordered
    /// by descending coarse area.
    pub fn enumerate(pattern: Scale, source: Scale, fact: usize) -> Self {
        let fact = fact.max(1);
        let g = gcd(pattern.height, pattern.width).max(1);
        let (a, b) = (pattern.height / g, pattern.width / g);

        let mut order: Vec<Scale> = Vec::new();
        let mut members: HashMap<Scale, Vec<Scale>> = HashMap::new();
        let mut current = pattern;
        while current.fits_in(source) && current.height > 0 && current.width > 0 {
            let low = current.floor_div(fact);
            members
                .entry(low)
                .or_insert_with(|| {
                    order.push(low);
                    Vec::new()
                })
                .push(current);
            current = Scale::new(current.height + a, current.width + b);
        }

        sort_by_area_desc(&mut order);
        let buckets = order
            .into_iter()
            .map(|low| ScaleBucket {
                low,
                members: members.remove(&low).unwrap_or_default(),
            })
            .collect();
        Self { fact, buckets }
    }

    /// Coarse factor used for bucketing.
    pub fn factor(&self) -> usize {
        self.fact
    }

    /// Buckets by descending coarse area.
    pub fn buckets(&self) -> &[ScaleBucket] {
        &self.buckets
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of full-resolution scales.
    pub fn scale_count(&self) -> usize {
        self.buckets.iter().map(|b| b.members.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{CoarseFactorPolicy, ScaleSpace};
    use crate::model::Scale;

    #[test]
    fn factor_depends_on_both_dimensions() {
        let policy = CoarseFactorPolicy::default();
        assert_eq!(policy.factor(Scale::new(1600, 1501)), 10);
        assert_eq!(policy.factor(Scale::new(1600, 1500)), 4);
        assert_eq!(policy.factor(Scale::new(11, 11)), 4);
        assert_eq!(policy.factor(Scale::new(11, 10)), 1);
        assert_eq!(policy.factor(Scale::new(3, 3)), 1);
    }

    #[test]
    fn scales_follow_reduced_aspect_ratio() {
        let space = ScaleSpace::enumerate(Scale::new(4, 6), Scale::new(12, 14), 1);
        let mut all: Vec<Scale> = space
            .buckets()
            .iter()
            .flat_map(|b| b.members.iter().copied())
            .collect();
        all.sort();
        assert_eq!(
            all,
            vec![
                Scale::new(4, 6),
                Scale::new(6, 9),
                Scale::new(8, 12)
            ]
        );
    }

    #[test]
    fn buckets_group_by_floor_division() {
        let space = ScaleSpace::enumerate(Scale::new(12, 12), Scale::new(20, 30), 4);
        let lows: Vec<Scale> = space.buckets().iter().map(|b| b.low).collect();
        assert_eq!(
            lows,
            vec![Scale::new(5, 5), Scale::new(4, 4), Scale::new(3, 3)]
        );
        assert_eq!(space.buckets()[0].members, vec![Scale::new(20, 20)]);
        assert_eq!(space.buckets()[2].members.len(), 4);
        for bucket in space.buckets() {
            for m in &bucket.members {
                assert_eq!(m.floor_div(4), bucket.low);
            }
        }
        assert_eq!(space.scale_count(), 9);
    }

    #[test]
    fn oversized_pattern_has_no_scales() {
        let space = ScaleSpace::enumerate(Scale::new(10, 4), Scale::new(9, 40), 1);
        assert!(space.is_empty());
    }
}
