//! Scale hypotheses and search windows in source pixel coordinates.

/// Hypothesised on-source size of a pattern.
///
/// Ordering is lexicographic on `(height, width)`; callers that need
/// area order sort explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scale {
    /// Rows.
    pub height: usize,
    /// Columns.
    pub width: usize,
}

impl Scale {
    /// Creates a scale from `(height, width)`.
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Pixel count of the footprint.
    pub fn area(&self) -> usize {
        self.height * self.width
    }

    /// Both dimensions divided by `fact`, rounding down.
    pub fn floor_div(&self, fact: usize) -> Self {
        Self::new(self.height / fact, self.width / fact)
    }

    /// Both dimensions multiplied by `fact`.
    pub fn times(&self, fact: usize) -> Self {
        Self::new(self.height * fact, self.width * fact)
    }

    /// True when a footprint of this size fits inside `other`.
    pub fn fits_in(&self, other: Scale) -> bool {
        self.height <= other.height && self.width <= other.width
    }
}

/// Sorts scales by descending area, breaking ties by descending
/// `(height, width)` so the order is total.
pub fn sort_by_area_desc(scales: &mut [Scale]) {
    scales.sort_by(|a, b| b.area().cmp(&a.area()).then_with(|| b.cmp(a)));
}

/// Bounding box `[left, right) x [top, bottom)` in source pixels.
///
/// `right` and `bottom` may exceed the source extent; cropping clips them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Window {
    pub left: usize,
    pub right: usize,
    pub top: usize,
    pub bottom: usize,
}

impl Window {
    /// Window covering a whole `width x height` image.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            left: 0,
            right: width,
            top: 0,
            bottom: height,
        }
    }

    /// Clips to `width x height`; `None` when nothing remains.
    pub fn clip(&self, width: usize, height: usize) -> Option<Window> {
        let right = self.right.min(width);
        let bottom = self.bottom.min(height);
        if self.left >= right || self.top >= bottom {
            return None;
        }
        Some(Window {
            left: self.left,
            right,
            top: self.top,
            bottom,
        })
    }

    /// Width of the window.
    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    /// Height of the window.
    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }
}
