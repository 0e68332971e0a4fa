//! Two-dimensional discrete Fourier transforms on row-major buffers.
//!
//! Transforms are separable: every row is transformed in place, then every
//! column via a transpose. The inverse is normalised by `1 / (width * height)`
//! so `inverse(forward(x)) == x` up to rounding.
//!
//! Plans are cached per thread, so repeated transforms of one extent reuse
//! the same twiddle tables.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftDirection, FftPlanner};
use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
    static PLANNER: RefCell<FftPlanner<f64>> = RefCell::new(FftPlanner::new());
}

/// Cached plan for a 1-D transform of `len` points.
fn plan(len: usize, dir: FftDirection) -> Arc<dyn Fft<f64>> {
    PLANNER.with(|planner| planner.borrow_mut().plan_fft(len, dir))
}

/// Frequency-domain representation of a `width x height` real signal.
#[derive(Clone, Debug)]
pub struct Spectrum {
    data: Vec<Complex<f64>>,
    width: usize,
    height: usize,
}

impl Spectrum {
    /// Forward transform of a real row-major buffer.
    pub fn forward(values: &[f32], width: usize, height: usize) -> Self {
        Self::forward_map(values, width, height, |v| v as f64)
    }

    /// Forward transform of `f(values)` applied element-wise.
    pub fn forward_map(
        values: &[f32],
        width: usize,
        height: usize,
        f: impl Fn(f32) -> f64,
    ) -> Self {
        debug_assert_eq!(values.len(), width * height);
        let mut data: Vec<Complex<f64>> =
            values.iter().map(|&v| Complex::new(f(v), 0.0)).collect();
        transform_2d(&mut data, width, height, FftDirection::Forward);
        Self {
            data,
            width,
            height,
        }
    }

    /// Forward transform of `values` (a `src_width x src_height` block)
    /// zero-padded to `width x height`, anchored at the origin.
    ///
    /// The caller guarantees the block fits inside the padded extent.
    pub fn forward_padded(
        values: &[f64],
        src_width: usize,
        src_height: usize,
        width: usize,
        height: usize,
    ) -> Self {
        debug_assert!(src_width <= width && src_height <= height);
        let mut data = vec![Complex::new(0.0, 0.0); width * height];
        for (y, row) in values.chunks_exact(src_width).take(src_height).enumerate() {
            for (x, &v) in row.iter().enumerate() {
                data[y * width + x] = Complex::new(v, 0.0);
            }
        }
        transform_2d(&mut data, width, height, FftDirection::Forward);
        Self {
            data,
            width,
            height,
        }
    }

    /// Spectrum width (matches the spatial width).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Spectrum height (matches the spatial height).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw frequency coefficients in row-major order.
    pub fn data(&self) -> &[Complex<f64>] {
        &self.data
    }

    /// Cross-correlation with `other` in the spatial domain:
    /// `IFFT(conj(self) * other)`, real part only.
    ///
    /// Both spectra must share the same extent.
    pub fn correlate(&self, other: &Spectrum) -> Vec<f64> {
        debug_assert_eq!(self.data.len(), other.data.len());
        let mut product: Vec<Complex<f64>> = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.conj() * b)
            .collect();
        transform_2d(&mut product, self.width, self.height, FftDirection::Inverse);
        let scale = 1.0 / (self.width * self.height) as f64;
        product.into_iter().map(|c| c.re * scale).collect()
    }
}

fn transform_2d(data: &mut [Complex<f64>], width: usize, height: usize, dir: FftDirection) {
    if width > 1 {
        plan(width, dir).process(data);
    }
    if height > 1 {
        let mut columns = transpose(data, width, height);
        plan(height, dir).process(&mut columns);
        let restored = transpose(&columns, height, width);
        data.copy_from_slice(&restored);
    }
}

fn transpose(data: &[Complex<f64>], width: usize, height: usize) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::new(0.0, 0.0); data.len()];
    for y in 0..height {
        for x in 0..width {
            out[x * height + y] = data[y * width + x];
        }
    }
    out
}
