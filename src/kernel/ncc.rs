//! Normalised cross-correlation through the Fourier domain.
//!
//! For pattern `P` with `n` pixels, zero-mean copy `P0` and standard deviation
//! `sP`, and a ones-kernel `U` of the same shape, both zero-padded to the
//! source extent:
//!
//! ```text
//! top  = IFFT(conj(FFT(P0)) * FFT(S))
//! bot1 = n * IFFT(conj(FFT(U)) * FFT(S^2))
//! bot2 = IFFT(conj(FFT(U)) * FFT(S))^2
//! ncc  = top / (sP * sqrt(bot1 - bot2))
//! ```
//!
//! The source spectra come from the [`Source`] cache, so only the two padded
//! kernels are transformed per call. Only placements where the pattern lies
//! fully inside the source are returned, which also drops every position
//! touched by circular wrap-around.

use crate::fft::Spectrum;
use crate::kernel::{Pass, ScanParams, ScoreMap};
use crate::model::{Pattern, Source};

pub(crate) fn correlate(
    source: &Source,
    pattern: &Pattern,
    pass: Pass,
    params: &ScanParams,
) -> ScoreMap {
    let src = source.scale();
    let tpl = pattern.picture();
    let (sw, sh) = (src.width, src.height);
    let (pw, ph) = (tpl.width(), tpl.height());
    let out_w = sw - pw + 1;
    let out_h = sh - ph + 1;

    let n = (pw * ph) as f64;
    let mean = tpl.mean();
    let std = tpl.std_dev();
    let zero_mean: Vec<f64> = tpl.gray().data().iter().map(|&v| v as f64 - mean).collect();
    let ones = vec![1.0f64; pw * ph];

    let tpl_spec = Spectrum::forward_padded(&zero_mean, pw, ph, sw, sh);
    let ones_spec = Spectrum::forward_padded(&ones, pw, ph, sw, sh);
    let top = tpl_spec.correlate(source.spectrum());
    let sum = ones_spec.correlate(source.spectrum());
    let sum_sq = ones_spec.correlate(source.spectrum_sq());

    // n * sum_sq - sum^2 == n^2 * window variance
    let min_radicand = params.min_window_variance * n * n;
    let mut data = Vec::with_capacity(out_w * out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            let idx = y * sw + x;
            let radicand = (n * sum_sq[idx] - sum[idx] * sum[idx]).max(0.0);
            let score = if radicand <= min_radicand || std <= 0.0 {
                0.0
            } else {
                top[idx] / (std * radicand.sqrt())
            };
            data.push(if score.is_finite() { score as f32 } else { 0.0 });
        }
    }

    ScoreMap::with_policy(data, out_w, out_h, &params.thresholds, pass)
}

#[cfg(test)]
mod tests {
    use super::correlate;
    use crate::kernel::{Pass, ScanParams};
    use crate::model::{Pattern, Source};

    fn texture(width: usize, height: usize) -> Vec<[u8; 3]> {
        (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                let v = ((x * 37 + y * 91 + x * y * 13) % 251) as u8;
                [v, v, v]
            })
            .collect()
    }

    fn patch(px: &[[u8; 3]], width: usize, x0: usize, y0: usize, w: usize, h: usize) -> Vec<[u8; 3]> {
        let mut out = Vec::with_capacity(w * h);
        for y in y0..y0 + h {
            out.extend_from_slice(&px[y * width + x0..y * width + x0 + w]);
        }
        out
    }

    #[test]
    fn embedded_patch_scores_one_at_its_origin() {
        let (w, h) = (24, 20);
        let px = texture(w, h);
        let src = Source::from_rgb("s", w, h, px.clone()).unwrap();
        let pat = Pattern::from_rgb("p", 6, 5, patch(&px, w, 9, 7, 6, 5)).unwrap();
        let map = correlate(&src, &pat, Pass::Fine, &ScanParams::default());
        assert_eq!((map.width(), map.height()), (19, 16));
        let at = map.get(9, 7).unwrap();
        assert!((at - 1.0).abs() < 1e-4, "score at origin {at}");
        let max = map.max().unwrap();
        assert!((max - at).abs() < 1e-6);
        assert!(map.data().iter().all(|v| v.is_finite() && *v <= 1.0 + 1e-4));
    }

    #[test]
    fn flat_source_windows_score_zero() {
        let src = Source::from_rgb("s", 10, 10, vec![[77, 77, 77]; 100]).unwrap();
        let pat = Pattern::from_rgb("p", 3, 3, texture(3, 3)).unwrap();
        let map = correlate(&src, &pat, Pass::Coarse, &ScanParams::default());
        assert!(map.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn score_is_invariant_to_brightness_and_contrast() {
        let (w, h) = (16, 16);
        let px = texture(w, h);
        let src = Source::from_rgb("s", w, h, px.clone()).unwrap();
        let scaled: Vec<[u8; 3]> = patch(&px, w, 4, 5, 5, 5)
            .into_iter()
            .map(|[v, _, _]| {
                let s = (v as f32 * 0.5 + 20.0).round() as u8;
                [s, s, s]
            })
            .collect();
        let pat = Pattern::from_rgb("p", 5, 5, scaled).unwrap();
        let map = correlate(&src, &pat, Pass::Fine, &ScanParams::default());
        let at = map.get(4, 5).unwrap();
        assert!(at > 0.99, "score {at}");
    }
}
