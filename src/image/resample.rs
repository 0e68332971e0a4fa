//! Resampling of owned images.
//!
//! Decimation keeps every `fact`-th row and column starting at the origin, so
//! the output extent is `ceil(dim / fact)` and no filtering is applied.
//! Resizing uses bilinear interpolation with pixel-centre alignment:
//! destination pixel `x` samples source coordinate
//! `(x + 0.5) * src_w / dst_w - 0.5`, clamped to the valid range.

use crate::image::{ImageView, OwnedImage};

/// Keeps every `fact`-th pixel in both directions; `fact <= 1` copies.
pub fn decimate<T: Copy>(src: ImageView<'_, T>, fact: usize) -> OwnedImage<T> {
    if fact <= 1 {
        return src.to_owned_image();
    }
    let width = src.width().div_ceil(fact);
    let height = src.height().div_ceil(fact);
    let mut data = Vec::with_capacity(width * height);
    for row in src.rows().step_by(fact) {
        data.extend(row.iter().step_by(fact).copied());
    }
    OwnedImage {
        data,
        width,
        height,
    }
}

/// Sampling positions and weight along one axis.
#[derive(Clone, Copy, Debug)]
struct Tap {
    i0: usize,
    i1: usize,
    frac: f32,
}

fn taps(src_len: usize, dst_len: usize) -> Vec<Tap> {
    let ratio = src_len as f32 / dst_len as f32;
    let max = (src_len - 1) as f32;
    (0..dst_len)
        .map(|d| {
            let pos = ((d as f32 + 0.5) * ratio - 0.5).clamp(0.0, max);
            let i0 = pos.floor() as usize;
            let i1 = (i0 + 1).min(src_len - 1);
            Tap {
                i0,
                i1,
                frac: pos - i0 as f32,
            }
        })
        .collect()
}

fn bilinear<T: Copy, F>(
    src: ImageView<'_, T>,
    width: usize,
    height: usize,
    mut blend: F,
) -> OwnedImage<T>
where
    F: FnMut([T; 4], [f32; 4]) -> T,
{
    let xs = taps(src.width(), width);
    let ys = taps(src.height(), height);
    let mut data = Vec::with_capacity(width * height);
    for ty in &ys {
        let (Some(row0), Some(row1)) = (src.row(ty.i0), src.row(ty.i1)) else {
            continue;
        };
        for tx in &xs {
            let w00 = (1.0 - tx.frac) * (1.0 - ty.frac);
            let w10 = tx.frac * (1.0 - ty.frac);
            let w01 = (1.0 - tx.frac) * ty.frac;
            let w11 = tx.frac * ty.frac;
            data.push(blend(
                [row0[tx.i0], row0[tx.i1], row1[tx.i0], row1[tx.i1]],
                [w00, w10, w01, w11],
            ));
        }
    }
    OwnedImage {
        data,
        width,
        height,
    }
}

/// Resizes a floating-point image to `width x height` with bilinear sampling.
///
/// Returns a copy when the extent is unchanged.
pub fn resize_f32(src: ImageView<'_, f32>, width: usize, height: usize) -> OwnedImage<f32> {
    if src.width() == width && src.height() == height {
        return src.to_owned_image();
    }
    bilinear(src, width, height, |px, w| {
        px[0] * w[0] + px[1] * w[1] + px[2] * w[2] + px[3] * w[3]
    })
}

/// Resizes an RGB image channel by channel, rounding to the nearest byte.
///
/// Returns a copy when the extent is unchanged. A constant image stays
/// exactly constant because the weights always sum to one.
pub fn resize_rgb(src: ImageView<'_, [u8; 3]>, width: usize, height: usize) -> OwnedImage<[u8; 3]> {
    if src.width() == width && src.height() == height {
        return src.to_owned_image();
    }
    bilinear(src, width, height, |px, w| {
        let mut out = [0u8; 3];
        for (c, slot) in out.iter_mut().enumerate() {
            let value = px[0][c] as f32 * w[0]
                + px[1][c] as f32 * w[1]
                + px[2][c] as f32 * w[2]
                + px[3][c] as f32 * w[3];
            *slot = value.round().clamp(0.0, 255.0) as u8;
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::{decimate, resize_f32, resize_rgb};
    use crate::image::OwnedImage;

    #[test]
    fn decimate_keeps_every_nth_pixel() {
        let img = OwnedImage::new((0u8..25).collect(), 5, 5).unwrap();
        let out = decimate(img.view(), 2);
        assert_eq!((out.width(), out.height()), (3, 3));
        assert_eq!(out.data(), &[0, 2, 4, 10, 12, 14, 20, 22, 24]);
    }

    #[test]
    fn decimate_by_one_copies() {
        let img = OwnedImage::new(vec![1.0f32, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(decimate(img.view(), 1), img);
    }

    #[test]
    fn resize_same_extent_is_identity() {
        let img = OwnedImage::new(vec![0.5f32, 1.5, 2.5, 3.5, 4.5, 5.5], 3, 2).unwrap();
        assert_eq!(resize_f32(img.view(), 3, 2), img);
    }

    #[test]
    fn resize_upsamples_linear_ramp_monotonically() {
        let img = OwnedImage::new(vec![0.0f32, 10.0, 20.0, 30.0], 4, 1).unwrap();
        let out = resize_f32(img.view(), 8, 1);
        assert_eq!(out.width(), 8);
        let data = out.data();
        assert!(data.windows(2).all(|w| w[1] >= w[0]));
        assert!(data[0].abs() < 1e-6);
        assert!((data[7] - 30.0).abs() < 1e-6);
    }

    #[test]
    fn resize_rgb_keeps_constant_colour() {
        let img = OwnedImage::filled([200u8, 17, 3], 3, 3).unwrap();
        let out = resize_rgb(img.view(), 7, 5);
        assert_eq!((out.width(), out.height()), (7, 5));
        assert!(out.data().iter().all(|&px| px == [200, 17, 3]));
    }
}
