//! Exact RGB comparators for single-pixel and constant patterns.

use crate::kernel::{ScanParams, ScoreMap};
use crate::model::{Pattern, Source};

/// Scores 1.0 at every source pixel whose RGB value equals the pattern's
/// single pixel, 0.0 elsewhere. The map covers the whole source.
pub(crate) fn exact_pixel(source: &Source, pattern: &Pattern, params: &ScanParams) -> ScoreMap {
    let rgb = source.picture().rgb();
    let Some(&target) = pattern.picture().rgb().data().first() else {
        return ScoreMap::empty(params.exact_threshold);
    };
    let data = rgb
        .data()
        .iter()
        .map(|&px| if px == target { 1.0 } else { 0.0 })
        .collect();
    ScoreMap::with_threshold(data, rgb.width(), rgb.height(), params.exact_threshold)
}

/// Scores 1.0 at anchors where the pattern's RGB block matches the source
/// element for element, 0.0 elsewhere. The map covers the whole source;
/// anchors whose footprint would leave the source never match.
pub(crate) fn exact_block(source: &Source, pattern: &Pattern, params: &ScanParams) -> ScoreMap {
    let src = source.picture().rgb();
    let tpl = pattern.picture().rgb();
    let (sw, sh) = (src.width(), src.height());
    let (pw, ph) = (tpl.width(), tpl.height());
    let Some(&anchor) = tpl.data().first() else {
        return ScoreMap::empty(params.exact_threshold);
    };

    let mut data = vec![0.0f32; sw * sh];
    if pw <= sw && ph <= sh {
        let src_view = src.view();
        for y in 0..=sh - ph {
            for x in 0..=sw - pw {
                if src.get(x, y) != Some(&anchor) {
                    continue;
                }
                let Ok(block) = src_view.roi(x, y, pw, ph) else {
                    continue;
                };
                let equal = block
                    .rows()
                    .zip(tpl.data().chunks_exact(pw))
                    .all(|(a, b)| a == b);
                if equal {
                    data[y * sw + x] = 1.0;
                }
            }
        }
    }
    ScoreMap::with_threshold(data, sw, sh, params.exact_threshold)
}

#[cfg(test)]
mod tests {
    use super::{exact_block, exact_pixel};
    use crate::kernel::ScanParams;
    use crate::model::{Pattern, Source};

    const BG: [u8; 3] = [10, 20, 30];
    const FG: [u8; 3] = [200, 100, 50];

    fn source_with_block(x0: usize, y0: usize, size: usize) -> Source {
        let (w, h) = (8, 7);
        let mut px = vec![BG; w * h];
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                px[y * w + x] = FG;
            }
        }
        Source::from_rgb("s", w, h, px).unwrap()
    }

    #[test]
    fn exact_pixel_marks_equal_colours() {
        let src = source_with_block(1, 2, 2);
        let pat = Pattern::from_rgb("p", 1, 1, vec![FG]).unwrap();
        let map = exact_pixel(&src, &pat, &ScanParams::default());
        assert_eq!((map.width(), map.height()), (8, 7));
        assert_eq!(map.data().iter().filter(|&&v| v == 1.0).count(), 4);
        assert_eq!(map.get(1, 2), Some(1.0));
        assert_eq!(map.get(0, 0), Some(0.0));
        assert!((map.threshold() - 0.999).abs() < 1e-6);
        assert!((map.mean() - 4.0 / 56.0).abs() < 1e-6);
    }

    #[test]
    fn exact_block_needs_full_footprint() {
        let src = source_with_block(3, 1, 3);
        let pat = Pattern::from_rgb("p", 2, 2, vec![FG; 4]).unwrap();
        let map = exact_block(&src, &pat, &ScanParams::default());
        let ones: Vec<_> = map.hits(false).iter().map(|h| (h.x, h.y)).collect();
        assert_eq!(ones, vec![(3, 1), (4, 1), (3, 2), (4, 2)]);
    }

    #[test]
    fn exact_block_rejects_single_wrong_pixel() {
        let (w, h) = (6, 6);
        let mut px = vec![BG; w * h];
        for y in 1..4 {
            for x in 1..4 {
                px[y * w + x] = FG;
            }
        }
        px[3 * w + 3] = [201, 100, 50];
        let src = Source::from_rgb("s", w, h, px).unwrap();
        let pat = Pattern::from_rgb("p", 3, 3, vec![FG; 9]).unwrap();
        let map = exact_block(&src, &pat, &ScanParams::default());
        assert!(map.hits(false).is_empty());
    }
}
