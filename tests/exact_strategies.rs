use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spims::{classify, Comparator, Pass, Pattern, ScanParams, Source};

const PALETTE: [[u8; 3]; 3] = [[0, 0, 0], [250, 10, 10], [10, 250, 10]];

fn random_pixels(rng: &mut StdRng, width: usize, height: usize) -> Vec<[u8; 3]> {
    (0..width * height)
        .map(|_| PALETTE[rng.random_range(0..PALETTE.len())])
        .collect()
}

#[test]
fn exact_pixel_scores_one_exactly_where_colours_agree() {
    let params = ScanParams::default();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let (w, h) = (rng.random_range(1..12), rng.random_range(1..12));
        let pixels = random_pixels(&mut rng, w, h);
        let target = PALETTE[rng.random_range(0..PALETTE.len())];
        let src = Source::from_rgb("s", w, h, pixels.clone()).unwrap();
        let pat = Pattern::from_rgb("p", 1, 1, vec![target]).unwrap();
        assert_eq!(classify(&pat, &params), Comparator::ExactPixel);

        let map = Comparator::ExactPixel.compare(&src, &pat, Pass::Fine, &params);
        assert_eq!((map.width(), map.height()), (w, h));
        assert_eq!(map.threshold(), params.exact_threshold);
        for y in 0..h {
            for x in 0..w {
                let expected = if pixels[y * w + x] == target { 1.0 } else { 0.0 };
                assert_eq!(map.get(x, y), Some(expected));
            }
        }
    }
}

#[test]
fn exact_block_scores_one_only_on_complete_blocks() {
    let params = ScanParams::default();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let (w, h) = (rng.random_range(4..14), rng.random_range(4..14));
        let (pw, ph) = (rng.random_range(1..4), rng.random_range(2..4));
        let mut pixels: Vec<[u8; 3]> = (0..w * h)
            .map(|_| PALETTE[rng.random_range(0..2)])
            .collect();
        let colour = PALETTE[1];
        let (x0, y0) = (rng.random_range(0..=w - pw), rng.random_range(0..=h - ph));
        for y in y0..y0 + ph {
            for x in x0..x0 + pw {
                pixels[y * w + x] = colour;
            }
        }
        let src = Source::from_rgb("s", w, h, pixels.clone()).unwrap();
        let pat = Pattern::from_rgb("p", pw, ph, vec![colour; pw * ph]).unwrap();
        assert_eq!(classify(&pat, &params), Comparator::ExactBlock);

        let map = Comparator::ExactBlock.compare(&src, &pat, Pass::Fine, &params);
        assert_eq!(map.get(x0, y0), Some(1.0));
        for y in 0..h {
            for x in 0..w {
                let fits = x + pw <= w && y + ph <= h;
                let full = fits
                    && (y..y + ph).all(|yy| (x..x + pw).all(|xx| pixels[yy * w + xx] == colour));
                let expected = if full { 1.0 } else { 0.0 };
                assert_eq!(map.get(x, y), Some(expected), "anchor ({x}, {y})");
            }
        }
    }
}

#[test]
fn oversized_pattern_yields_empty_map() {
    let params = ScanParams::default();
    let src = Source::from_rgb("s", 3, 3, vec![[1, 2, 3]; 9]).unwrap();
    let pat = Pattern::from_rgb("p", 4, 2, vec![[1, 2, 3]; 8]).unwrap();
    for comparator in [Comparator::ExactBlock, Comparator::Correlation] {
        let map = comparator.compare(&src, &pat, Pass::Fine, &params);
        assert!(map.is_empty());
        assert!(map.hits(true).is_empty());
    }
}

#[test]
fn correlation_finds_embedded_patch() {
    let params = ScanParams::default();
    let mut rng = StdRng::seed_from_u64(3);
    let (w, h) = (40, 30);
    let pixels: Vec<[u8; 3]> = (0..w * h)
        .map(|_| {
            let v = rng.random_range(0..=255u8);
            [v, v / 2, 255 - v]
        })
        .collect();
    let (x0, y0, pw, ph) = (17, 9, 8, 6);
    let patch: Vec<[u8; 3]> = (y0..y0 + ph)
        .flat_map(|y| pixels[y * w + x0..y * w + x0 + pw].to_vec())
        .collect();
    let src = Source::from_rgb("s", w, h, pixels).unwrap();
    let pat = Pattern::from_rgb("p", pw, ph, patch).unwrap();
    assert_eq!(classify(&pat, &params), Comparator::Correlation);

    let map = Comparator::Correlation.compare(&src, &pat, Pass::Fine, &params);
    assert_eq!((map.width(), map.height()), (w - pw + 1, h - ph + 1));
    let best = map.get(x0, y0).unwrap();
    assert!((best - 1.0).abs() < 1e-3, "score {best}");
    let hits = map.hits(false);
    assert!(hits.iter().any(|h| (h.x, h.y) == (x0, y0)));
    for hit in &hits {
        assert!(hit.score > map.threshold());
    }
}
