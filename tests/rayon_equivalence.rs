#![cfg(feature = "rayon")]

use spims::{MatchConfig, Matcher, Pattern, Scale, SearchMode, Source};

fn textured(width: usize, height: usize, seed: usize) -> Vec<[u8; 3]> {
    (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            let v = (((x / 3) * 11 + (y / 3) * 7 + seed) % 9 * 25) as u8;
            [v, 255 - v, v / 2]
        })
        .collect()
}

#[test]
fn parallel_refinement_matches_sequential() {
    let pat = Pattern::from_rgb("p", 12, 12, textured(12, 12, 1)).unwrap();
    let occurrence = pat.resize(Scale::new(18, 18));
    let (w, h) = (60, 50);
    let mut px = textured(w, h, 4);
    for (dy, row) in occurrence.picture().rgb().data().chunks_exact(18).enumerate() {
        let start = (20 + dy) * w + 25;
        px[start..start + 18].copy_from_slice(row);
    }
    let src = Source::from_rgb("s", w, h, px).unwrap();

    let sequential = Matcher::new();
    let parallel = Matcher::new().with_config(MatchConfig {
        parallel: true,
        ..MatchConfig::default()
    });
    for mode in [SearchMode::Scaled, SearchMode::Fixed] {
        let a = sequential.match_pair_report(&src, &pat, mode);
        let b = parallel.match_pair_report(&src, &pat, mode);
        assert_eq!(a.records, b.records);
        assert_eq!(a.stats, b.stats);
    }
}
