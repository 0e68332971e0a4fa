use criterion::{criterion_group, criterion_main, Criterion};
use spims::{Comparator, Matcher, Pass, Pattern, Scale, ScanParams, SearchMode, Source};
use std::hint::black_box;

fn make_pixels(width: usize, height: usize) -> Vec<[u8; 3]> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = (((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF) as u8;
            data.push([value, value / 2, 255 - value]);
        }
    }
    data
}

fn extract_patch(
    pixels: &[[u8; 3]],
    img_width: usize,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
) -> Vec<[u8; 3]> {
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = (y0 + y) * img_width;
        out.extend_from_slice(&pixels[row + x0..row + x0 + width]);
    }
    out
}

fn bench_matcher(c: &mut Criterion) {
    let (img_width, img_height) = (256, 256);
    let pixels = make_pixels(img_width, img_height);
    let source = Source::from_rgb("source", img_width, img_height, pixels.clone()).unwrap();

    let patch = extract_patch(&pixels, img_width, 60, 50, 48, 48);
    let pattern = Pattern::from_rgb("pattern", 48, 48, patch).unwrap();
    let params = ScanParams::default();

    c.bench_function("ncc_compare_256_48", |b| {
        b.iter(|| {
            let map = Comparator::Correlation.compare(
                black_box(&source),
                black_box(&pattern),
                Pass::Fine,
                &params,
            );
            black_box(map.max());
        })
    });

    c.bench_function("source_spectra_256", |b| {
        b.iter(|| {
            let src = Source::new(black_box(source.picture().clone()));
            black_box(src.scale());
        })
    });

    let small = pattern.resize(Scale::new(32, 32));
    let matcher = Matcher::new();
    c.bench_function("match_pair_scaled_256_32", |b| {
        b.iter(|| {
            let records = matcher.match_pair(black_box(&source), black_box(&small), SearchMode::Scaled);
            black_box(records.len());
        })
    });
    c.bench_function("match_pair_fixed_256_48", |b| {
        b.iter(|| {
            let records = matcher.match_pair(black_box(&source), black_box(&pattern), SearchMode::Fixed);
            black_box(records.len());
        })
    });
}

criterion_group!(benches, bench_matcher);
criterion_main!(benches);
