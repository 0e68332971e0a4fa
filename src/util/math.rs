//! Numeric helpers shared by the image model and the comparators.

/// Returns the population mean and standard deviation of `values`.
///
/// Accumulates in `f64`; an empty slice yields `(0.0, 0.0)`.
pub(crate) fn mean_std(values: &[f32]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let count = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / count;
    let var = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / count;
    (mean, var.max(0.0).sqrt())
}

/// Greatest common divisor; `gcd(0, n) == n`.
pub(crate) fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Converts an 8-bit RGB triple to ITU-R 601 luma in the 0..255 range.
pub(crate) fn luma(rgb: [u8; 3]) -> f32 {
    let [r, g, b] = rgb;
    r as f32 * 0.299 + g as f32 * 0.587 + b as f32 * 0.114
}

#[cfg(test)]
mod tests {
    use super::{gcd, luma, mean_std};

    #[test]
    fn mean_std_matches_population_formula() {
        let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn mean_std_of_constant_is_zero() {
        let (mean, std) = mean_std(&[3.5; 17]);
        assert!((mean - 3.5).abs() < 1e-12);
        assert!(std < 1e-12);
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }

    #[test]
    fn gcd_reduces_ratios() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 3), 1);
        assert_eq!(gcd(0, 5), 5);
    }

    #[test]
    fn luma_spans_byte_range() {
        assert!(luma([0, 0, 0]).abs() < 1e-6);
        assert!((luma([255, 255, 255]) - 255.0).abs() < 1e-3);
        assert!(luma([0, 255, 0]) > luma([255, 0, 0]));
    }
}
