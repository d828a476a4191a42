//! The two similarity signals.

use crate::core::fingerprint::{ChannelHistograms, BINS};
use image::Rgb;

/// Mean per-sample color agreement of two equally sized grids, in `[0, 1]`.
///
/// Each sample contributes `(3 − (|ΔR| + |ΔG| + |ΔB|)) / 3` with channel
/// deltas normalized to `[0, 1]`.
pub fn pixel_similarity(a: &[Rgb<u8>], b: &[Rgb<u8>]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let total: f64 = a
        .iter()
        .zip(b)
        .map(|(pa, pb)| {
            let delta: f64 = (0..3)
                .map(|c| (pa[c] as f64 - pb[c] as f64).abs() / 255.0)
                .sum();
            (3.0 - delta) / 3.0
        })
        .sum();

    total / a.len() as f64
}

/// Bhattacharyya distance between two histograms, in `[0, 1]`. 0 = same distribution.
///
/// Histograms need not be normalized; an empty histogram is maximally distant.
pub fn bhattacharyya_distance(a: &[f64; BINS], b: &[f64; BINS]) -> f64 {
    let sum_a: f64 = a.iter().sum();
    let sum_b: f64 = b.iter().sum();
    let norm = (sum_a * sum_b).sqrt();
    if norm <= f64::EPSILON {
        return 1.0;
    }

    let coefficient: f64 = a.iter().zip(b).map(|(x, y)| (x * y).sqrt()).sum();
    (1.0 - coefficient / norm).max(0.0).sqrt().min(1.0)
}

/// `1 −` the worst per-channel Bhattacharyya distance
pub fn histogram_similarity(a: &ChannelHistograms, b: &ChannelHistograms) -> f64 {
    let worst = a
        .channels()
        .iter()
        .zip(b.channels())
        .map(|(ca, cb)| bhattacharyya_distance(ca, cb))
        .fold(0.0, f64::max);

    1.0 - worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn histograms(color: [u8; 3]) -> ChannelHistograms {
        ChannelHistograms::from_image(&RgbImage::from_pixel(4, 4, Rgb(color)))
    }

    #[test]
    fn identical_grids_agree_fully() {
        let grid = vec![Rgb([10, 20, 30]); 16];
        assert_eq!(pixel_similarity(&grid, &grid), 1.0);
    }

    #[test]
    fn opposite_grids_do_not_agree() {
        let black = vec![Rgb([0, 0, 0]); 4];
        let white = vec![Rgb([255, 255, 255]); 4];
        assert_eq!(pixel_similarity(&black, &white), 0.0);
    }

    #[test]
    fn one_channel_flip_costs_a_third() {
        let red = vec![Rgb([255, 0, 0]); 4];
        let black = vec![Rgb([0, 0, 0]); 4];
        assert!((pixel_similarity(&red, &black) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_grids_score_zero() {
        let a = vec![Rgb([0, 0, 0]); 4];
        let b = vec![Rgb([0, 0, 0]); 9];
        assert_eq!(pixel_similarity(&a, &b), 0.0);
        assert_eq!(pixel_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn bhattacharyya_of_identical_is_zero() {
        let h = histograms([12, 200, 99]);
        assert!(bhattacharyya_distance(&h.red, &h.red) < 1e-9);
        assert!((histogram_similarity(&h, &h) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bhattacharyya_of_disjoint_is_one() {
        let a = histograms([0, 0, 0]);
        let b = histograms([255, 0, 0]);
        assert!((bhattacharyya_distance(&a.red, &b.red) - 1.0).abs() < 1e-9);
        // the worst channel decides
        assert!(histogram_similarity(&a, &b).abs() < 1e-9);
    }

    #[test]
    fn bhattacharyya_is_symmetric() {
        let a = ChannelHistograms::from_image(&RgbImage::from_fn(8, 8, |x, _| Rgb([x as u8 * 30, 0, 0])));
        let b = ChannelHistograms::from_image(&RgbImage::from_fn(8, 8, |_, y| Rgb([y as u8 * 20, 0, 0])));
        let ab = bhattacharyya_distance(&a.red, &b.red);
        let ba = bhattacharyya_distance(&b.red, &a.red);
        assert!((ab - ba).abs() < 1e-12);
        assert!(ab > 0.0 && ab < 1.0);
    }

    #[test]
    fn empty_histogram_is_maximally_distant() {
        let empty = [0.0; BINS];
        let h = histograms([1, 1, 1]);
        assert_eq!(bhattacharyya_distance(&empty, &h.red), 1.0);
    }
}
