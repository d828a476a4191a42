//! # Similarity Module
//!
//! Scores a pair of fingerprinted records.
//!
//! ## How It Works
//! 1. If the grid hashes match and a full-resolution re-decode of both files
//!    confirms equal pixels, the pair is a perfect, identical match.
//! 2. Otherwise two signals are combined:
//!    - pixel-grid agreement of the `R × R` samples
//!    - `1 −` the worst per-channel Bhattacharyya distance of the
//!      full-resolution histograms
//!
//! | Signal     | Weight |
//! |------------|--------|
//! | Pixel grid | 0.3    |
//! | Histogram  | 0.7    |
//!
//! Global color distribution dominates, so scaled or lightly cropped copies
//! still score high.

mod metrics;

pub use metrics::{bhattacharyya_distance, histogram_similarity, pixel_similarity};

use crate::core::fingerprint::{Fingerprint, FingerprintRecord, ImageCodec};
use crate::core::matrix::MatchEntry;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Relative weights of the two signals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityWeights {
    pub pixel: f64,
    pub histogram: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            pixel: 0.3,
            histogram: 0.7,
        }
    }
}

/// Pairwise scoring function
#[derive(Clone)]
pub struct SimilarityEngine {
    codec: Arc<dyn ImageCodec>,
    weights: SimilarityWeights,
}

impl SimilarityEngine {
    /// The codec is used to re-read both files when their grid hashes match
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            codec,
            weights: SimilarityWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: SimilarityWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> SimilarityWeights {
        self.weights
    }

    /// Score two records.
    ///
    /// Unfingerprinted records, or records fingerprinted at different
    /// resolutions, cannot be compared and score as invalid.
    pub fn compare(&self, a: &FingerprintRecord, b: &FingerprintRecord) -> MatchEntry {
        if std::ptr::eq(a, b) {
            return MatchEntry::PERFECT;
        }

        let (Some(fa), Some(fb)) = (a.fingerprint(), b.fingerprint()) else {
            return MatchEntry::INVALID;
        };

        if fa.resolution() != fb.resolution() {
            debug!(
                a = %a.path().display(),
                b = %b.path().display(),
                "resolution mismatch, not comparable"
            );
            return MatchEntry::INVALID;
        }

        if fa.content_hash() == fb.content_hash() && self.pixels_equal(a.path(), b.path()) {
            return MatchEntry::PERFECT;
        }

        MatchEntry::scored(self.score(fa, fb) as f32)
    }

    /// Weighted combination of the two signals, ignoring the identical fast path
    pub fn score(&self, a: &Fingerprint, b: &Fingerprint) -> f64 {
        let pixel = pixel_similarity(a.grid(), b.grid());
        let histogram = histogram_similarity(a.histograms(), b.histograms());
        (self.weights.pixel * pixel + self.weights.histogram * histogram).clamp(0.0, 1.0)
    }

    /// Full-resolution pixel equality. Decode failures count as "not equal".
    fn pixels_equal(&self, a: &Path, b: &Path) -> bool {
        match (self.codec.decode(a), self.codec.decode(b)) {
            (Ok(image_a), Ok(image_b)) => image_a == image_b,
            _ => false,
        }
    }
}
