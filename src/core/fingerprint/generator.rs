//! Fills in a record's fingerprint from its source file.

use super::codec::ImageCodec;
use super::histogram::ChannelHistograms;
use super::record::{Fingerprint, FingerprintRecord};
use crate::error::FingerprintError;
use image::RgbImage;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_128;

/// Default side of the aspect-preserving preview
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 128;

/// What a call to [`FingerprintGenerator::generate`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// The file was decoded and the fingerprint (re)built
    Generated,
    /// The record already had a fingerprint at this resolution
    AlreadyCurrent,
}

/// Decodes images and derives their fingerprints
#[derive(Clone)]
pub struct FingerprintGenerator {
    codec: Arc<dyn ImageCodec>,
    thumbnail_size: u32,
}

impl FingerprintGenerator {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            codec,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }

    pub fn with_thumbnail_size(mut self, size: u32) -> Self {
        self.thumbnail_size = size.max(1);
        self
    }

    pub fn codec(&self) -> &Arc<dyn ImageCodec> {
        &self.codec
    }

    /// Fingerprint `record` at `resolution`.
    ///
    /// On failure the record is left untouched, so a previously unfingerprinted
    /// record stays unfingerprinted.
    pub fn generate(
        &self,
        record: &mut FingerprintRecord,
        resolution: u16,
    ) -> Result<GenerateOutcome, FingerprintError> {
        if resolution == 0 {
            return Err(FingerprintError::InvalidResolution { value: resolution });
        }
        if record.resolution() == resolution {
            return Ok(GenerateOutcome::AlreadyCurrent);
        }

        let image = self.codec.decode(record.path())?;
        let fingerprint = self.fingerprint_image(&image, resolution)?;
        record.set_fingerprint(fingerprint);

        Ok(GenerateOutcome::Generated)
    }

    /// Build a fingerprint from an already decoded image.
    pub fn fingerprint_image(
        &self,
        image: &RgbImage,
        resolution: u16,
    ) -> Result<Fingerprint, FingerprintError> {
        if resolution == 0 {
            return Err(FingerprintError::InvalidResolution { value: resolution });
        }

        let side = resolution as u32;
        let sampled = self.codec.resample(image, side, side)?;
        let thumbnail = self.codec.thumbnail(image, self.thumbnail_size)?;

        Ok(Fingerprint {
            resolution,
            content_hash: xxh3_128(sampled.as_raw()),
            grid: sampled.pixels().copied().collect(),
            thumbnail,
            histograms: ChannelHistograms::from_image(image),
            dimensions: image.dimensions(),
        })
    }
}
