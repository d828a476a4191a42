//! # Fingerprint Module
//!
//! Turns an image file into the summary data used for comparison.
//!
//! ## What a Fingerprint Holds
//! 1. An `R × R` grid of colors sampled from the whole image (aspect ignored)
//! 2. A content hash of that grid's raw bytes (fast exact-duplicate signal)
//! 3. Normalized 256-bin R/G/B histograms of the full-resolution image
//! 4. An aspect-preserving thumbnail and the full image dimensions
//!
//! Decoding goes through the [`ImageCodec`] trait so the engine never
//! depends on a particular decoder.
//!
//! ## Example
//! ```rust,ignore
//! let generator = FingerprintGenerator::new(Arc::new(DefaultCodec));
//! let mut record = FingerprintRecord::new("/photos/a.jpg", 0);
//! generator.generate(&mut record, 32)?;
//! ```

mod codec;
mod generator;
mod histogram;
mod record;

pub use codec::{fit_within, DefaultCodec, ImageCodec};
pub use generator::{FingerprintGenerator, GenerateOutcome, DEFAULT_THUMBNAIL_SIZE};
pub use histogram::{ChannelHistograms, BINS};
pub use record::{FileStats, Fingerprint, FingerprintRecord, GroupId, RecordId};
