//! The per-image record and its fingerprint.

use super::histogram::ChannelHistograms;
use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

/// Compact sequential id of a fingerprinted record; indexes the match matrix
pub type RecordId = u32;

/// Root tag. `0` means ungrouped.
pub type GroupId = u32;

/// Summary data derived from one decoded image
#[derive(Debug, Clone)]
pub struct Fingerprint {
    pub(crate) resolution: u16,
    /// `resolution × resolution` samples, row-major
    pub(crate) grid: Vec<Rgb<u8>>,
    pub(crate) thumbnail: RgbImage,
    pub(crate) content_hash: u128,
    pub(crate) histograms: ChannelHistograms,
    pub(crate) dimensions: (u32, u32),
}

impl Fingerprint {
    pub fn resolution(&self) -> u16 {
        self.resolution
    }

    pub fn grid(&self) -> &[Rgb<u8>] {
        &self.grid
    }

    /// Aspect-preserving preview
    pub fn thumbnail(&self) -> &RgbImage {
        &self.thumbnail
    }

    /// Hash of the downsampled grid's raw bytes
    pub fn content_hash(&self) -> u128 {
        self.content_hash
    }

    /// Full-resolution channel histograms
    pub fn histograms(&self) -> &ChannelHistograms {
        &self.histograms
    }

    /// Full image dimensions (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }
}

/// Size and modification time of the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub size: u64,
    pub modified: SystemTime,
}

/// One candidate image.
///
/// Created unfingerprinted by the enumerator; either it has no fingerprint
/// (resolution 0) or a complete one.
#[derive(Debug, Clone)]
pub struct FingerprintRecord {
    path: PathBuf,
    group: GroupId,
    id: Option<RecordId>,
    fingerprint: Option<Fingerprint>,
    stats: OnceLock<Option<FileStats>>,
}

impl FingerprintRecord {
    pub fn new(path: impl Into<PathBuf>, group: GroupId) -> Self {
        Self {
            path: path.into(),
            group,
            id: None,
            fingerprint: None,
            stats: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Compact id, assigned only after successful fingerprinting
    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// Downsample resolution used, or 0 if not fingerprinted
    pub fn resolution(&self) -> u16 {
        self.fingerprint.as_ref().map_or(0, |f| f.resolution)
    }

    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    pub fn is_fingerprinted(&self) -> bool {
        self.fingerprint.is_some()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.fingerprint.as_ref().map(|f| f.dimensions)
    }

    /// Whether two records came from the same configured root of a multi-root run
    pub fn shares_group_with(&self, other: &FingerprintRecord) -> bool {
        self.group != 0 && self.group == other.group
    }

    /// File size and mtime, read from disk on first call and cached
    pub fn file_stats(&self) -> Option<FileStats> {
        *self.stats.get_or_init(|| {
            let metadata = fs::metadata(&self.path).ok()?;
            Some(FileStats {
                size: metadata.len(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            })
        })
    }

    pub fn file_size(&self) -> Option<u64> {
        self.file_stats().map(|s| s.size)
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.file_stats().map(|s| s.modified)
    }

    pub(crate) fn set_fingerprint(&mut self, fingerprint: Fingerprint) {
        self.fingerprint = Some(fingerprint);
    }

    pub(crate) fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}
