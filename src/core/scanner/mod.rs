//! # Scanner Module
//!
//! Walks the configured roots and produces unfingerprinted record stubs.
//!
//! ## Groups
//! With a single root every record is ungrouped (group `0`) and may be
//! compared with every other record. With several roots each root gets its
//! own nonzero group id, and records sharing a nonzero group are never
//! compared with each other. This lets a new folder be checked against
//! several reference folders without comparing files inside any one folder.
//!
//! ## Example
//! ```rust,ignore
//! use cuttle::core::scanner::{FileEnumerator, ScanConfig, ScanRoot};
//!
//! let enumerator = FileEnumerator::new(ScanConfig::default());
//! let result = enumerator.enumerate(&[ScanRoot::recursive("/Users/photos")]);
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{FileEnumerator, ScanConfig};

use crate::core::fingerprint::{FingerprintRecord, GroupId};
use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A configured root directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRoot {
    pub path: PathBuf,
    /// Descend into subdirectories
    pub recursive: bool,
}

impl ScanRoot {
    pub fn new(path: impl Into<PathBuf>, recursive: bool) -> Self {
        Self {
            path: path.into(),
            recursive,
        }
    }

    pub fn recursive(path: impl Into<PathBuf>) -> Self {
        Self::new(path, true)
    }

    pub fn flat(path: impl Into<PathBuf>) -> Self {
        Self::new(path, false)
    }
}

/// Result of enumerating a set of roots
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Unfingerprinted record stubs in root order
    pub records: Vec<FingerprintRecord>,
    /// Roots or entries that could not be read (non-fatal)
    pub skipped: Vec<ScanError>,
}

/// Group id for the root at `index` out of `root_count` roots
pub fn group_for_root(index: usize, root_count: usize) -> GroupId {
    if root_count > 1 {
        index as GroupId + 1
    } else {
        0
    }
}
