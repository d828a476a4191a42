//! # Reporter Module
//!
//! Side-by-side facts about a matched pair, to help decide which copy to keep.
//!
//! ## What Is Reported
//! 1. **Pixels**: whether the two files decode to exactly the same pixels
//! 2. **Comparative**: file size, pixel area and modification time of each
//!    side relative to the other (`Higher`, `Same`, `Lower`)
//! 3. **Difference image**: per-pixel absolute RGB difference

mod diff;

pub use diff::diff_image;

use crate::core::fingerprint::{FingerprintRecord, ImageCodec};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How one side of a pair relates to the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Higher,
    Same,
    Lower,
}

impl Relation {
    pub fn of<T: Ord>(this: T, other: T) -> Self {
        match this.cmp(&other) {
            Ordering::Greater => Relation::Higher,
            Ordering::Equal => Relation::Same,
            Ordering::Less => Relation::Lower,
        }
    }

    /// `None` when either side is unknown
    fn of_known<T: Ord>(this: Option<T>, other: Option<T>) -> Option<Self> {
        Some(Self::of(this?, other?))
    }

    pub fn inverse(self) -> Self {
        match self {
            Relation::Higher => Relation::Lower,
            Relation::Same => Relation::Same,
            Relation::Lower => Relation::Higher,
        }
    }
}

/// One side of a [`PairReport`], relative to the other side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReport {
    pub size: Option<Relation>,
    pub area: Option<Relation>,
    pub modified: Option<Relation>,
}

impl RecordReport {
    fn compare(this: &FingerprintRecord, other: &FingerprintRecord) -> Self {
        let area = |record: &FingerprintRecord| {
            record.dimensions().map(|(w, h)| u64::from(w) * u64::from(h))
        };

        Self {
            size: Relation::of_known(this.file_size(), other.file_size()),
            area: Relation::of_known(area(this), area(other)),
            modified: Relation::of_known(this.modified(), other.modified()),
        }
    }

    fn inverse(self) -> Self {
        Self {
            size: self.size.map(Relation::inverse),
            area: self.area.map(Relation::inverse),
            modified: self.modified.map(Relation::inverse),
        }
    }
}

/// Comparison facts about two records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairReport {
    /// Both files decode to the same pixels. False if either fails to decode.
    pub pixels_equal: bool,
    pub first: RecordReport,
    pub second: RecordReport,
}

impl PairReport {
    pub fn build(codec: &dyn ImageCodec, first: &FingerprintRecord, second: &FingerprintRecord) -> Self {
        let pixels_equal = match (codec.decode(first.path()), codec.decode(second.path())) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        let report = RecordReport::compare(first, second);

        Self {
            pixels_equal,
            first: report,
            second: report.inverse(),
        }
    }
}
