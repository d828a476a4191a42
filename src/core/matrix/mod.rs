//! # Matrix Module
//!
//! Lower-triangular cache of pairwise scores, indexed by compact record id.
//!
//! ## Layout
//! Row `i` holds `i` cells, so `N` records take exactly `N·(N−1)/2` cells.
//! The canonical cell of the unordered pair `(a, b)` is `rows[max][min]`.
//! The diagonal has no storage and reads back as [`MatchEntry::INVALID`],
//! as does any cell that was never written.
//!
//! Cells are atomics so compare-phase workers can each write their own
//! cells through a shared reference; every cell is written by exactly one
//! worker and only read after the phase's join barrier.

use crate::core::fingerprint::RecordId;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A similarity score in `[0, 1]` plus an exact-duplicate flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub value: f32,
    pub identical: bool,
}

impl MatchEntry {
    /// Byte-identical decoded content
    pub const PERFECT: MatchEntry = MatchEntry {
        value: 1.0,
        identical: true,
    };

    /// Never computed, or explicitly excluded
    pub const INVALID: MatchEntry = MatchEntry {
        value: 0.0,
        identical: false,
    };

    /// A scored, non-identical match. The score is clamped to `[0, 1]`.
    pub fn scored(value: f32) -> Self {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        Self {
            value,
            identical: false,
        }
    }

    fn pack(self) -> u64 {
        let flag = if self.identical { 1u64 << 32 } else { 0 };
        flag | self.value.to_bits() as u64
    }

    fn unpack(bits: u64) -> Self {
        Self {
            value: f32::from_bits(bits as u32),
            identical: bits & (1u64 << 32) != 0,
        }
    }
}

impl Default for MatchEntry {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Jagged lower-triangular score matrix
#[derive(Debug)]
pub struct MatchMatrix {
    rows: Vec<Box<[AtomicU64]>>,
}

impl MatchMatrix {
    /// Allocate a matrix for `len` records with every cell invalid
    pub fn new(len: usize) -> Self {
        let rows = (0..len)
            .map(|i| (0..i).map(|_| AtomicU64::new(0)).collect::<Box<[_]>>())
            .collect();
        Self { rows }
    }

    /// Number of records the matrix is sized for
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of addressable cells, `N·(N−1)/2`
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }

    fn cell(&self, a: RecordId, b: RecordId) -> Option<&AtomicU64> {
        let (high, low) = if a > b { (a, b) } else { (b, a) };
        self.rows.get(high as usize)?.get(low as usize)
    }

    /// Read the canonical cell for `(a, b)`.
    ///
    /// The diagonal and out-of-range ids read as invalid.
    pub fn get(&self, a: RecordId, b: RecordId) -> MatchEntry {
        self.cell(a, b)
            .map(|cell| MatchEntry::unpack(cell.load(Ordering::Relaxed)))
            .unwrap_or(MatchEntry::INVALID)
    }

    /// Write the canonical cell for `(a, b)`. Returns false if there is no such cell.
    pub fn set(&self, a: RecordId, b: RecordId, entry: MatchEntry) -> bool {
        match self.cell(a, b) {
            Some(cell) => {
                cell.store(entry.pack(), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Force the cell for `(a, b)` back to invalid
    pub fn invalidate(&self, a: RecordId, b: RecordId) -> bool {
        self.set(a, b, MatchEntry::INVALID)
    }
}
