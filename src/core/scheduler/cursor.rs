//! Work-claim cursors.
//!
//! Each cursor hides a tiny critical section: lock, bump a counter, unlock.
//! The work itself always runs after the guard is dropped.

use std::sync::{Mutex, PoisonError};

/// One unit of claimed work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim<T> {
    pub item: T,
    /// 1-based count of units claimed so far, including this one
    pub ordinal: u64,
}

/// Hands out `0..len` exactly once each
#[derive(Debug)]
pub struct IndexCursor {
    next: Mutex<usize>,
    len: usize,
}

impl IndexCursor {
    pub fn new(len: usize) -> Self {
        Self {
            next: Mutex::new(0),
            len,
        }
    }

    pub fn claim(&self) -> Option<Claim<usize>> {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        if *next >= self.len {
            return None;
        }
        let index = *next;
        *next += 1;

        Some(Claim {
            item: index,
            ordinal: *next as u64,
        })
    }
}

#[derive(Debug)]
struct PairState {
    outer: usize,
    inner: usize,
    claimed: u64,
}

/// Hands out every unordered pair `(a, b)` with `a < b < len` exactly once.
///
/// The outer index is the larger id and the inner index runs `0..outer`,
/// wrapping to zero as the outer index advances. That walks the match
/// matrix row by row.
#[derive(Debug)]
pub struct PairCursor {
    state: Mutex<PairState>,
    len: usize,
}

impl PairCursor {
    pub fn new(len: usize) -> Self {
        Self {
            state: Mutex::new(PairState {
                outer: 1,
                inner: 0,
                claimed: 0,
            }),
            len,
        }
    }

    pub fn claim(&self) -> Option<Claim<(usize, usize)>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.outer >= self.len {
            return None;
        }

        let pair = (state.inner, state.outer);
        state.inner += 1;
        if state.inner == state.outer {
            state.outer += 1;
            state.inner = 0;
        }
        state.claimed += 1;

        Some(Claim {
            item: pair,
            ordinal: state.claimed,
        })
    }
}

/// Number of unordered pairs among `n` items, `n·(n−1)/2`
pub fn pair_count(n: usize) -> u64 {
    let n = n as u64;
    n * n.saturating_sub(1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn index_cursor_yields_each_index_once() {
        let cursor = IndexCursor::new(3);
        let claimed: Vec<_> = std::iter::from_fn(|| cursor.claim()).collect();

        assert_eq!(
            claimed.iter().map(|c| c.item).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(claimed.last().map(|c| c.ordinal), Some(3));
        assert!(cursor.claim().is_none());
    }

    #[test]
    fn pair_cursor_covers_every_pair_once() {
        let cursor = PairCursor::new(5);
        let pairs: Vec<_> = std::iter::from_fn(|| cursor.claim()).map(|c| c.item).collect();

        assert_eq!(pairs.len() as u64, pair_count(5));
        let unique: HashSet<_> = pairs.iter().copied().collect();
        assert_eq!(unique.len(), pairs.len());
        assert!(pairs.iter().all(|&(a, b)| a < b && b < 5));
        assert_eq!(&pairs[..3], &[(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn pair_cursor_with_fewer_than_two_items_is_empty() {
        assert!(PairCursor::new(0).claim().is_none());
        assert!(PairCursor::new(1).claim().is_none());
    }

    #[test]
    fn pair_count_matches_triangle() {
        assert_eq!(pair_count(0), 0);
        assert_eq!(pair_count(1), 0);
        assert_eq!(pair_count(2), 1);
        assert_eq!(pair_count(100), 4950);
    }

    #[test]
    fn cursors_are_shared_safely_across_threads() {
        let cursor = PairCursor::new(40);
        let seen = Mutex::new(HashSet::new());

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    while let Some(claim) = cursor.claim() {
                        assert!(seen.lock().unwrap().insert(claim.item));
                    }
                });
            }
        });

        assert_eq!(seen.into_inner().unwrap().len() as u64, pair_count(40));
    }
}
