//! The queryable outcome of a completed run.

use crate::core::fingerprint::{FingerprintRecord, RecordId};
use crate::core::matrix::{MatchEntry, MatchMatrix};
use crate::error::QueryError;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Records of a completed run plus their match matrix.
///
/// Records live in an arena where index == id. Removing a record only
/// clears its live flag: the arena and the matrix keep their shape, so
/// removal changes what `sets()` and the threshold queries return but never
/// the matrix.
#[derive(Debug)]
pub struct ResultSet {
    records: Vec<FingerprintRecord>,
    live: Vec<AtomicBool>,
    matrix: MatchMatrix,
}

impl ResultSet {
    /// `records[i].id()` must be `Some(i)` and the matrix sized to match
    pub(crate) fn new(records: Vec<FingerprintRecord>, matrix: MatchMatrix) -> Self {
        debug_assert_eq!(records.len(), matrix.len());
        debug_assert!(records
            .iter()
            .enumerate()
            .all(|(i, r)| r.id() == Some(i as RecordId)));

        let live = records.iter().map(|_| AtomicBool::new(true)).collect();
        Self {
            records,
            live,
            matrix,
        }
    }

    /// Arena size, including removed records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|l| l.load(Ordering::Relaxed)).count()
    }

    pub fn matrix(&self) -> &MatchMatrix {
        &self.matrix
    }

    /// Any record of the run, removed or not
    pub fn record(&self, id: RecordId) -> Option<&FingerprintRecord> {
        self.records.get(id as usize)
    }

    /// Id of the record with this path
    pub fn find(&self, path: &Path) -> Option<RecordId> {
        self.records
            .iter()
            .find(|r| r.path() == path)
            .and_then(FingerprintRecord::id)
    }

    pub fn is_live(&self, id: RecordId) -> bool {
        self.live
            .get(id as usize)
            .is_some_and(|l| l.load(Ordering::Relaxed))
    }

    /// Live record ids in id order
    pub fn sets(&self) -> Vec<RecordId> {
        self.live_ids().collect()
    }

    /// Live records in id order
    pub fn records(&self) -> impl Iterator<Item = &FingerprintRecord> + '_ {
        self.live_ids().map(|id| &self.records[id as usize])
    }

    fn live_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        (0..self.records.len() as RecordId).filter(|&id| self.is_live(id))
    }

    pub(crate) fn check(&self, id: RecordId) -> Result<(), QueryError> {
        if (id as usize) < self.records.len() {
            Ok(())
        } else {
            Err(QueryError::UnknownRecord { id })
        }
    }

    /// Both ids exist and name different records
    pub(crate) fn check_pair(&self, a: RecordId, b: RecordId) -> Result<(), QueryError> {
        self.check(a)?;
        self.check(b)?;
        if a == b {
            return Err(QueryError::SelfPair { id: a });
        }
        Ok(())
    }

    /// Score of the pair. A record against itself is always a perfect match.
    pub fn match_score(&self, a: RecordId, b: RecordId) -> Result<MatchEntry, QueryError> {
        self.check(a)?;
        self.check(b)?;
        if a == b {
            return Ok(MatchEntry::PERFECT);
        }
        Ok(self.matrix.get(a, b))
    }

    /// Best score of `id` against every other live record; 0 if there are none
    pub fn highest_score(&self, id: RecordId) -> Result<f32, QueryError> {
        self.check(id)?;
        Ok(self
            .live_ids()
            .filter(|&other| other != id)
            .map(|other| self.matrix.get(id, other).value)
            .fold(0.0, f32::max))
    }

    /// Live records whose highest score is at least `threshold`, best first
    pub fn sets_above_threshold(&self, threshold: f32) -> Vec<RecordId> {
        let mut scored: Vec<(RecordId, f32)> = self
            .live_ids()
            .filter_map(|id| {
                let best = self.highest_score(id).ok()?;
                (best >= threshold).then_some((id, best))
            })
            .collect();

        sort_best_first(&mut scored);
        scored.into_iter().map(|(id, _)| id).collect()
    }

    /// Live records other than `anchor` scoring at least `threshold` against it, best first
    pub fn sets_above_threshold_for(
        &self,
        anchor: RecordId,
        threshold: f32,
    ) -> Result<Vec<RecordId>, QueryError> {
        self.check(anchor)?;
        let mut scored: Vec<(RecordId, f32)> = self
            .live_ids()
            .filter(|&id| id != anchor)
            .map(|id| (id, self.matrix.get(anchor, id).value))
            .filter(|&(_, score)| score >= threshold)
            .collect();

        sort_best_first(&mut scored);
        Ok(scored.into_iter().map(|(id, _)| id).collect())
    }

    /// Live pairs `(a, b)`, `a < b`, flagged as pixel-identical
    pub fn identical_pairs(&self) -> Vec<(RecordId, RecordId)> {
        let ids: Vec<RecordId> = self.live_ids().collect();
        let mut pairs = Vec::new();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                if self.matrix.get(a, b).identical {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    /// Drop `id` from the live set. Returns whether it was live.
    pub(crate) fn remove(&self, id: RecordId) -> Result<bool, QueryError> {
        self.check(id)?;
        Ok(self.live[id as usize].swap(false, Ordering::Relaxed))
    }

    /// Force the pair's cell to invalid
    pub(crate) fn invalidate_pair(&self, a: RecordId, b: RecordId) -> Result<(), QueryError> {
        self.check_pair(a, b)?;
        self.matrix.invalidate(a, b);
        Ok(())
    }
}

fn sort_best_first(scored: &mut [(RecordId, f32)]) {
    scored.sort_by(|(id_a, a), (id_b, b)| b.total_cmp(a).then(id_a.cmp(id_b)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_set(len: usize, scores: &[(RecordId, RecordId, MatchEntry)]) -> ResultSet {
        let records = (0..len)
            .map(|i| {
                let mut record = FingerprintRecord::new(format!("/photos/{i}.png"), 0);
                record.assign_id(i as RecordId);
                record
            })
            .collect();
        let matrix = MatchMatrix::new(len);
        for &(a, b, entry) in scores {
            matrix.set(a, b, entry);
        }
        ResultSet::new(records, matrix)
    }

    fn sample() -> ResultSet {
        result_set(
            4,
            &[
                (0, 1, MatchEntry::PERFECT),
                (0, 2, MatchEntry::scored(0.5)),
                (2, 3, MatchEntry::scored(0.85)),
            ],
        )
    }

    #[test]
    fn self_match_is_perfect() {
        let results = sample();
        assert_eq!(results.match_score(3, 3).unwrap(), MatchEntry::PERFECT);
    }

    #[test]
    fn match_score_is_symmetric() {
        let results = sample();
        assert_eq!(results.match_score(2, 3), results.match_score(3, 2));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let results = sample();
        assert_eq!(
            results.match_score(0, 9),
            Err(QueryError::UnknownRecord { id: 9 })
        );
        assert!(results.highest_score(4).is_err());
    }

    #[test]
    fn highest_score_takes_the_best_partner() {
        let results = sample();
        assert_eq!(results.highest_score(0).unwrap(), 1.0);
        assert_eq!(results.highest_score(2).unwrap(), 0.85);
    }

    #[test]
    fn threshold_query_orders_best_first() {
        let results = sample();
        assert_eq!(results.sets_above_threshold(0.8), vec![0, 1, 2, 3]);
        assert_eq!(results.sets_above_threshold(0.9), vec![0, 1]);
        assert!(results.sets_above_threshold(1.1).is_empty());
    }

    #[test]
    fn anchor_query_excludes_the_anchor() {
        let results = sample();
        assert_eq!(results.sets_above_threshold_for(2, 0.4).unwrap(), vec![3, 0]);
        assert_eq!(results.sets_above_threshold_for(0, 0.9).unwrap(), vec![1]);
    }

    #[test]
    fn removal_hides_a_record_but_keeps_the_matrix() {
        let results = sample();
        assert!(results.remove(1).unwrap());
        assert!(!results.remove(1).unwrap());

        assert_eq!(results.sets(), vec![0, 2, 3]);
        assert_eq!(results.live_count(), 3);
        assert_eq!(results.matrix().cell_count(), 6);
        assert_eq!(results.highest_score(0).unwrap(), 0.5);
        // the cell itself is untouched
        assert_eq!(results.match_score(0, 1).unwrap(), MatchEntry::PERFECT);
    }

    #[test]
    fn invalidate_pair_rejects_self_pairs() {
        let results = sample();
        assert_eq!(
            results.invalidate_pair(1, 1),
            Err(QueryError::SelfPair { id: 1 })
        );
    }

    #[test]
    fn invalidated_pair_stops_matching() {
        let results = sample();
        results.invalidate_pair(1, 0).unwrap();
        results.invalidate_pair(0, 1).unwrap();

        assert_eq!(results.match_score(0, 1).unwrap(), MatchEntry::INVALID);
        assert!(results.identical_pairs().is_empty());
        assert_eq!(results.sets_above_threshold(0.9), Vec::<RecordId>::new());
    }

    #[test]
    fn identical_pairs_lists_flagged_cells() {
        let results = sample();
        assert_eq!(results.identical_pairs(), vec![(0, 1)]);
    }

    #[test]
    fn find_looks_up_by_path() {
        let results = sample();
        assert_eq!(results.find(Path::new("/photos/2.png")), Some(2));
        assert_eq!(results.find(Path::new("/photos/x.png")), None);
    }
}
