//! One processing run: enumerate, load, prune, compare.

use super::results::ResultSet;
use super::{ProcessorState, Shared};
use crate::core::fingerprint::{FingerprintGenerator, FingerprintRecord, RecordId};
use crate::core::matrix::{MatchEntry, MatchMatrix};
use crate::core::scanner::{FileEnumerator, ScanRoot};
use crate::core::scheduler::{
    pair_count, CancellationToken, PhaseOutcome, ProgressThrottle, WorkScheduler,
};
use crate::core::similarity::SimilarityEngine;
use crate::error::FingerprintError;
use crate::events::{EventSender, Stage};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Everything a run thread needs, cloned out of the processor
pub(super) struct RunContext {
    pub resolution: u16,
    pub progress_interval: Duration,
    pub enumerator: FileEnumerator,
    pub generator: FingerprintGenerator,
    pub engine: SimilarityEngine,
    pub scheduler: Arc<WorkScheduler>,
    pub events: EventSender,
    pub cancel: CancellationToken,
}

pub(super) enum RunOutcome {
    Completed(ResultSet),
    Stopped,
}

impl RunContext {
    /// Run every phase. Partial results are dropped on cancellation.
    pub(super) fn execute(&self, roots: &[ScanRoot], shared: &Shared) -> RunOutcome {
        let start = Instant::now();

        self.events.stage(Stage::Preparing);
        self.events.value(0);
        self.events.max(0);

        let scan = self.enumerator.enumerate(roots);
        info!(
            roots = roots.len(),
            files = scan.records.len(),
            skipped = scan.skipped.len(),
            "enumeration finished"
        );
        if self.cancel.is_cancelled() {
            return RunOutcome::Stopped;
        }

        let Some(records) = self.load(scan.records) else {
            return RunOutcome::Stopped;
        };
        shared.set_state(ProcessorState::Comparing);
        let Some(matrix) = self.compare(&records) else {
            return RunOutcome::Stopped;
        };
        if self.cancel.is_cancelled() {
            return RunOutcome::Stopped;
        }

        info!(
            records = records.len(),
            cells = matrix.cell_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "run complete"
        );
        RunOutcome::Completed(ResultSet::new(records, matrix))
    }

    /// Fingerprint every stub, then keep the successes ordered by their new ids
    fn load(&self, stubs: Vec<FingerprintRecord>) -> Option<Vec<FingerprintRecord>> {
        let total = stubs.len();
        self.events.stage(Stage::Loading);
        self.events.value(0);
        self.events.max(total as u64);

        // each slot is only ever locked by the worker that claimed its index
        let slots: Vec<Mutex<FingerprintRecord>> = stubs.into_iter().map(Mutex::new).collect();
        let next_id = AtomicU32::new(0);
        let progress = ProgressThrottle::new(self.events.clone(), self.progress_interval);

        let outcome = self
            .scheduler
            .for_each_index(total, &self.cancel, &progress, |index| {
                let mut record = slots[index].lock().unwrap_or_else(PoisonError::into_inner);
                let generated = panic::catch_unwind(AssertUnwindSafe(|| {
                    self.generator.generate(&mut record, self.resolution)
                }))
                .unwrap_or_else(|payload| {
                    Err(FingerprintError::Decode {
                        path: record.path().to_path_buf(),
                        reason: format!("decoder panicked: {}", panic_message(payload.as_ref())),
                    })
                });
                match generated {
                    Ok(_) => record.assign_id(next_id.fetch_add(1, Ordering::Relaxed)),
                    Err(error) => {
                        warn!(path = %record.path().display(), %error, "skipping unreadable image")
                    }
                }
            });

        if outcome == PhaseOutcome::Cancelled {
            debug!("load phase cancelled");
            return None;
        }
        progress.force(total as u64);

        let mut records: Vec<FingerprintRecord> = slots
            .into_iter()
            .map(|slot| slot.into_inner().unwrap_or_else(PoisonError::into_inner))
            .filter(|record| record.id().is_some())
            .collect();
        records.sort_by_key(|record| record.id());

        info!(
            loaded = records.len(),
            failed = total - records.len(),
            "load phase finished"
        );
        Some(records)
    }

    /// Score every eligible pair into a fresh matrix
    fn compare(&self, records: &[FingerprintRecord]) -> Option<MatchMatrix> {
        let total = pair_count(records.len());
        self.events.stage(Stage::Comparing);
        self.events.value(0);
        self.events.max(total);

        let matrix = MatchMatrix::new(records.len());
        let progress = ProgressThrottle::new(self.events.clone(), self.progress_interval);

        let outcome = self
            .scheduler
            .for_each_pair(records.len(), &self.cancel, &progress, |a, b| {
                let (first, second) = (&records[a], &records[b]);
                if first.shares_group_with(second) {
                    return;
                }
                let entry = panic::catch_unwind(AssertUnwindSafe(|| {
                    self.engine.compare(first, second)
                }))
                .unwrap_or_else(|payload| {
                    warn!(
                        first = %first.path().display(),
                        second = %second.path().display(),
                        reason = panic_message(payload.as_ref()),
                        "comparison panicked, pair left invalid"
                    );
                    MatchEntry::INVALID
                });
                matrix.set(a as RecordId, b as RecordId, entry);
            });

        if outcome == PhaseOutcome::Cancelled {
            debug!("compare phase cancelled");
            return None;
        }
        progress.force(total);

        Some(matrix)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_both_payload_kinds() {
        let literal = panic::catch_unwind(|| panic!("bad header")).unwrap_err();
        assert_eq!(panic_message(literal.as_ref()), "bad header");

        let formatted = panic::catch_unwind(|| panic!("bad row {}", 7)).unwrap_err();
        assert_eq!(panic_message(formatted.as_ref()), "bad row 7");

        let other = panic::catch_unwind(|| std::panic::panic_any(3_u8)).unwrap_err();
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
