//! # Scheduler Module
//!
//! Fixed-size worker pool and the work-claim loops run on it.
//!
//! ## Claim Discipline
//! Every worker loops: check the cancellation flag, claim the next unit from
//! a shared cursor under a short lock, maybe report progress, then do the
//! work with no lock held. A phase ends when the cursor is exhausted (or the
//! flag is set) and every worker has returned; that join is the only barrier
//! between phases.
//!
//! - Load phase: one unit per record index ([`IndexCursor`])
//! - Compare phase: one unit per unordered pair `a < b` ([`PairCursor`])
//!
//! Cancellation is cooperative. A unit that has started always finishes.

mod cursor;
mod throttle;

pub use cursor::{pair_count, Claim, IndexCursor, PairCursor};
pub use throttle::{ProgressThrottle, DEFAULT_PROGRESS_INTERVAL};

use crate::error::SchedulerError;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared stop flag for a run
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// How a phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// Every unit was processed
    Completed,
    /// The token was cancelled; some units may not have run
    Cancelled,
}

/// Number of hardware threads, falling back to one
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// A dedicated rayon pool running claim loops
pub struct WorkScheduler {
    pool: ThreadPool,
    workers: usize,
}

impl WorkScheduler {
    /// Build a pool with `workers` threads (at least one)
    pub fn new(workers: usize) -> Result<Self, SchedulerError> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("cuttle-worker-{index}"))
            .build()
            .map_err(|e| SchedulerError::PoolBuild {
                workers,
                reason: e.to_string(),
            })?;

        debug!(workers, "worker pool ready");
        Ok(Self { pool, workers })
    }

    /// One worker per hardware thread
    pub fn with_hardware_parallelism() -> Result<Self, SchedulerError> {
        Self::new(default_workers())
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `work` once for every index in `0..len`.
    ///
    /// Blocks until all workers have left the loop.
    pub fn for_each_index<F>(
        &self,
        len: usize,
        cancel: &CancellationToken,
        progress: &ProgressThrottle,
        work: F,
    ) -> PhaseOutcome
    where
        F: Fn(usize) + Sync,
    {
        let cursor = IndexCursor::new(len);
        self.pool.broadcast(|_| {
            while !cancel.is_cancelled() {
                let Some(claim) = cursor.claim() else {
                    break;
                };
                progress.tick(claim.ordinal);
                work(claim.item);
            }
        });

        outcome(cancel)
    }

    /// Run `work` once for every unordered pair `(a, b)` with `a < b < len`.
    ///
    /// Blocks until all workers have left the loop.
    pub fn for_each_pair<F>(
        &self,
        len: usize,
        cancel: &CancellationToken,
        progress: &ProgressThrottle,
        work: F,
    ) -> PhaseOutcome
    where
        F: Fn(usize, usize) + Sync,
    {
        let cursor = PairCursor::new(len);
        self.pool.broadcast(|_| {
            while !cancel.is_cancelled() {
                let Some(claim) = cursor.claim() else {
                    break;
                };
                progress.tick(claim.ordinal);
                let (a, b) = claim.item;
                work(a, b);
            }
        });

        outcome(cancel)
    }
}

fn outcome(cancel: &CancellationToken) -> PhaseOutcome {
    if cancel.is_cancelled() {
        PhaseOutcome::Cancelled
    } else {
        PhaseOutcome::Completed
    }
}
