//! # Processor Module
//!
//! Sequences a run and owns its results.
//!
//! ## Run Stages
//! 1. **Preparing** - Enumerate the configured roots into record stubs
//! 2. **Loading** - Fingerprint every stub in parallel; failures are pruned
//!    and the survivors get gapless ids
//! 3. **Comparing** - Score every eligible pair into the match matrix
//! 4. **Complete** / **Stopped** - Publish the results, or drop everything
//!
//! ## Events
//! Each run is bracketed by exactly one `Started` and one `Finished`.
//! Between them every stage announces itself, resets its progress value,
//! sets its maximum, and ends with value == max. The terminal stage label
//! tells a UI whether the run completed or was stopped.
//!
//! ## State
//! `Idle → Loading → Comparing → {Completed | Stopped}`. Starting a new run
//! cancels and joins the previous one first.
//!
//! ## Example
//! ```rust,ignore
//! let mut processor = Processor::builder().resolution(32).build()?;
//! processor.run(vec![ScanRoot::recursive("/photos")])?;
//! for id in processor.sets_above_threshold(0.9) {
//!     println!("{id}");
//! }
//! ```

mod config;
mod results;
mod run;

pub use config::{ProcessorBuilder, ProcessorConfig, DEFAULT_RESOLUTION, DEFAULT_THRESHOLD};
pub use results::ResultSet;

use crate::core::fingerprint::{FingerprintGenerator, FingerprintRecord, ImageCodec, RecordId};
use crate::core::matrix::MatchEntry;
use crate::core::reporter::{diff_image, PairReport};
use crate::core::scanner::{FileEnumerator, ScanRoot};
use crate::core::scheduler::{CancellationToken, WorkScheduler};
use crate::core::similarity::SimilarityEngine;
use crate::error::{CuttleError, QueryError, Result, SchedulerError};
use crate::events::{EventSender, Stage};
use image::RgbImage;
use run::{RunContext, RunOutcome};
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Where the processor is in its run cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessorState {
    Idle,
    Loading,
    Comparing,
    Completed,
    Stopped,
}

impl ProcessorState {
    pub fn is_running(&self) -> bool {
        matches!(self, ProcessorState::Loading | ProcessorState::Comparing)
    }
}

/// State shared between the processor handle and its run thread
struct Shared {
    state: Mutex<ProcessorState>,
    results: RwLock<Option<Arc<ResultSet>>>,
}

impl Shared {
    fn set_state(&self, state: ProcessorState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn state(&self) -> ProcessorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_results(&self, results: Option<ResultSet>) {
        *self.results.write().unwrap_or_else(PoisonError::into_inner) = results.map(Arc::new);
    }

    fn results(&self) -> Option<Arc<ResultSet>> {
        self.results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

struct ActiveRun {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Runs the similarity engine and answers queries about its results
pub struct Processor {
    config: ProcessorConfig,
    codec: Arc<dyn ImageCodec>,
    scheduler: Arc<WorkScheduler>,
    events: EventSender,
    shared: Arc<Shared>,
    active: Option<ActiveRun>,
}

impl Processor {
    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder::new()
    }

    fn from_parts(
        config: ProcessorConfig,
        codec: Arc<dyn ImageCodec>,
        events: EventSender,
    ) -> Result<Self> {
        let scheduler = Arc::new(WorkScheduler::new(config.workers)?);
        Ok(Self {
            config,
            codec,
            scheduler,
            events,
            shared: Arc::new(Shared {
                state: Mutex::new(ProcessorState::Idle),
                results: RwLock::new(None),
            }),
            active: None,
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn codec(&self) -> &Arc<dyn ImageCodec> {
        &self.codec
    }

    pub fn state(&self) -> ProcessorState {
        self.shared.state()
    }

    /// Start a run in the background.
    ///
    /// Any run in flight is stopped and joined first, and previous results
    /// are discarded before `Started` is sent.
    pub fn begin(&mut self, roots: Vec<ScanRoot>) -> Result<()> {
        self.stop();
        self.shared.set_results(None);
        self.shared.set_state(ProcessorState::Loading);
        self.events.started();

        let cancel = CancellationToken::new();
        let context = RunContext {
            resolution: self.config.resolution,
            progress_interval: self.config.progress_interval,
            enumerator: FileEnumerator::new(self.config.scan.clone()),
            generator: FingerprintGenerator::new(self.codec.clone())
                .with_thumbnail_size(self.config.thumbnail_size),
            engine: SimilarityEngine::new(self.codec.clone()).with_weights(self.config.weights),
            scheduler: self.scheduler.clone(),
            events: self.events.clone(),
            cancel: cancel.clone(),
        };
        let shared = self.shared.clone();

        let handle = thread::Builder::new()
            .name("cuttle-run".to_string())
            .spawn(move || run_to_end(&context, &shared, &roots))
            .map_err(|e| {
                self.shared.set_state(ProcessorState::Stopped);
                finish(&self.events, Stage::Stopped);
                SchedulerError::Spawn(e)
            })?;

        self.active = Some(ActiveRun { cancel, handle });
        Ok(())
    }

    /// Ask the current run to stop without waiting for it
    pub fn request_stop(&self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }

    /// Stop the current run and wait for its workers to exit
    pub fn stop(&mut self) -> ProcessorState {
        self.request_stop();
        self.wait()
    }

    /// Block until the current run (if any) ends
    pub fn wait(&mut self) -> ProcessorState {
        if let Some(active) = self.active.take() {
            if active.handle.join().is_err() {
                error!("run thread panicked");
                self.shared.set_results(None);
                self.shared.set_state(ProcessorState::Stopped);
                finish(&self.events, Stage::Stopped);
            }
        }
        self.state()
    }

    /// Run to completion on the calling thread's behalf
    pub fn run(&mut self, roots: Vec<ScanRoot>) -> Result<ProcessorState> {
        self.begin(roots)?;
        Ok(self.wait())
    }

    /// Stop any run and forget all results
    pub fn clear(&mut self) {
        self.stop();
        self.shared.set_results(None);
        self.shared.set_state(ProcessorState::Idle);
    }

    /// Snapshot of the completed run's results
    pub fn results(&self) -> Option<Arc<ResultSet>> {
        self.shared.results()
    }

    fn ready(&self) -> std::result::Result<Arc<ResultSet>, QueryError> {
        self.results().ok_or(QueryError::NotReady)
    }

    /// Live record ids; empty unless a run has completed
    pub fn sets(&self) -> Vec<RecordId> {
        self.results().map(|r| r.sets()).unwrap_or_default()
    }

    pub fn match_score(&self, a: RecordId, b: RecordId) -> Result<MatchEntry> {
        Ok(self.ready()?.match_score(a, b)?)
    }

    pub fn highest_score(&self, id: RecordId) -> Result<f32> {
        Ok(self.ready()?.highest_score(id)?)
    }

    pub fn sets_above_threshold(&self, threshold: f32) -> Vec<RecordId> {
        self.results()
            .map(|r| r.sets_above_threshold(threshold))
            .unwrap_or_default()
    }

    pub fn sets_above_threshold_for(
        &self,
        anchor: RecordId,
        threshold: f32,
    ) -> Result<Vec<RecordId>> {
        Ok(self.ready()?.sets_above_threshold_for(anchor, threshold)?)
    }

    pub fn identical_pairs(&self) -> Vec<(RecordId, RecordId)> {
        self.results()
            .map(|r| r.identical_pairs())
            .unwrap_or_default()
    }

    /// Drop a record from the live set.
    ///
    /// The matrix is not rebuilt; only `sets()` and the threshold queries
    /// change. Observers see a `Started`/`Finished` pair around the change,
    /// and nothing at all when the id is rejected.
    pub fn remove_record(&self, id: RecordId) -> Result<()> {
        let results = self.ready()?;
        results.check(id)?;
        self.events.started();
        let outcome = results.remove(id);
        self.events.finished();

        if outcome? {
            info!(id, "record removed");
        }
        Ok(())
    }

    /// Mark a pair as "not a match" for the rest of this run
    pub fn invalidate_pair(&self, a: RecordId, b: RecordId) -> Result<()> {
        let results = self.ready()?;
        results.check_pair(a, b)?;
        self.events.started();
        let outcome = results.invalidate_pair(a, b);
        self.events.finished();
        Ok(outcome?)
    }

    /// Delete the record's file from disk, then remove it from the live set
    pub fn delete_record(&self, id: RecordId) -> Result<()> {
        let results = self.ready()?;
        let record = results
            .record(id)
            .ok_or(QueryError::UnknownRecord { id })?;

        fs::remove_file(record.path()).map_err(|source| CuttleError::Io {
            path: record.path().to_path_buf(),
            source,
        })?;
        info!(path = %record.path().display(), "deleted file");

        self.remove_record(id)
    }

    pub fn pair_report(&self, a: RecordId, b: RecordId) -> Result<PairReport> {
        let results = self.ready()?;
        let (first, second) = record_pair(&results, a, b)?;
        Ok(PairReport::build(self.codec.as_ref(), first, second))
    }

    pub fn diff_image(&self, a: RecordId, b: RecordId) -> Result<RgbImage> {
        let results = self.ready()?;
        let (first, second) = record_pair(&results, a, b)?;
        Ok(diff_image(self.codec.as_ref(), first, second)?)
    }
}

impl Drop for Processor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn record_pair(
    results: &ResultSet,
    a: RecordId,
    b: RecordId,
) -> std::result::Result<(&FingerprintRecord, &FingerprintRecord), QueryError> {
    let first = results.record(a).ok_or(QueryError::UnknownRecord { id: a })?;
    let second = results.record(b).ok_or(QueryError::UnknownRecord { id: b })?;
    Ok((first, second))
}

/// Terminal stage events followed by `Finished`
fn finish(events: &EventSender, stage: Stage) {
    events.stage(stage);
    events.max(1);
    events.value(1);
    events.finished();
}

fn run_to_end(context: &RunContext, shared: &Shared, roots: &[ScanRoot]) {
    match context.execute(roots, shared) {
        RunOutcome::Completed(results) => {
            shared.set_results(Some(results));
            shared.set_state(ProcessorState::Completed);
            finish(&context.events, Stage::Complete);
        }
        RunOutcome::Stopped => {
            info!("run stopped");
            shared.set_results(None);
            shared.set_state(ProcessorState::Stopped);
            finish(&context.events, Stage::Stopped);
        }
    }
}
