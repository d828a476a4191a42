//! Event type definitions for lifecycle and progress reporting.

use serde::{Deserialize, Serialize};

/// All events emitted by the processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Run brackets. Delivered exactly once per run (and once per mutation).
    Lifecycle(LifecycleEvent),
    /// Progress bar updates. Values may be coalesced under throttling.
    Progress(ProgressEvent),
}

/// Start/finish brackets around a run or a result mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// Previously exposed results are gone; the UI should clear its views.
    Started,
    /// Results are ready (or empty). The preceding [`Stage`] says which.
    Finished,
}

/// Progress information for the current stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressEvent {
    /// A new stage has begun
    Stage(Stage),
    /// Upper bound for subsequent `Value` events
    Max { max: u64 },
    /// Units of work claimed so far in the current stage
    Value { value: u64 },
}

/// Stages of a processing run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Preparing,
    Loading,
    Comparing,
    Complete,
    Stopped,
}

impl Stage {
    /// Progress-bar label. `%p%` is replaced with the percentage by the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Preparing => "Preparing...",
            Stage::Loading => "Loading images... %p%",
            Stage::Comparing => "Generating deltas... %p%",
            Stage::Complete => "Complete",
            Stage::Stopped => "Stopped",
        }
    }

    /// Whether this stage ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete | Stage::Stopped)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<LifecycleEvent> for Event {
    fn from(event: LifecycleEvent) -> Self {
        Event::Lifecycle(event)
    }
}

impl From<ProgressEvent> for Event {
    fn from(event: ProgressEvent) -> Self {
        Event::Progress(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Progress(ProgressEvent::Max { max: 42 });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, event);
    }

    #[test]
    fn stage_labels_carry_percent_placeholder_while_running() {
        assert!(Stage::Loading.label().contains("%p%"));
        assert!(Stage::Comparing.label().contains("%p%"));
        assert!(!Stage::Complete.label().contains("%p%"));
    }

    #[test]
    fn only_complete_and_stopped_are_terminal() {
        assert!(Stage::Complete.is_terminal());
        assert!(Stage::Stopped.is_terminal());
        assert!(!Stage::Loading.is_terminal());
        assert!(!Stage::Preparing.is_terminal());
    }
}
