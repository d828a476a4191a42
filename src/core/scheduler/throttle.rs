//! Rate-limited progress reporting shared by all workers of a phase.

use crate::events::EventSender;
use std::sync::{Mutex, PoisonError, TryLockError};
use std::time::{Duration, Instant};

/// Default minimum gap between two progress updates (at most 8 per second)
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(125);

/// Emits `Value` events no more often than `interval`.
///
/// Workers never wait on the timestamp lock: if another worker holds it,
/// the update is skipped.
pub struct ProgressThrottle {
    last: Mutex<Instant>,
    interval: Duration,
    events: EventSender,
}

impl ProgressThrottle {
    pub fn new(events: EventSender, interval: Duration) -> Self {
        Self {
            last: Mutex::new(Instant::now()),
            interval,
            events,
        }
    }

    /// Report `value` if the interval has elapsed. Returns whether an event was sent.
    pub fn tick(&self, value: u64) -> bool {
        let mut last = match self.last.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return false,
        };

        if last.elapsed() < self.interval {
            return false;
        }
        *last = Instant::now();
        self.events.value(value);
        true
    }

    /// Unthrottled report, used at phase boundaries
    pub fn force(&self, value: u64) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
        self.events.value(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, EventChannel, ProgressEvent};

    #[test]
    fn updates_inside_the_interval_are_dropped() {
        let (sender, receiver) = EventChannel::new();
        let throttle = ProgressThrottle::new(sender, Duration::from_secs(3600));

        assert!(!throttle.tick(1));
        assert!(!throttle.tick(2));
        assert!(receiver.drain().is_empty());
    }

    #[test]
    fn zero_interval_reports_every_tick() {
        let (sender, receiver) = EventChannel::new();
        let throttle = ProgressThrottle::new(sender, Duration::ZERO);

        assert!(throttle.tick(1));
        assert!(throttle.tick(2));
        assert_eq!(
            receiver.drain(),
            vec![
                Event::Progress(ProgressEvent::Value { value: 1 }),
                Event::Progress(ProgressEvent::Value { value: 2 }),
            ]
        );
    }

    #[test]
    fn held_lock_skips_instead_of_blocking() {
        let (sender, receiver) = EventChannel::new();
        let throttle = ProgressThrottle::new(sender, Duration::ZERO);

        let _held = throttle.last.lock().unwrap();
        assert!(!throttle.tick(5));
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn force_ignores_the_interval() {
        let (sender, receiver) = EventChannel::new();
        let throttle = ProgressThrottle::new(sender, Duration::from_secs(3600));

        throttle.force(10);
        assert_eq!(
            receiver.recv(),
            Some(Event::Progress(ProgressEvent::Value { value: 10 }))
        );
    }
}
