//! # Runtime events emitted by the pool, its workers, and running tasks.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Submission events**: a task entering the pool queue
//! - **Execution events**: a worker picking a task up, repetition failures, abandonment
//! - **Terminal events**: task completion, worker exit
//!
//! The [`Event`] struct carries additional metadata such as timestamps, worker
//! ids, repetition indices, and failure counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Task passed initialization and entered the pool queue.
    ///
    /// Sets:
    /// - `repetitions`: the task's repetition count
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskSubmitted,

    /// A worker dequeued the task and is about to drive its repetitions.
    ///
    /// Sets:
    /// - `worker`: id of the dequeuing worker
    /// - `repetitions`: the task's repetition count
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskStarting,

    /// One repetition's handler returned a failure.
    ///
    /// Sets:
    /// - `index`: the failing repetition index
    /// - `reason`: the handler's error message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RepetitionFailed,

    /// The task's failure threshold was reached; unstarted repetitions are
    /// abandoned. In-flight repetitions still finish naturally.
    ///
    /// Sets:
    /// - `failures`: recorded failure count at the moment of abandonment
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    AbortThresholdReached,

    /// Every repetition has completed or been abandoned; the task's
    /// completion signal has fired.
    ///
    /// Sets:
    /// - `repetitions`: the task's repetition count
    /// - `failures`: total recorded failures
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskCompleted,

    /// A worker left its dequeue loop (cancellation fired or the queue closed).
    ///
    /// Sets:
    /// - `worker`: id of the exiting worker
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    WorkerStopped,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Id of the worker involved, if applicable.
    pub worker: Option<usize>,
    /// Repetition index, if applicable.
    pub index: Option<usize>,
    /// The task's repetition count, if applicable.
    pub repetitions: Option<usize>,
    /// Recorded failure count, if applicable.
    pub failures: Option<usize>,
    /// Human-readable reason (handler error messages, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            index: None,
            repetitions: None,
            failures: None,
            reason: None,
        }
    }

    /// Attaches a worker id.
    #[inline]
    pub fn with_worker(mut self, worker: usize) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches a repetition index.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Attaches a repetition count.
    #[inline]
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = Some(repetitions);
        self
    }

    /// Attaches a failure count.
    #[inline]
    pub fn with_failures(mut self, failures: usize) -> Self {
        self.failures = Some(failures);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_numbers_increase() {
        let first = Event::new(EventKind::TaskSubmitted);
        let second = Event::new(EventKind::TaskCompleted);
        assert!(second.seq > first.seq);
    }

    #[test]
    fn test_builder_methods_set_fields() {
        let ev = Event::new(EventKind::RepetitionFailed)
            .with_index(3)
            .with_reason("boom");
        assert_eq!(ev.kind, EventKind::RepetitionFailed);
        assert_eq!(ev.index, Some(3));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }
}
