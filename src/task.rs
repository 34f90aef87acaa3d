//! # Task: a fixed number of indexed repetitions under a concurrency bound.
//!
//! A [`Task`] describes one repeatable unit of work: how many times to invoke
//! its [`Handler`](crate::Handler) (`repetitions`, indexed `0..N`), how many
//! invocations may be in flight at once (`max_parallel`), and an optional
//! failure threshold (`max_failures`) past which unstarted repetitions are
//! abandoned.
//!
//! ## Execution shape
//! ```text
//!   Worker ──► Task::run()
//!                 │  Semaphore(max_parallel)
//!                 ├──► handler.call(0) ─┐
//!                 ├──► handler.call(1) ─┼──► failures: Mutex<Vec<TaskFailure>>
//!                 └──► handler.call(..)─┘
//!                 ▼
//!          completion signal (watch, fires once)
//!                 ▼
//!          Task::wait() ──► TaskErrors
//! ```
//!
//! A task instance is submitted to exactly one pool at a time. Submission
//! re-initializes its run state; resubmitting a task that is still running is
//! a caller error with undefined results. Use a fresh instance per in-flight
//! submission.

use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

use crate::error::{ConfigError, SubmitError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::handler::HandlerRef;

/// Shared handle to a task (`Arc<Task>`).
///
/// The same handle is held by the submitting caller (to wait), the pool queue,
/// and the worker that runs it.
pub type TaskRef = Arc<Task>;

/// A repeatable unit of work: `repetitions` handler invocations, at most
/// `max_parallel` in flight, abandoning unstarted work after `max_failures`
/// recorded failures (0 = attempt everything).
pub struct Task {
    repetitions: usize,
    max_parallel: usize,
    max_failures: usize,
    handler: HandlerRef,

    /// Failures recorded by concurrently finishing repetitions.
    failures: Mutex<Vec<TaskFailure>>,
    /// Fast counter behind the abort-threshold check.
    failed: AtomicUsize,
    /// Single-fire completion signal; re-armed by `initialize`.
    done: watch::Sender<bool>,
}

impl Task {
    /// Creates a task that invokes `handler` for every index in
    /// `0..repetitions`, with at most `max_parallel` invocations in flight.
    ///
    /// Bounds are validated at submission, not here, so an invalid task is
    /// reported through the pool's submission path like the rest.
    ///
    /// # Example
    /// ```
    /// use repeatpool::{HandlerFn, Task, TaskError};
    ///
    /// let handler = HandlerFn::arc((), |_cookie, _index| async { Ok::<_, TaskError>(()) });
    /// let task = Task::new(16, 4, handler).with_max_failures(2).into_ref();
    /// assert_eq!(task.repetitions(), 16);
    /// ```
    pub fn new(repetitions: usize, max_parallel: usize, handler: HandlerRef) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            repetitions,
            max_parallel,
            max_failures: 0,
            handler,
            failures: Mutex::new(Vec::new()),
            failed: AtomicUsize::new(0),
            done,
        }
    }

    /// Sets the abort threshold: once this many repetitions have failed, no
    /// further repetition is *started*. In-flight ones finish naturally.
    /// `0` (the default) attempts every repetition regardless of failures.
    pub fn with_max_failures(mut self, max_failures: usize) -> Self {
        self.max_failures = max_failures;
        self
    }

    /// Wraps the task in a shared handle for submission.
    pub fn into_ref(self) -> TaskRef {
        Arc::new(self)
    }

    /// Number of repetition indices.
    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    /// Maximum in-flight repetitions of this task.
    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Abort threshold (0 = unlimited failures).
    pub fn max_failures(&self) -> usize {
        self.max_failures
    }

    /// Validates bounds and resets the run state for a fresh submission:
    /// clears collected failures and re-arms the completion signal.
    pub(crate) fn initialize(&self) -> Result<(), ConfigError> {
        if self.repetitions < 1 {
            return Err(ConfigError::ZeroRepetitions);
        }
        if self.max_parallel < 1 {
            return Err(ConfigError::ZeroParallelism);
        }

        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        self.failed.store(0, Ordering::SeqCst);
        self.done.send_replace(false);
        Ok(())
    }

    /// Drives every repetition to completion or abandonment, then fires the
    /// completion signal exactly once. Invoked by a worker, never by callers.
    ///
    /// Repetition indices carry no ordering guarantee; concurrent and
    /// interleaved execution is expected. A failing repetition never stops
    /// siblings that already started.
    pub(crate) async fn run(self: Arc<Self>, bus: &Bus) {
        let gate = Arc::new(Semaphore::new(self.max_parallel));
        let mut reps = JoinSet::new();

        for index in 0..self.repetitions {
            // A permit frees only when a repetition finishes, so the check
            // below sees every failure recorded up to that point.
            let Ok(permit) = Arc::clone(&gate).acquire_owned().await else {
                break;
            };

            if self.threshold_reached() {
                drop(permit);
                bus.publish(
                    Event::new(EventKind::AbortThresholdReached)
                        .with_failures(self.failed.load(Ordering::SeqCst)),
                );
                break;
            }

            let task = Arc::clone(&self);
            let bus = bus.clone();
            reps.spawn(async move {
                let _permit = permit;
                if let Err(error) = task.handler.call(index).await {
                    let reason = error.to_string();
                    task.record_failure(index, error);
                    bus.publish(
                        Event::new(EventKind::RepetitionFailed)
                            .with_index(index)
                            .with_reason(reason),
                    );
                }
            });
        }

        while reps.join_next().await.is_some() {}

        self.done.send_replace(true);
        bus.publish(
            Event::new(EventKind::TaskCompleted)
                .with_repetitions(self.repetitions)
                .with_failures(self.failed.load(Ordering::SeqCst)),
        );
    }

    /// Blocks until the completion signal fires, then returns the accumulated
    /// failures, leaving the task empty.
    ///
    /// The signal is single-fire per run: waiting after completion returns
    /// immediately. Waiting twice within one run hands the second waiter an
    /// empty result, so use one waiter per submission.
    pub async fn wait(&self) -> TaskErrors {
        let mut rx = self.done.subscribe();
        // The sender lives inside self, so the channel cannot close under us.
        let _ = rx.wait_for(|done| *done).await;

        let failures = std::mem::take(
            &mut *self
                .failures
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        TaskErrors::new(failures)
    }

    fn record_failure(&self, index: usize, error: TaskError) {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(TaskFailure::Repetition { index, error });
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn threshold_reached(&self) -> bool {
        self.max_failures > 0 && self.failed.load(Ordering::SeqCst) >= self.max_failures
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("repetitions", &self.repetitions)
            .field("max_parallel", &self.max_parallel)
            .field("max_failures", &self.max_failures)
            .finish_non_exhaustive()
    }
}

/// One recorded failure of a task.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskFailure {
    /// A handler invocation failed for a specific repetition index.
    #[error("repetition {index} failed: {error}")]
    Repetition {
        /// The repetition index the handler was invoked with.
        index: usize,
        /// The failure the handler reported.
        error: TaskError,
    },

    /// The task never ran: submission itself failed. Synthesized by
    /// [`Pool::submit_and_wait`](crate::Pool::submit_and_wait) so submission
    /// and execution failures share one return shape.
    #[error("submission failed: {error}")]
    Submit {
        /// The submission failure.
        error: SubmitError,
    },
}

impl TaskFailure {
    /// The repetition index this failure is tagged with, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            TaskFailure::Repetition { index, .. } => Some(*index),
            TaskFailure::Submit { .. } => None,
        }
    }
}

/// Ordered collection of one task's failures.
///
/// Empty means the run fully succeeded. `Display` combines every entry so no
/// failure is silently dropped from the rendered message.
#[derive(Debug, Default)]
pub struct TaskErrors {
    failures: Vec<TaskFailure>,
}

impl TaskErrors {
    pub(crate) fn new(failures: Vec<TaskFailure>) -> Self {
        Self { failures }
    }

    pub(crate) fn from_submit(error: SubmitError) -> Self {
        Self {
            failures: vec![TaskFailure::Submit { error }],
        }
    }

    /// True if the run recorded no failures.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of recorded failures.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// The recorded failures, in the order repetitions finished.
    pub fn failures(&self) -> &[TaskFailure] {
        &self.failures
    }

    /// Converts into a `Result`: `Ok(())` when empty, `Err(self)` otherwise.
    ///
    /// # Example
    /// ```
    /// use repeatpool::TaskErrors;
    ///
    /// assert!(TaskErrors::default().into_result().is_ok());
    /// ```
    pub fn into_result(self) -> Result<(), TaskErrors> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for TaskErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "no failures");
        }
        write!(f, "{} failure(s): ", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TaskErrors {}
