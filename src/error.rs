//! Error types used by the pool runtime and task handlers.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`] — invalid pool or task parameters, rejected before any work starts.
//! - [`SubmitError`] — a submission that could not be enqueued.
//! - [`TaskError`] — a failure raised by a single handler invocation.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Handler failures are never logged or propagated by the runtime itself; they are
//! collected per repetition and surfaced through
//! [`TaskErrors`](crate::TaskErrors) when the caller waits.

use thiserror::Error;

/// # Invalid configuration.
///
/// Produced when a pool is constructed or a task is initialized with
/// parameters below their minimum. Fatal only to the construction or
/// submission that carried them; the pool and other tasks are unaffected.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A task must run at least one repetition.
    #[error("repetition count must be at least 1")]
    ZeroRepetitions,

    /// A task must be allowed at least one in-flight repetition.
    #[error("max parallel must be at least 1")]
    ZeroParallelism,

    /// The pool queue must hold at least one pending task.
    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,

    /// The pool must own at least one worker.
    #[error("worker count must be at least 1")]
    ZeroWorkers,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use repeatpool::ConfigError;
    ///
    /// assert_eq!(ConfigError::ZeroRepetitions.as_label(), "config_zero_repetitions");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroRepetitions => "config_zero_repetitions",
            ConfigError::ZeroParallelism => "config_zero_parallelism",
            ConfigError::ZeroQueueCapacity => "config_zero_queue_capacity",
            ConfigError::ZeroWorkers => "config_zero_workers",
        }
    }
}

/// # Failed submission.
///
/// Surfaced synchronously by [`Pool::submit`](crate::Pool::submit).
/// [`Pool::submit_and_wait`](crate::Pool::submit_and_wait) instead folds it
/// into a one-entry [`TaskErrors`](crate::TaskErrors) so callers get a
/// single return shape for submission and execution failures alike.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The task carried invalid parameters and was rejected at initialization.
    #[error("invalid task configuration: {0}")]
    Config(#[from] ConfigError),

    /// The pool's queue has shut down; no worker will ever dequeue the task.
    #[error("task queue is closed")]
    QueueClosed,
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::Config(_) => "submit_invalid_config",
            SubmitError::QueueClosed => "submit_queue_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SubmitError::Config(err) => format!("invalid config: {err}"),
            SubmitError::QueueClosed => "queue closed".to_string(),
        }
    }
}

/// # Failure of a single handler invocation.
///
/// Returned by [`Handler::call`](crate::Handler::call) for one repetition
/// index. The runtime records it against that index and keeps driving the
/// remaining repetitions (subject to the task's abort threshold); it never
/// retries, logs, or panics on a handler failure.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The operation failed; the message is whatever the handler reported.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The handler observed cooperative cancellation and gave up.
    #[error("repetition cancelled")]
    Canceled,
}

impl TaskError {
    /// Wraps an arbitrary error value as a [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use repeatpool::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn fail(error: impl ToString) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "cancelled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_labels_are_stable() {
        assert_eq!(
            ConfigError::ZeroParallelism.as_label(),
            "config_zero_parallelism"
        );
        assert_eq!(ConfigError::ZeroWorkers.as_label(), "config_zero_workers");
    }

    #[test]
    fn test_submit_error_wraps_config() {
        let err = SubmitError::from(ConfigError::ZeroRepetitions);
        assert_eq!(err.as_label(), "submit_invalid_config");
        assert!(err.to_string().contains("repetition count"));
    }

    #[test]
    fn test_task_error_fail_keeps_message() {
        let err = TaskError::fail("boom");
        assert!(err.to_string().contains("boom"));
        assert_eq!(err.as_message(), "error: boom");
    }
}
