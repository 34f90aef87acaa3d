//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [submitted] repetitions=16
//! [starting] worker=2 repetitions=16
//! [rep-failed] index=3 err="connection refused"
//! [abort-threshold] failures=4
//! [completed] repetitions=16 failures=4
//! [worker-stopped] worker=2
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskSubmitted => {
                println!("[submitted] repetitions={:?}", e.repetitions);
            }
            EventKind::TaskStarting => {
                println!(
                    "[starting] worker={:?} repetitions={:?}",
                    e.worker, e.repetitions
                );
            }
            EventKind::RepetitionFailed => {
                println!("[rep-failed] index={:?} err={:?}", e.index, e.reason);
            }
            EventKind::AbortThresholdReached => {
                println!("[abort-threshold] failures={:?}", e.failures);
            }
            EventKind::TaskCompleted => {
                println!(
                    "[completed] repetitions={:?} failures={:?}",
                    e.repetitions, e.failures
                );
            }
            EventKind::WorkerStopped => {
                println!("[worker-stopped] worker={:?}", e.worker);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
