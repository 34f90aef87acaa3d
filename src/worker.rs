use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::task::TaskRef;

/// Receiver end of the pool queue, shared by all workers.
pub(crate) type SharedQueue = Arc<Mutex<mpsc::Receiver<TaskRef>>>;

/// A processing unit that dequeues one task at a time and drives it to
/// completion before dequeuing the next. Cancellation stops it from picking
/// up new tasks; a task already running finishes its own loop.
pub(crate) struct Worker {
    pub id: usize,
    pub queue: SharedQueue,
    pub bus: Bus,
    pub token: CancellationToken,
}

impl Worker {
    pub(crate) fn new(id: usize, queue: SharedQueue, bus: Bus, token: CancellationToken) -> Self {
        Self {
            id,
            queue,
            bus,
            token,
        }
    }

    pub(crate) async fn run(self) {
        loop {
            if self.token.is_cancelled() {
                break;
            }

            // Hold the queue lock only while waiting for the next task; the
            // task itself runs with the lock released so siblings can dequeue.
            let task = {
                let mut queue = self.queue.lock().await;
                tokio::select! {
                    next = queue.recv() => match next {
                        Some(task) => task,
                        None => break,
                    },
                    _ = self.token.cancelled() => break,
                }
            };

            self.bus.publish(
                Event::new(EventKind::TaskStarting)
                    .with_worker(self.id)
                    .with_repetitions(task.repetitions()),
            );
            task.run(&self.bus).await;
        }

        self.bus
            .publish(Event::new(EventKind::WorkerStopped).with_worker(self.id));
    }
}
