//! # Pool: bounded task queue + fixed worker set.
//!
//! The [`Pool`] owns the two pool-level resources: a bounded queue of pending
//! tasks and a fixed set of workers. The bounds are independent: queue
//! capacity limits how many tasks may be *waiting*, worker count limits how
//! many may be *running*. Neither constrains a task's own `max_parallel`,
//! which may legitimately exceed the worker count.
//!
//! ## High-level architecture
//! ```text
//! Construction:
//!   Pool::new(cfg, subscribers, token)
//!     ├─ bounded mpsc queue (cfg.queue_capacity)
//!     ├─ Bus (cfg.bus_capacity) ──► listener ──► SubscriberSet::emit
//!     └─ workers[0..cfg.workers], each with a child CancellationToken
//!
//! Submission:
//!   submit(task)
//!     ├─ task.initialize()            (ConfigError → SubmitError)
//!     └─ queue.send(task).await       (full queue suspends: backpressure)
//!
//!   submit_and_wait(task)
//!     ├─ submit failed ──► TaskErrors with one Submit entry
//!     └─ otherwise     ──► task.wait().await
//!
//! Shutdown:
//!   token.cancel()  → workers stop dequeuing; running tasks finish naturally
//!   shutdown(self)  → close queue, join workers, drain the event listener
//! ```
//!
//! ## Example
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use repeatpool::{HandlerFn, Pool, PoolConfig, Task, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let pool = Pool::new(PoolConfig::default(), Vec::new(), CancellationToken::new())
//!         .expect("valid config");
//!
//!     let handler = HandlerFn::arc("table-0", |table, index| async move {
//!         let _ = (table, index); // create the series here
//!         Ok::<_, TaskError>(())
//!     });
//!     let task = Task::new(512, 64, handler).into_ref();
//!
//!     let errors = pool.submit_and_wait(&task).await;
//!     assert!(errors.is_empty());
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::PoolConfig;
use crate::error::{ConfigError, SubmitError};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::task::{TaskErrors, TaskRef};
use crate::worker::{SharedQueue, Worker};

/// Owner of the bounded task queue and the fixed worker set.
///
/// Created once and kept for the life of the workload (or until the governing
/// [`CancellationToken`] fires, after which workers stop picking up new
/// tasks). Must be constructed inside a tokio runtime.
#[derive(Debug)]
pub struct Pool {
    queue: mpsc::Sender<TaskRef>,
    bus: Bus,
    workers: Vec<JoinHandle<()>>,
    listener: Option<JoinHandle<()>>,
}

impl Pool {
    /// Creates the bounded queue, the event machinery, and `cfg.workers`
    /// workers that immediately begin awaiting queue items.
    ///
    /// `subscribers` receive every runtime event through a
    /// [`SubscriberSet`]; pass an empty vec to opt out of event delivery.
    pub fn new(
        cfg: PoolConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
        token: CancellationToken,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let bus = Bus::new(cfg.bus_capacity);
        let listener = Self::subscriber_listener(&bus, subscribers);

        let (tx, rx) = mpsc::channel(cfg.queue_capacity);
        let queue: SharedQueue = Arc::new(Mutex::new(rx));

        let workers = (0..cfg.workers)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    Arc::clone(&queue),
                    bus.clone(),
                    token.child_token(),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        Ok(Self {
            queue: tx,
            bus,
            workers,
            listener,
        })
    }

    /// Subscribes to the bus and forwards events to the subscriber set; the
    /// forwarding loop ends once every bus handle is gone, then drains the set.
    fn subscriber_listener(
        bus: &Bus,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Option<JoinHandle<()>> {
        if subscribers.is_empty() {
            return None;
        }

        let set = SubscriberSet::new(subscribers);
        let mut rx = bus.subscribe();
        Some(tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                set.emit(&ev);
            }
            set.shutdown().await;
        }))
    }

    /// The pool's event bus, for subscribing to runtime events directly.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Initializes the task and places it on the queue.
    ///
    /// A full queue suspends the caller until a worker frees a slot; that is
    /// the pool's backpressure mechanism, not a failure. Errors mean the task
    /// was never enqueued: invalid parameters, or a queue that has shut down.
    pub async fn submit(&self, task: &TaskRef) -> Result<(), SubmitError> {
        task.initialize()?;

        self.queue
            .send(Arc::clone(task))
            .await
            .map_err(|_| SubmitError::QueueClosed)?;

        self.bus.publish(
            Event::new(EventKind::TaskSubmitted).with_repetitions(task.repetitions()),
        );
        Ok(())
    }

    /// Submits the task and blocks until it completes, returning its
    /// aggregated errors.
    ///
    /// A submission failure is folded into a one-entry [`TaskErrors`] instead
    /// of a separate error type, so callers handle one shape for both
    /// submission and execution failures.
    pub async fn submit_and_wait(&self, task: &TaskRef) -> TaskErrors {
        if let Err(error) = self.submit(task).await {
            return TaskErrors::from_submit(error);
        }
        task.wait().await
    }

    /// Graceful teardown: closes the queue, lets every worker finish the task
    /// it holds, and drains the event listener. Waiting tasks that were never
    /// dequeued never complete; submit nothing after calling this.
    pub async fn shutdown(self) {
        let Self {
            queue,
            bus,
            workers,
            listener,
        } = self;

        drop(queue);
        for worker in workers {
            let _ = worker.await;
        }
        drop(bus);
        if let Some(listener) = listener {
            let _ = listener.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::handler::HandlerFn;
    use crate::task::{Task, TaskFailure};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::watch;
    use tokio::time::timeout;

    fn pool(queue_capacity: usize, workers: usize) -> Pool {
        let cfg = PoolConfig {
            queue_capacity,
            workers,
            bus_capacity: 64,
        };
        Pool::new(cfg, Vec::new(), CancellationToken::new()).expect("valid config")
    }

    /// Task whose handler parks until `release` flips to true, counting
    /// invocations.
    fn parked_task(
        repetitions: usize,
        release: watch::Receiver<bool>,
    ) -> (TaskRef, Arc<AtomicUsize>) {
        let invoked = Arc::new(AtomicUsize::new(0));
        let cookie = (Arc::clone(&invoked), release);
        let handler = HandlerFn::arc(cookie, |cookie, _index| async move {
            cookie.0.fetch_add(1, Ordering::SeqCst);
            let mut rx = cookie.1.clone();
            let _ = rx.wait_for(|released| *released).await;
            Ok::<_, TaskError>(())
        });
        (Task::new(repetitions, 1, handler).into_ref(), invoked)
    }

    #[tokio::test]
    async fn test_pool_runs_task_to_completion() {
        let pool = pool(4, 2);
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let handler = HandlerFn::arc(Arc::clone(&seen), |seen, index| async move {
            seen.lock().unwrap().push(index);
            Ok::<_, TaskError>(())
        });
        let task = Task::new(5, 2, handler).into_ref();

        let errors = pool.submit_and_wait(&task).await;
        assert!(errors.is_empty(), "unexpected failures: {errors}");

        let mut indices = seen.lock().unwrap().clone();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_worker_count_bounds_tasks_in_flight() {
        let pool = pool(8, 2);
        let (release_tx, release_rx) = watch::channel(false);

        let (first, _) = parked_task(1, release_rx.clone());
        let (second, _) = parked_task(1, release_rx.clone());
        let (third, invoked_third) = parked_task(1, release_rx);

        pool.submit(&first).await.expect("submit first");
        pool.submit(&second).await.expect("submit second");
        pool.submit(&third).await.expect("submit third");

        // Both workers are parked inside the first two tasks; the third has
        // no worker to run on.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            invoked_third.load(Ordering::SeqCst),
            0,
            "third task ran despite both workers being busy"
        );

        release_tx.send(true).expect("workers hold receivers");
        assert!(first.wait().await.is_empty());
        assert!(second.wait().await.is_empty());
        assert!(third.wait().await.is_empty());
        assert_eq!(invoked_third.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_full_queue_applies_backpressure() {
        let pool = Arc::new(pool(1, 1));
        let (release_tx, release_rx) = watch::channel(false);

        // Pin the only worker, then fill the single queue slot.
        let (blocker, _) = parked_task(1, release_rx.clone());
        pool.submit(&blocker).await.expect("submit blocker");
        tokio::time::sleep(Duration::from_millis(50)).await;

        let (queued, _) = parked_task(1, release_rx.clone());
        pool.submit(&queued).await.expect("queue has one free slot");

        let (third, _) = parked_task(1, release_rx);
        let pool2 = Arc::clone(&pool);
        let third2 = Arc::clone(&third);
        let pending = tokio::spawn(async move { pool2.submit(&third2).await });

        // The queue is full, so the submission must suspend, not fail.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pending.is_finished(), "submission should block on a full queue");

        release_tx.send(true).expect("workers hold receivers");
        pending
            .await
            .expect("join")
            .expect("submission completes once a slot frees");
        assert!(third.wait().await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_and_wait_wraps_submission_error() {
        let pool = pool(4, 1);
        let handler = HandlerFn::arc((), |_cookie, _index| async { Ok::<_, TaskError>(()) });
        let task = Task::new(0, 1, handler).into_ref();

        let errors = pool.submit_and_wait(&task).await;
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors.failures()[0],
            TaskFailure::Submit { .. }
        ));
        assert!(errors.to_string().contains("repetition count"));
    }

    #[tokio::test]
    async fn test_cancelled_pool_reports_queue_closed() {
        let cfg = PoolConfig {
            queue_capacity: 2,
            workers: 2,
            bus_capacity: 16,
        };
        let token = CancellationToken::new();
        let pool = Pool::new(cfg, Vec::new(), token.clone()).expect("valid config");

        token.cancel();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let handler = HandlerFn::arc((), |_cookie, _index| async { Ok::<_, TaskError>(()) });
        let task = Task::new(1, 1, handler).into_ref();
        let err = pool.submit(&task).await.expect_err("queue must be closed");
        assert_eq!(err.as_label(), "submit_queue_closed");
    }

    #[tokio::test]
    async fn test_task_lifecycle_events_published() {
        let pool = pool(4, 1);
        let mut rx = pool.bus().subscribe();

        let handler = HandlerFn::arc((), |_cookie, _index| async { Ok::<_, TaskError>(()) });
        let task = Task::new(2, 2, handler).into_ref();
        assert!(pool.submit_and_wait(&task).await.is_empty());

        let expected = [
            EventKind::TaskSubmitted,
            EventKind::TaskStarting,
            EventKind::TaskCompleted,
        ];
        let mut kinds = Vec::new();
        while !expected.iter().all(|kind| kinds.contains(kind)) {
            let ev = timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("events should arrive")
                .expect("bus open");
            kinds.push(ev.kind);
        }
    }

    #[tokio::test]
    async fn test_task_parallelism_may_exceed_worker_count() {
        let pool = pool(2, 1);
        let invoked = Arc::new(AtomicUsize::new(0));
        let handler = HandlerFn::arc(Arc::clone(&invoked), |invoked, _index| async move {
            invoked.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            Ok::<_, TaskError>(())
        });
        let task = Task::new(8, 8, handler).into_ref();

        assert!(pool.submit_and_wait(&task).await.is_empty());
        assert_eq!(invoked.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let cfg = PoolConfig {
            queue_capacity: 4,
            workers: 0,
            bus_capacity: 16,
        };
        let err = Pool::new(cfg, Vec::new(), CancellationToken::new())
            .expect_err("zero workers must be rejected");
        assert_eq!(err, ConfigError::ZeroWorkers);
    }

    #[tokio::test]
    async fn test_shutdown_joins_workers() {
        let pool = pool(4, 3);
        let handler = HandlerFn::arc((), |_cookie, _index| async { Ok::<_, TaskError>(()) });
        let task = Task::new(4, 2, handler).into_ref();
        assert!(pool.submit_and_wait(&task).await.is_empty());

        timeout(Duration::from_secs(1), pool.shutdown())
            .await
            .expect("shutdown should complete promptly");
    }
}
