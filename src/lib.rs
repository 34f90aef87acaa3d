//! # repeatpool
//!
//! **repeatpool** is a bounded-concurrency repeating-task execution pool.
//!
//! It runs one operation a fixed number of times ("repetitions", indexed
//! `0..N`) across a limited number of simultaneously active repetitions,
//! while a separate pool-level bound limits how many distinct tasks are
//! processed at once. Per-repetition failures are aggregated for the caller,
//! with no hand-rolled spawning, synchronization, or failure collection.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Task     │   │     Task     │   │     Task     │
//!     │ (N reps, ≤M  │   │ (N reps, ≤M  │   │ (N reps, ≤M  │
//!     │  in flight)  │   │  in flight)  │   │  in flight)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ submit           ▼ submit           ▼ submit
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Pool                                                             │
//! │  - bounded task queue (capacity: PoolConfig::queue_capacity)      │
//! │  - fixed worker set   (count:    PoolConfig::workers)             │
//! │  - Bus (broadcast events) ─► SubscriberSet ─► subscribers         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Worker 0   │   │   Worker 1   │   │   Worker W-1 │
//!     │ (1 task at   │   │ (1 task at   │   │ (1 task at   │
//!     │  a time)     │   │  a time)     │   │  a time)     │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ Task::run():     │                  │
//!      │  Semaphore(max_parallel) gates handler.call(index)
//!      ▼                  ▼                  ▼
//!   failures collected per task ──► completion signal ──► wait()
//! ```
//!
//! ### Lifecycle
//! ```text
//! Task ──► Pool::submit() ──► queue ──► Worker ──► Task::run()
//!
//! run():
//!   for index in 0..repetitions {
//!     ├─► acquire repetition permit (Semaphore(max_parallel))
//!     ├─► failures ≥ max_failures? ─► abandon unstarted repetitions, stop
//!     └─► spawn handler.call(index)
//!            ├─ Ok  ──► done
//!            └─ Err ──► record (index, error), publish RepetitionFailed
//!   }
//!   join all in-flight repetitions
//!   fire completion signal (exactly once)
//!
//! caller: task.wait().await ──► TaskErrors
//!         TaskGroup::wait()  ──► TaskGroupErrors (insertion order)
//! ```
//!
//! Two concurrency ceilings apply independently: the pool's worker count
//! bounds how many *distinct tasks* run at once, and each task's
//! `max_parallel` bounds how many of *its repetitions* run at once. A task's
//! `max_parallel` may legitimately exceed the worker count; they govern
//! different resources.
//!
//! Cancellation is governed by the [`CancellationToken`] handed to
//! [`Pool::new`]: cancelling it stops workers from picking up new tasks, but
//! never interrupts in-flight repetitions. Handlers wanting early exit must
//! observe their own cancellation signal and return
//! [`TaskError::Canceled`].
//!
//! ## Quick start
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use repeatpool::{HandlerFn, Pool, PoolConfig, Task, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let pool = Pool::new(PoolConfig::default(), Vec::new(), CancellationToken::new())
//!         .expect("valid config");
//!
//!     // Create 256 series, at most 32 in flight, giving up after 8 failures.
//!     let handler = HandlerFn::arc("cpu_metrics", |table, index| async move {
//!         let _ = (table, index); // issue the write here
//!         Ok::<_, TaskError>(())
//!     });
//!     let task = Task::new(256, 32, handler).with_max_failures(8).into_ref();
//!
//!     let errors = pool.submit_and_wait(&task).await;
//!     if let Err(errors) = errors.into_result() {
//!         eprintln!("series creation failed: {errors}");
//!     }
//! }
//! ```
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod config;
mod error;
mod group;
mod handler;
mod pool;
mod task;
mod worker;

pub mod events;
pub mod subscribers;

pub use config::PoolConfig;
pub use error::{ConfigError, SubmitError, TaskError};
pub use group::{TaskGroup, TaskGroupErrors};
pub use handler::{Handler, HandlerFn, HandlerRef};
pub use pool::Pool;
pub use task::{Task, TaskErrors, TaskFailure, TaskRef};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
