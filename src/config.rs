//! # Pool configuration.
//!
//! [`PoolConfig`] defines the pool's two independent bounds (how many tasks
//! may *wait* and how many may be *processed* at once) plus the event bus
//! capacity.
//!
//! # Example
//! ```
//! use repeatpool::PoolConfig;
//!
//! let mut cfg = PoolConfig::default();
//! cfg.workers = 8;
//! cfg.queue_capacity = 32;
//!
//! assert_eq!(cfg.workers, 8);
//! ```

use crate::error::ConfigError;

/// Configuration for a [`Pool`](crate::Pool).
///
/// Queue capacity and worker count bound different resources: the queue
/// limits tasks *waiting* for a worker, the worker count limits tasks
/// *running*. Neither constrains a task's own `max_parallel`, which governs
/// repetitions within a single task.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum number of tasks waiting in the queue; a full queue suspends
    /// submitters (backpressure).
    pub queue_capacity: usize,
    /// Number of workers, each processing one task at a time.
    pub workers: usize,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for PoolConfig {
    /// Provides a default configuration:
    /// - `queue_capacity = 128`
    /// - `workers = 4`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            queue_capacity: 128,
            workers: 4,
            bus_capacity: 1024,
        }
    }
}

impl PoolConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity < 1 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.workers < 1 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }
}
