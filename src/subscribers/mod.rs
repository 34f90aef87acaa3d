//! # Event subscribers.
//!
//! A [`Subscribe`] implementation consumes the runtime [`Event`](crate::events::Event)s
//! the pool publishes, without the pool ever awaiting it: the
//! [`SubscriberSet`] gives each subscriber a bounded queue and a dedicated
//! worker task, so a slow consumer only ever loses its own events.
//!
//! [`LogWriter`] (feature `logging`) is a ready-made stdout subscriber for
//! demos and debugging.

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
