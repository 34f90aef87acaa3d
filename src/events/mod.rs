//! # Runtime events and the broadcast bus.
//!
//! The pool never logs from its hot paths. Instead it publishes [`Event`]s on a
//! [`Bus`]; callers consume them through
//! [`subscribers`](crate::subscribers) or by subscribing to the bus directly.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
