//! # Handler abstraction and function-backed handler implementation.
//!
//! This module defines the [`Handler`] trait (the per-repetition operation) and a
//! convenient function-backed implementation [`HandlerFn`]. The common handle type
//! is [`HandlerRef`], an `Arc<dyn Handler>` suitable for sharing across the runtime.
//!
//! The runtime invokes a handler once per repetition index and only looks at the
//! success/failure outcome; what the call does (an HTTP request, a table write,
//! local computation) is opaque. A handler wanting to stop early during shutdown
//! should capture its own cancellation signal and return
//! [`TaskError::Canceled`](crate::TaskError::Canceled) when it fires; the runtime
//! never interrupts an in-flight repetition.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;

/// Shared handle to a handler (`Arc<dyn Handler>`).
pub type HandlerRef = Arc<dyn Handler>;

/// # The operation executed once per repetition.
///
/// Implementations must be safe to invoke concurrently: up to the owning
/// task's `max_parallel` calls run at the same time, each with a distinct
/// index in `0..repetitions`. Indices carry no ordering guarantee.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use repeatpool::{Handler, TaskError};
///
/// struct Probe;
///
/// #[async_trait]
/// impl Handler for Probe {
///     async fn call(&self, index: usize) -> Result<(), TaskError> {
///         if index == 13 {
///             return Err(TaskError::fail("unlucky"));
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Executes the repetition with the given index.
    async fn call(&self, index: usize) -> Result<(), TaskError>;
}

/// Function-backed handler carrying a typed cookie.
///
/// Wraps a closure `F: Fn(Arc<C>, usize) -> Fut` together with a caller-supplied
/// cookie value shared read-only by every invocation (a table name, a delay,
/// a client handle). Each call produces a fresh future owning its own state;
/// shared mutable state must be made explicit with `Arc<...>` inside the cookie
/// or the closure.
pub struct HandlerFn<C, F> {
    cookie: Arc<C>,
    f: F,
}

impl<C, F> HandlerFn<C, F> {
    /// Creates a new function-backed handler around `cookie`.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`].
    pub fn new<Fut>(cookie: C, f: F) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            cookie: Arc::new(cookie),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    ///
    /// # Example
    /// ```
    /// use repeatpool::{HandlerFn, TaskError};
    ///
    /// let handler = HandlerFn::arc("metrics_table", |table, index| async move {
    ///     let _ = (table, index); // issue the write here
    ///     Ok::<_, TaskError>(())
    /// });
    /// ```
    pub fn arc<Fut>(cookie: C, f: F) -> Arc<Self>
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Arc::new(Self::new(cookie, f))
    }
}

#[async_trait]
impl<C, F, Fut> Handler for HandlerFn<C, F>
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>, usize) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    async fn call(&self, index: usize) -> Result<(), TaskError> {
        (self.f)(Arc::clone(&self.cookie), index).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handler_fn_passes_cookie_and_index() {
        let handler = HandlerFn::arc("prefix".to_string(), |cookie: Arc<String>, index| async move {
            if format!("{cookie}-{index}") == "prefix-7" {
                Ok(())
            } else {
                Err(TaskError::fail("wrong arguments"))
            }
        });

        assert!(handler.call(7).await.is_ok());
        assert!(handler.call(8).await.is_err());
    }
}
