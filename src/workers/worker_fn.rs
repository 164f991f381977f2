//! # Closure-backed worker (`WorkerFn`).
//!
//! [`WorkerFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing
//! a fresh future per invocation. No hidden state is shared between
//! iterations; if a worker needs shared state, capture an `Arc<...>`
//! explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use roverd::{WorkerFn, WorkerRef, WorkerError};
//!
//! let w: WorkerRef = WorkerFn::arc("command-reader", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(WorkerError::Canceled);
//!     }
//!     // serve one connection...
//!     Ok(())
//! });
//!
//! assert_eq!(w.name(), "command-reader");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::workers::worker::Worker;

/// Function-backed worker implementation.
///
/// Wraps a closure that *creates* a new future per invocation.
#[derive(Debug)]
pub struct WorkerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed worker.
    ///
    /// Prefer [`WorkerFn::arc`] when you immediately need a
    /// [`WorkerRef`](crate::WorkerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Worker for WorkerFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), WorkerError> {
        (self.f)(ctx).await
    }
}
