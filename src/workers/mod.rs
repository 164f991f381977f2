//! # Worker abstractions.
//!
//! - [`Worker`] - trait for one supervised, cancelable unit of work
//! - [`WorkerFn`] - closure-backed worker implementation
//! - [`WorkerRef`] - shared reference to a worker (`Arc<dyn Worker>`)
//! - [`WorkerHandle`], [`RunState`] - per-launch run-state view

mod handle;
mod worker;
mod worker_fn;

pub use handle::{RunState, WorkerHandle};
pub use worker::{Worker, WorkerRef};
pub use worker_fn::WorkerFn;
