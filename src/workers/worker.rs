//! # Worker abstraction.
//!
//! A [`Worker`] is one long-lived unit of work (command ingestion, media
//! streaming, telemetry reporting) supervised by the controller. The common
//! handle type is [`WorkerRef`], an `Arc<dyn Worker>` suitable for sharing
//! across the runtime.
//!
//! A worker receives a [`CancellationToken`] and should check it at its
//! blocking points to exit cooperatively during shutdown. Cancellation is
//! cooperative, not preemptive: a worker parked on I/O only unblocks when
//! the I/O collaborator itself is shut down alongside the token.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;

/// Shared handle to a worker (`Arc<dyn Worker>`).
pub type WorkerRef = Arc<dyn Worker>;

/// One supervised, cancelable unit of work.
///
/// [`run`](Worker::run) is invoked repeatedly by the supervisor: returning
/// `Ok(())` means "iteration finished, invoke me again"; returning
/// [`WorkerError::Canceled`] means a graceful exit; any other error is a
/// fault that takes this worker down until the next start/restart cycle.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use roverd::{Worker, WorkerError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Worker for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), WorkerError> {
///         if ctx.is_cancelled() {
///             return Err(WorkerError::Canceled);
///         }
///         // do one unit of work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Returns a stable, human-readable worker name.
    fn name(&self) -> &str;

    /// Executes one iteration until completion, fault, or cancellation.
    async fn run(&self, ctx: CancellationToken) -> Result<(), WorkerError>;
}
