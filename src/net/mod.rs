//! # Network I/O collaborator.
//!
//! The three supervised workers are thin wrappers around the three blocking
//! entry points of a [`NetworkService`]: command ingestion, media streaming,
//! and telemetry reporting. The service also exposes [`shutdown`] to
//! forcibly unblock anything parked on an accept or read — setting the
//! cancellation token alone does not guarantee a prompt exit, so the
//! controller always does both.
//!
//! [`shutdown`]: NetworkService::shutdown

mod tcp;

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;

pub use tcp::{TcpConfig, TcpNetworkService};

/// The controller's view of the network endpoint.
///
/// Each `serve_*`/`report_*` method is one worker's task body: it blocks
/// inside its own accept/read/sleep points, watches `ctx`, and returns
/// [`WorkerError::Canceled`] on a graceful exit. Any other error is a fault
/// for that worker alone.
#[async_trait]
pub trait NetworkService: Send + Sync + 'static {
    /// Accepts command connections and feeds each received line to the sink.
    async fn serve_commands(&self, ctx: CancellationToken) -> Result<(), WorkerError>;

    /// Accepts media connections and streams frames to them.
    async fn serve_media(&self, ctx: CancellationToken) -> Result<(), WorkerError>;

    /// Periodically samples power telemetry and reports it.
    async fn report_telemetry(&self, ctx: CancellationToken) -> Result<(), WorkerError>;

    /// Forcibly unblocks any worker parked inside this service.
    ///
    /// Called by the controller together with setting the cancellation
    /// token; both are required for a prompt stop.
    async fn shutdown(&self);

    /// Address the command endpoint is currently bound to, if any.
    fn local_addr(&self) -> Option<SocketAddr>;
}

/// Consumer of raw command lines.
///
/// Payloads stay opaque to this crate; whatever parses and acts on them is
/// injected behind this seam.
pub trait CommandSink: Send + Sync + 'static {
    /// Handles one received command line.
    fn dispatch(&self, line: &str);
}
