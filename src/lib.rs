//! # roverd
//!
//! **roverd** is the process-lifecycle controller for a robot-car service:
//! it supervises a fixed set of long-running workers (command ingestion,
//! media streaming, telemetry reporting), coordinates start/stop/restart
//! from external signals, and guarantees the process terminates within a
//! bounded time even when a worker misbehaves.
//!
//! ## Architecture
//! ```text
//!  SIGINT/SIGTERM  SIGUSR1  SIGUSR2
//!        │            │        │
//!        ▼            ▼        ▼
//! ┌───────────────────────────────────┐
//! │ SignalRouter (ControlRequest)     │
//! └─────────────────┬─────────────────┘
//!                   ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │ ServiceController                                         │
//! │  - lifecycle: Stopped / Running / Stopping (serialized)   │
//! │  - per-cycle CancellationToken + JoinSet                  │
//! │  - Bus (broadcast events) ──► SubscriberSet ──► LogWriter │
//! │  - AliveTracker (live-worker set)                         │
//! └──────┬──────────────────┬──────────────────┬──────────────┘
//!        ▼                  ▼                  ▼
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────────┐
//! │ Supervisor   │   │ Supervisor   │   │ Supervisor         │
//! │ command-     │   │ video-       │   │ telemetry-         │
//! │ reader       │   │ sender       │   │ reporter           │
//! └──────┬───────┘   └──────┬───────┘   └─────────┬──────────┘
//!        └────────── NetworkService (serve/report/shutdown) ──┘
//!
//! Shutdown path:
//!   stop(): cancel token + NetworkService::shutdown()
//!           └─► join workers, bounded by Config::grace
//!   run():  final stop ─► Actuator::halt() ─► ShutdownWatchdog::settle()
//!           └─► Disposition { Clean → exit 0, Forced → exit 1 }
//! ```
//!
//! ## Rules
//! - A faulted worker stays down until the next explicit start/restart;
//!   the supervisor never restarts it on its own.
//! - Cancellation is cooperative: the token and the collaborator shutdown
//!   are always set together, because the flag alone cannot unblock a
//!   worker parked on I/O.
//! - Exceeding the shutdown bound is fatal by design: the watchdog names
//!   the stragglers in the journal and the process exits non-clean.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use roverd::hal::sim::{ConsoleChime, SimActuator, SimPowerMonitor, TestPatternCamera};
//! use roverd::net::{CommandSink, TcpConfig, TcpNetworkService};
//! use roverd::{Config, LogWriter, ServiceController, Subscribe};
//!
//! struct DropSink;
//! impl CommandSink for DropSink {
//!     fn dispatch(&self, _line: &str) {}
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let net = Arc::new(TcpNetworkService::new(
//!         TcpConfig::default(),
//!         Arc::new(DropSink),
//!         Arc::new(TestPatternCamera),
//!         Arc::new(SimPowerMonitor),
//!     ));
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::stdout())];
//!
//!     let controller = ServiceController::new(
//!         Config::default(),
//!         net,
//!         Arc::new(SimActuator::new()),
//!         Arc::new(ConsoleChime),
//!         subs,
//!     );
//!
//!     match controller.run().await {
//!         Ok(disposition) => disposition.terminate(),
//!         Err(e) => {
//!             eprintln!("roverd failed: {e}");
//!             std::process::exit(1);
//!         }
//!     }
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
pub mod hal;
pub mod net;
mod status;
mod subscribers;
mod workers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{
    ControlRequest, Disposition, ServiceController, ShutdownWatchdog, SignalRouter,
    WorkerSupervisor, EXIT_CLEAN, EXIT_FORCED,
};
pub use error::{RuntimeError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use status::{Lifecycle, ServiceStatus};
pub use subscribers::{AliveTracker, LogWriter, Subscribe, SubscriberSet};
pub use workers::{RunState, Worker, WorkerFn, WorkerHandle, WorkerRef};
