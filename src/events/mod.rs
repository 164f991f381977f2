//! Lifecycle events: types and broadcast bus.
//!
//! Groups the event **data model** and the **bus** used to publish and
//! subscribe to records emitted by the controller, worker supervisors,
//! watchdog, and subscriber workers.
//!
//! - **Publishers**: `ServiceController`, `WorkerSupervisor`,
//!   `ShutdownWatchdog`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the controller's subscriber listener (fans out to
//!   `SubscriberSet`) and the `AliveTracker` listener.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
