//! # Lifecycle events emitted by the controller, supervisors, and watchdog.
//!
//! [`EventKind`] classifies events across four categories:
//! - **Control events**: external requests routed from OS signals
//! - **Service events**: lifecycle transitions of the controller
//! - **Worker events**: one supervisor's loop starting, exiting, faulting
//! - **Shutdown events**: outcome of the bounded shutdown wait
//!
//! Every lifecycle transition is driven by exactly one of these records —
//! the bus is the transition log, and the [`LogWriter`](crate::LogWriter)
//! subscriber makes it durable.
//!
//! ## Ordering guarantees
//! Each event carries a globally unique sequence number (`seq`) that
//! increases monotonically; use it to restore order if delivery interleaves.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Control events (signal router) ===
    /// Stop requested: stop workers, keep the process alive.
    StopRequested,
    /// Restart requested: stop, then immediately start again.
    RestartRequested,
    /// Shutdown requested: clean stop, then terminate the process.
    ShutdownRequested,

    // === Service lifecycle events ===
    /// Controller began a start transition.
    ServiceStarting,
    /// All workers launched; lifecycle is now Running.
    ServiceStarted,
    /// Controller began a stop transition; cancellation signal is set.
    ServiceStopping,
    /// Stop finished (cleanly or abandoned); lifecycle is now Stopped.
    ServiceStopped,
    /// A redundant operation was ignored (start while running, stop while
    /// stopped). Carries the notice in `reason`.
    LifecycleNoop,

    // === Worker events ===
    /// A supervisor began running its worker. Sets `worker`.
    WorkerStarting,
    /// A supervisor's loop ended gracefully. Sets `worker`, `iterations`.
    WorkerExited,
    /// A worker iteration faulted; that worker stays down until the next
    /// start/restart. Sets `worker`, `reason`, `iterations`.
    WorkerFaulted,

    // === Shutdown outcome events ===
    /// Every worker context ended within the bounded wait.
    AllStoppedWithin,
    /// The bounded wait elapsed with workers still alive. Sets `worker`
    /// (one event per straggler) or `reason` with the summary.
    GraceExceeded,

    // === Subscriber plumbing ===
    /// A subscriber's queue overflowed and an event was dropped for it.
    SubscriberOverflow,
    /// A subscriber panicked while handling an event.
    SubscriberPanicked,
}

impl EventKind {
    /// Returns a short stable label (kebab-case) for journal lines.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::StopRequested => "stop-requested",
            EventKind::RestartRequested => "restart-requested",
            EventKind::ShutdownRequested => "shutdown-requested",
            EventKind::ServiceStarting => "service-starting",
            EventKind::ServiceStarted => "service-started",
            EventKind::ServiceStopping => "service-stopping",
            EventKind::ServiceStopped => "service-stopped",
            EventKind::LifecycleNoop => "lifecycle-noop",
            EventKind::WorkerStarting => "worker-starting",
            EventKind::WorkerExited => "worker-exited",
            EventKind::WorkerFaulted => "worker-faulted",
            EventKind::AllStoppedWithin => "all-stopped-within-grace",
            EventKind::GraceExceeded => "grace-exceeded",
            EventKind::SubscriberOverflow => "subscriber-overflow",
            EventKind::SubscriberPanicked => "subscriber-panicked",
        }
    }
}

/// A lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for the journal)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the worker, if applicable.
    pub worker: Option<Arc<str>>,
    /// Human-readable reason (fault cause, noop notice, straggler summary).
    pub reason: Option<Arc<str>>,
    /// How many times the worker's task had been invoked, if applicable.
    pub iterations: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            reason: None,
            iterations: None,
        }
    }

    /// Attaches a worker name.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the iteration count.
    #[inline]
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_worker(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_worker(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::ServiceStarting);
        let b = Event::new(EventKind::ServiceStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_set_fields() {
        let ev = Event::new(EventKind::WorkerFaulted)
            .with_worker("telemetry-reporter")
            .with_reason("adc read failed")
            .with_iterations(4);
        assert_eq!(ev.kind.as_label(), "worker-faulted");
        assert_eq!(ev.worker.as_deref(), Some("telemetry-reporter"));
        assert_eq!(ev.reason.as_deref(), Some("adc read failed"));
        assert_eq!(ev.iterations, Some(4));
    }
}
