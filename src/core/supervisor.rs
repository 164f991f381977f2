//! # WorkerSupervisor: single-worker run loop.
//!
//! Wraps exactly one [`Worker`] and runs it repeatedly while the shared
//! cancellation signal stays unset.
//!
//! ```text
//! loop {
//!   ├─► token cancelled?  ──► break (Exited)
//!   ├─► worker.run(token)
//!   │       ├─ Ok            ──► loop again (re-check token first)
//!   │       ├─ Err(Canceled) ──► break (Exited)
//!   │       └─ Err(fault)    ──► publish WorkerFaulted, break (Faulted)
//! }
//! ```
//!
//! ## Rules
//! - A faulted worker is **not** restarted; it stays down until the next
//!   explicit start/restart cycle, so a task that fails instantly can never
//!   turn into a silent retry storm.
//! - Resilience against transient errors belongs to the task's own internal
//!   loop, not to this supervisor.
//! - The loop blocks only inside the task call; it adds no polling delay of
//!   its own.

use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::events::{Bus, Event, EventKind};
use crate::workers::{RunState, WorkerHandle, WorkerRef};

/// Supervises execution of a single worker.
pub struct WorkerSupervisor {
    worker: WorkerRef,
    handle: WorkerHandle,
    bus: Bus,
}

impl WorkerSupervisor {
    /// Creates a supervisor for one launched worker.
    pub fn new(worker: WorkerRef, handle: WorkerHandle, bus: Bus) -> Self {
        Self {
            worker,
            handle,
            bus,
        }
    }

    /// Runs the worker loop until cancellation, graceful completion, or a
    /// fault. Consumes the supervisor; the handle keeps the terminal state.
    pub async fn run(self, cancel: CancellationToken) {
        let name = self.worker.name().to_string();

        self.handle.transition(RunState::Running);
        self.bus
            .publish(Event::new(EventKind::WorkerStarting).with_worker(name.as_str()));

        let mut iterations: u32 = 0;
        let outcome = loop {
            if cancel.is_cancelled() {
                break RunState::Exited;
            }
            iterations = iterations.saturating_add(1);

            match self.worker.run(cancel.clone()).await {
                Ok(()) => continue,
                Err(WorkerError::Canceled) => break RunState::Exited,
                Err(fault) => {
                    self.bus.publish(
                        Event::new(EventKind::WorkerFaulted)
                            .with_worker(name.as_str())
                            .with_reason(fault.to_string())
                            .with_iterations(iterations),
                    );
                    break RunState::Faulted;
                }
            }
        };

        self.handle.transition(outcome);
        if outcome == RunState::Exited {
            self.bus.publish(
                Event::new(EventKind::WorkerExited)
                    .with_worker(name.as_str())
                    .with_iterations(iterations),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::workers::WorkerFn;

    fn harness() -> (Bus, WorkerHandle) {
        (Bus::new(64), WorkerHandle::new("probe"))
    }

    #[tokio::test]
    async fn fault_ends_the_loop_after_one_invocation() {
        let (bus, handle) = harness();
        let calls = Arc::new(AtomicUsize::new(0));

        let worker = {
            let calls = Arc::clone(&calls);
            WorkerFn::arc("probe", move |_ctx: CancellationToken| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(WorkerError::fault("broken sensor"))
                }
            })
        };

        let mut rx = bus.subscribe();
        WorkerSupervisor::new(worker, handle.clone(), bus)
            .run(CancellationToken::new())
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.state(), RunState::Faulted);

        // Starting, then faulted; never an exited record.
        let first = rx.recv().await.expect("starting event");
        assert_eq!(first.kind, EventKind::WorkerStarting);
        let second = rx.recv().await.expect("faulted event");
        assert_eq!(second.kind, EventKind::WorkerFaulted);
        assert_eq!(second.reason.as_deref(), Some("worker fault: broken sensor"));
    }

    #[tokio::test]
    async fn normal_returns_are_reinvoked_until_cancelled() {
        let (bus, handle) = harness();
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let worker = {
            let calls = Arc::clone(&calls);
            WorkerFn::arc("probe", move |_ctx: CancellationToken| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Ok::<_, WorkerError>(())
                }
            })
        };

        let sup = WorkerSupervisor::new(worker, handle.clone(), bus);
        let running = tokio::spawn(sup.run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        running.await.expect("join");

        assert!(calls.load(Ordering::SeqCst) >= 2, "worker was not re-invoked");
        assert_eq!(handle.state(), RunState::Exited);
    }

    #[tokio::test]
    async fn pre_cancelled_token_means_zero_invocations() {
        let (bus, handle) = harness();
        let calls = Arc::new(AtomicUsize::new(0));

        let worker = {
            let calls = Arc::clone(&calls);
            WorkerFn::arc("probe", move |_ctx: CancellationToken| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, WorkerError>(())
                }
            })
        };

        let cancel = CancellationToken::new();
        cancel.cancel();
        WorkerSupervisor::new(worker, handle.clone(), bus)
            .run(cancel)
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(handle.state(), RunState::Exited);
    }
}
