//! # ServiceController: lifecycle state machine over the fixed worker set.
//!
//! Owns the lifecycle state, the per-cycle cancellation signal, and the
//! three worker supervisors (command-reader, video-sender,
//! telemetry-reporter). Requests arrive from the [`SignalRouter`] or from
//! direct calls; transitions are serialized behind one mutex, so there is
//! never a concurrent start+stop.
//!
//! ```text
//! Stopped ──start()──► Running ──stop()──► Stopped
//!                        │
//!                        └─restart()─► (stop, then start) ──► Running
//!
//! start():
//!   - fresh CancellationToken (unset) BEFORE any spawn
//!   - one WorkerSupervisor per worker, all concurrent, no ordering
//!   - ready indication on a detached task (cannot delay startup)
//!
//! stop():
//!   - set the shared token AND NetworkService::shutdown() — both are
//!     required; the token alone cannot unblock a parked accept
//!   - join the cycle's workers, bounded by Config::grace
//!   - on timeout: detach stragglers, report GraceExceeded
//!
//! run():
//!   start ─► consume ControlRequests ─► Shutdown ─► final stop ─►
//!   actuator.halt() ─► ShutdownWatchdog::settle() ─► Disposition
//! ```
//!
//! Faults inside one worker never reach the controller as errors; they are
//! observed only through the worker's terminal run-state and the journal.
//! Recovery is always an explicit restart.

use std::sync::Arc;

use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::signals::{ControlRequest, SignalRouter};
use crate::core::supervisor::WorkerSupervisor;
use crate::core::watchdog::{Disposition, ShutdownWatchdog};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::hal::{Actuator, ReadySignal};
use crate::net::NetworkService;
use crate::status::{Lifecycle, ServiceStatus};
use crate::subscribers::{AliveTracker, Subscribe, SubscriberSet};
use crate::workers::{RunState, WorkerFn, WorkerHandle, WorkerRef};

/// Per-cycle state: replaced wholesale on every start.
struct Cycle {
    lifecycle: Lifecycle,
    cancel: CancellationToken,
    join: JoinSet<()>,
}

/// Coordinates the fixed worker set, lifecycle transitions, and shutdown.
pub struct ServiceController {
    /// Runtime configuration.
    pub cfg: Config,
    /// Event bus shared with supervisors and the watchdog.
    pub bus: Bus,
    /// Subscriber fan-out; held for the controller's lifetime so the
    /// journal queues stay open.
    pub subs: Arc<SubscriberSet>,
    /// Live-worker tracker the watchdog inspects.
    pub alive: Arc<AliveTracker>,
    net: Arc<dyn NetworkService>,
    actuator: Arc<dyn Actuator>,
    ready: Arc<dyn ReadySignal>,
    workers: Vec<WorkerRef>,
    cycle: Mutex<Cycle>,
    handles: RwLock<Vec<WorkerHandle>>,
    status_tx: watch::Sender<ServiceStatus>,
    /// A resident receiver held for the controller's lifetime so the status
    /// channel stays open; without it `status_tx.send` has no receivers and
    /// silently drops every published snapshot.
    _status_rx: watch::Receiver<ServiceStatus>,
}

impl ServiceController {
    /// Creates the controller and wires the event plumbing.
    ///
    /// Must be called from within a tokio runtime: the subscriber fan-out
    /// workers and the alive-tracker listener are spawned here. The worker
    /// set is fixed at this point — the three entry points of `net` — and
    /// never changes afterwards.
    pub fn new(
        cfg: Config,
        net: Arc<dyn NetworkService>,
        actuator: Arc<dyn Actuator>,
        ready: Arc<dyn ReadySignal>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());

        let alive = Arc::new(AliveTracker::new());
        alive.spawn_listener(bus.subscribe());

        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        Self::spawn_subscriber_listener(&bus, &subs);

        let workers = Self::build_workers(&net);
        let (status_tx, status_rx) = watch::channel(ServiceStatus::idle());

        Self {
            cfg,
            bus,
            subs,
            alive,
            net,
            actuator,
            ready,
            workers,
            cycle: Mutex::new(Cycle {
                lifecycle: Lifecycle::Stopped,
                cancel: CancellationToken::new(),
                join: JoinSet::new(),
            }),
            handles: RwLock::new(Vec::new()),
            status_tx,
            _status_rx: status_rx,
        }
    }

    /// Forwards bus events to the subscriber set (fire-and-forget).
    fn spawn_subscriber_listener(bus: &Bus, subs: &Arc<SubscriberSet>) {
        let mut rx = bus.subscribe();
        let set = Arc::clone(subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// The fixed worker set: one worker per network entry point.
    fn build_workers(net: &Arc<dyn NetworkService>) -> Vec<WorkerRef> {
        let commands: WorkerRef = {
            let net = Arc::clone(net);
            WorkerFn::arc("command-reader", move |ctx: CancellationToken| {
                let net = Arc::clone(&net);
                async move { net.serve_commands(ctx).await }
            })
        };
        let media: WorkerRef = {
            let net = Arc::clone(net);
            WorkerFn::arc("video-sender", move |ctx: CancellationToken| {
                let net = Arc::clone(&net);
                async move { net.serve_media(ctx).await }
            })
        };
        let telemetry: WorkerRef = {
            let net = Arc::clone(net);
            WorkerFn::arc("telemetry-reporter", move |ctx: CancellationToken| {
                let net = Arc::clone(&net);
                async move { net.report_telemetry(ctx).await }
            })
        };
        vec![commands, media, telemetry]
    }

    /// Starts the worker set.
    ///
    /// No-op with a journaled notice unless the lifecycle is `Stopped`.
    /// The cancellation token is created fresh (unset) before any worker
    /// launches, so no worker can observe a stale cancelled flag from a
    /// previous cycle.
    pub async fn start(&self) {
        let mut cycle = self.cycle.lock().await;
        if cycle.lifecycle != Lifecycle::Stopped {
            self.bus.publish(
                Event::new(EventKind::LifecycleNoop)
                    .with_reason("start ignored: service is not stopped"),
            );
            return;
        }
        self.bus.publish(Event::new(EventKind::ServiceStarting));

        let cancel = CancellationToken::new();
        let mut join = JoinSet::new();
        let mut handles = Vec::with_capacity(self.workers.len());
        for worker in &self.workers {
            let handle = WorkerHandle::new(worker.name());
            let sup = WorkerSupervisor::new(Arc::clone(worker), handle.clone(), self.bus.clone());
            join.spawn(sup.run(cancel.clone()));
            handles.push(handle);
        }
        *self.handles.write().await = handles;

        cycle.cancel = cancel;
        cycle.join = join;
        cycle.lifecycle = Lifecycle::Running;
        self.bus.publish(Event::new(EventKind::ServiceStarted));
        self.publish_status(Lifecycle::Running);

        // One-shot ready indication, detached so it can never delay or
        // block worker startup.
        let ready = Arc::clone(&self.ready);
        tokio::spawn(async move { ready.announce().await });
    }

    /// Stops the worker set.
    ///
    /// No-op with a journaled notice unless the lifecycle is `Running`.
    /// Sets the shared cancellation signal, unblocks the network
    /// collaborator, then joins the cycle's workers bounded by
    /// [`Config::grace`]. Safe to call from a different execution context
    /// than `start`.
    ///
    /// On timeout the stragglers are detached (orphaned), the lifecycle
    /// still transitions to `Stopped`, and
    /// [`RuntimeError::GraceExceeded`] is returned with their names.
    pub async fn stop(&self) -> Result<(), RuntimeError> {
        let mut cycle = self.cycle.lock().await;
        if cycle.lifecycle != Lifecycle::Running {
            self.bus.publish(
                Event::new(EventKind::LifecycleNoop)
                    .with_reason("stop ignored: service is not running"),
            );
            return Ok(());
        }
        cycle.lifecycle = Lifecycle::Stopping;
        self.bus.publish(Event::new(EventKind::ServiceStopping));
        self.publish_status(Lifecycle::Stopping);

        // Cooperative cancellation needs both: the flag for loop checks and
        // the collaborator shutdown to unblock anything parked on I/O.
        cycle.cancel.cancel();
        self.net.shutdown().await;

        let grace = self.cfg.grace;
        let drained = {
            let join = &mut cycle.join;
            tokio::time::timeout(grace, async move {
                while join.join_next().await.is_some() {}
            })
            .await
        };

        cycle.lifecycle = Lifecycle::Stopped;
        self.bus.publish(Event::new(EventKind::ServiceStopped));
        self.publish_status(Lifecycle::Stopped);

        match drained {
            Ok(()) => Ok(()),
            Err(_elapsed) => {
                cycle.join.detach_all();
                let stuck = self.alive.snapshot().await;
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded)
                        .with_reason(format!("stop grace elapsed; still running: {stuck:?}")),
                );
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Stops, then immediately starts again.
    ///
    /// If the stop times out, start proceeds anyway: the prior generation
    /// is left orphaned (visible to the watchdog) and the stop error is
    /// returned after the new cycle is up. An orphan still holding a port
    /// surfaces as a fault in the new generation, not as silence.
    pub async fn restart(&self) -> Result<(), RuntimeError> {
        let stopped = self.stop().await;
        self.start().await;
        stopped
    }

    /// The process's main execution path.
    ///
    /// Starts the worker set, then consumes control requests until a
    /// shutdown condition: stop and restart are applied as they arrive
    /// (redundant ones land on the no-op paths), shutdown breaks the loop.
    /// After the final stop and a best-effort actuator halt, the watchdog
    /// runs exactly once and its [`Disposition`] is returned — mapping it
    /// to an exit status is the caller's last act.
    pub async fn run(&self) -> Result<Disposition, RuntimeError> {
        self.start().await;
        let mut router = SignalRouter::install()?;

        loop {
            match router.recv().await {
                ControlRequest::Stop => {
                    self.bus.publish(Event::new(EventKind::StopRequested));
                    let _ = self.stop().await;
                }
                ControlRequest::Restart => {
                    self.bus.publish(Event::new(EventKind::RestartRequested));
                    let _ = self.restart().await;
                }
                ControlRequest::Shutdown => {
                    self.bus.publish(Event::new(EventKind::ShutdownRequested));
                    break;
                }
            }
        }

        Ok(self.finalize().await)
    }

    /// Completes the shutdown sequence: final stop, hardware all-stop, then
    /// the single watchdog pass.
    async fn finalize(&self) -> Disposition {
        let _ = self.stop().await;
        self.actuator.halt();

        ShutdownWatchdog::new(self.cfg.settle, Arc::clone(&self.alive), self.bus.clone())
            .settle()
            .await
    }

    /// Current lifecycle phase.
    pub fn lifecycle(&self) -> Lifecycle {
        self.status_tx.borrow().lifecycle
    }

    /// Fresh status snapshot for read-only pollers.
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            lifecycle: self.lifecycle(),
            addr: self.net.local_addr(),
        }
    }

    /// Watch channel for push-style status consumers.
    pub fn watch_status(&self) -> watch::Receiver<ServiceStatus> {
        self.status_tx.subscribe()
    }

    /// Names and run states of the current cycle's workers.
    pub async fn worker_states(&self) -> Vec<(String, RunState)> {
        self.handles
            .read()
            .await
            .iter()
            .map(|h| (h.name().to_string(), h.state()))
            .collect()
    }

    fn publish_status(&self, lifecycle: Lifecycle) {
        let _ = self.status_tx.send(ServiceStatus {
            lifecycle,
            addr: self.net.local_addr(),
        });
    }
}
