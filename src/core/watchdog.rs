//! # ShutdownWatchdog: bounded final wait, then a verdict.
//!
//! Runs exactly once per full shutdown sequence — after `stop()` has
//! returned (or been abandoned) and after best-effort resource cleanup,
//! never before. It polls the [`AliveTracker`] until either every worker
//! context has ended or the settle bound elapses.
//!
//! The verdict and the act of exiting are deliberately separate:
//! [`ShutdownWatchdog::settle`] returns a [`Disposition`] that tests can
//! assert on, and only [`Disposition::terminate`] actually ends the
//! process. Exceeding the bound is fatal by design, never retried.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::AliveTracker;

/// Poll cadence while waiting for worker contexts to drain.
const SETTLE_POLL: Duration = Duration::from_millis(100);

/// Process exit status for a clean shutdown.
pub const EXIT_CLEAN: i32 = 0;
/// Process exit status when the watchdog had to force termination.
pub const EXIT_FORCED: i32 = 1;

/// Final outcome of a shutdown sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Every worker context ended inside the bound.
    Clean,
    /// The bound elapsed with the listed workers still alive.
    Forced {
        /// Names of the surviving worker contexts.
        stuck: Vec<String>,
    },
}

impl Disposition {
    /// Exit status this disposition maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            Disposition::Clean => EXIT_CLEAN,
            Disposition::Forced { .. } => EXIT_FORCED,
        }
    }

    /// Terminates the process with this disposition's exit status.
    ///
    /// The only non-graceful exit in the crate; callers reach it solely
    /// through the watchdog path.
    pub fn terminate(self) -> ! {
        std::process::exit(self.exit_code())
    }
}

/// Enforces the final settle bound on shutdown.
pub struct ShutdownWatchdog {
    settle: Duration,
    alive: Arc<AliveTracker>,
    bus: Bus,
}

impl ShutdownWatchdog {
    /// Creates the watchdog over the given live-worker tracker.
    pub fn new(settle: Duration, alive: Arc<AliveTracker>, bus: Bus) -> Self {
        Self { settle, alive, bus }
    }

    /// Waits up to the settle bound for all worker contexts to end.
    ///
    /// Publishes [`EventKind::AllStoppedWithin`] on success; on timeout,
    /// publishes one [`EventKind::GraceExceeded`] record per straggler so
    /// each survivor is named in the journal.
    pub async fn settle(&self) -> Disposition {
        let deadline = Instant::now() + self.settle;

        loop {
            let stuck = self.alive.snapshot().await;
            if stuck.is_empty() {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                return Disposition::Clean;
            }
            if Instant::now() >= deadline {
                for name in &stuck {
                    self.bus.publish(
                        Event::new(EventKind::GraceExceeded)
                            .with_worker(name.as_str())
                            .with_reason("did not exit within the settle bound"),
                    );
                }
                return Disposition::Forced { stuck };
            }
            tokio::time::sleep(SETTLE_POLL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked(bus: &Bus) -> Arc<AliveTracker> {
        let alive = Arc::new(AliveTracker::new());
        alive.spawn_listener(bus.subscribe());
        alive
    }

    async fn wait_for_snapshot_len(alive: &AliveTracker, len: usize) {
        for _ in 0..100 {
            if alive.snapshot().await.len() == len {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("tracker never reached {len} live workers");
    }

    #[tokio::test]
    async fn empty_tracker_settles_clean() {
        let bus = Bus::new(64);
        let alive = tracked(&bus);

        let verdict = ShutdownWatchdog::new(Duration::from_millis(200), alive, bus)
            .settle()
            .await;
        assert_eq!(verdict, Disposition::Clean);
        assert_eq!(verdict.exit_code(), EXIT_CLEAN);
    }

    #[tokio::test]
    async fn surviving_worker_forces_a_non_clean_verdict() {
        let bus = Bus::new(64);
        let alive = tracked(&bus);

        bus.publish(Event::new(EventKind::WorkerStarting).with_worker("video-sender"));
        wait_for_snapshot_len(&alive, 1).await;

        let verdict = ShutdownWatchdog::new(
            Duration::from_millis(200),
            Arc::clone(&alive),
            bus.clone(),
        )
        .settle()
        .await;

        assert_eq!(
            verdict,
            Disposition::Forced {
                stuck: vec!["video-sender".to_string()]
            }
        );
        assert_eq!(verdict.exit_code(), EXIT_FORCED);

        // Once the straggler reports in, a later settle is clean again.
        bus.publish(Event::new(EventKind::WorkerExited).with_worker("video-sender"));
        wait_for_snapshot_len(&alive, 0).await;
        let verdict = ShutdownWatchdog::new(Duration::from_millis(200), alive, bus)
            .settle()
            .await;
        assert_eq!(verdict, Disposition::Clean);
    }
}
