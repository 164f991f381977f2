//! # Global runtime configuration.
//!
//! [`Config`] centralizes the controller's timing knobs. It is consumed in
//! two places:
//! 1. **ServiceController**: `grace` bounds the worker join inside `stop()`.
//! 2. **ShutdownWatchdog**: `settle` bounds the final wait before the
//!    process is force-terminated.
//!
//! ## Field semantics
//! - `grace`: whole-cycle bound on joining the worker set during stop
//! - `settle`: watchdog's final window; exceeding it is fatal by design
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)

use std::time::Duration;

/// Runtime configuration for the service controller and watchdog.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time `stop()` waits for the current cycle's workers to join.
    ///
    /// When the bound elapses the stragglers are detached and
    /// `RuntimeError::GraceExceeded` is returned; the lifecycle still
    /// transitions to `Stopped` so a later start stays legal.
    pub grace: Duration,

    /// Final bound the watchdog allows after stop and cleanup.
    ///
    /// If any worker context is still alive once `settle` elapses, the
    /// disposition is `Forced` and the process exits non-clean.
    pub settle: Duration,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Subscribers lagging behind by more than this skip older events.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 3s` (cooperative workers exit well inside this)
    /// - `settle = 10s` (final watchdog window)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(3),
            settle: Duration::from_secs(10),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_capacity_is_clamped() {
        let mut cfg = Config::default();
        cfg.bus_capacity = 0;
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
