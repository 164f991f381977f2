//! # Read-only service status surface.
//!
//! The status/display collaborator (an OLED IP panel on the vehicle)
//! polls, never commands: the controller publishes
//! [`ServiceStatus`] snapshots into a `tokio::sync::watch` channel and
//! consumers borrow the latest value whenever they refresh.

use std::net::SocketAddr;

/// The controller's current phase. Exactly one state is active at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// No workers launched; start is legal.
    Stopped,
    /// The fixed worker set is launched.
    Running,
    /// Cancellation signal set; waiting for workers to join.
    Stopping,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Lifecycle::Stopped => "stopped",
            Lifecycle::Running => "running",
            Lifecycle::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

/// Snapshot handed to read-only pollers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceStatus {
    /// Current lifecycle phase.
    pub lifecycle: Lifecycle,
    /// Address the command endpoint is bound to, when known.
    pub addr: Option<SocketAddr>,
}

impl ServiceStatus {
    /// Initial snapshot before the first start.
    pub fn idle() -> Self {
        Self {
            lifecycle: Lifecycle::Stopped,
            addr: None,
        }
    }

    /// `true` while the worker set is launched.
    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }
}
