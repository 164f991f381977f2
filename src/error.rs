//! Error types used by the roverd runtime and its workers.
//!
//! Two enums, split the same way the rest of the crate is:
//!
//! - [`RuntimeError`] — failures of the lifecycle machinery itself
//!   (a shutdown exceeding its grace bound, signal registration).
//! - [`WorkerError`] — the per-iteration result a worker task hands back to
//!   its supervisor. Faults are values, never unwinds: the supervisor
//!   inspects the variant to decide loop-continue vs. loop-exit.
//!
//! Both provide `as_label()` for stable snake_case identifiers in logs.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the lifecycle runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The stop grace period was exceeded; the listed workers were abandoned.
    #[error("stop grace {grace:?} exceeded; still running: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of workers that did not exit in time.
        stuck: Vec<String>,
    },

    /// OS signal handler registration failed.
    #[error("signal handler registration failed: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }
}

/// Per-iteration result of a worker task.
///
/// A worker returning `Ok(())` is re-invoked by its supervisor; `Canceled`
/// is a graceful exit; `Fault` ends that worker until the next Start/Restart
/// cycle.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker's iteration failed. The supervisor does not retry.
    #[error("worker fault: {error}")]
    Fault {
        /// The underlying failure message.
        error: String,
    },

    /// The worker observed the shared cancellation signal and exited.
    #[error("cancelled by shutdown")]
    Canceled,
}

impl WorkerError {
    /// Builds a [`WorkerError::Fault`] from any displayable cause.
    pub fn fault(error: impl std::fmt::Display) -> Self {
        WorkerError::Fault {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Fault { .. } => "worker_fault",
            WorkerError::Canceled => "worker_canceled",
        }
    }

    /// `true` for the graceful-cancellation variant.
    pub fn is_canceled(&self) -> bool {
        matches!(self, WorkerError::Canceled)
    }
}

impl From<std::io::Error> for WorkerError {
    fn from(e: std::io::Error) -> Self {
        WorkerError::fault(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let e = RuntimeError::GraceExceeded {
            grace: Duration::from_secs(3),
            stuck: vec!["video-sender".into()],
        };
        assert_eq!(e.as_label(), "runtime_grace_exceeded");
        assert_eq!(WorkerError::Canceled.as_label(), "worker_canceled");
        assert_eq!(WorkerError::fault("boom").as_label(), "worker_fault");
    }

    #[test]
    fn io_errors_become_faults() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let w: WorkerError = io.into();
        assert!(!w.is_canceled());
        assert!(w.to_string().contains("port taken"));
    }
}
