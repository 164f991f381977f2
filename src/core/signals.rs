//! # SignalRouter: external control signals → lifecycle requests.
//!
//! Maps the process-control surface onto [`ControlRequest`]s:
//!
//! | Signal            | Request   |
//! |-------------------|-----------|
//! | SIGINT / SIGTERM  | Shutdown  |
//! | SIGUSR1           | Stop      |
//! | SIGUSR2           | Restart   |
//!
//! `Ctrl-C` is awaited as a fallback and also maps to Shutdown. On non-Unix
//! platforms only `Ctrl-C` is available.
//!
//! The router never queues: the controller's run loop consumes one request
//! at a time, so a signal arriving while the identical operation is already
//! in progress lands on the lifecycle's no-op path. Shutdown always runs
//! and always ends with process termination, however the stop went.

use crate::error::RuntimeError;

/// A lifecycle request decoded from an external signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlRequest {
    /// Stop workers, keep the process alive.
    Stop,
    /// Stop workers, then immediately start them again.
    Restart,
    /// Clean stop, then terminate the process.
    Shutdown,
}

/// Decodes OS signals into [`ControlRequest`]s.
#[cfg(unix)]
pub struct SignalRouter {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
    sigusr1: tokio::signal::unix::Signal,
    sigusr2: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalRouter {
    /// Registers the signal handlers.
    ///
    /// Each router owns independent listeners; registration failures map to
    /// [`RuntimeError::Signal`].
    pub fn install() -> Result<Self, RuntimeError> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigusr1: signal(SignalKind::user_defined1())?,
            sigusr2: signal(SignalKind::user_defined2())?,
        })
    }

    /// Waits for the next control request.
    ///
    /// A closed signal stream is treated as a shutdown condition so the
    /// process can never end up deaf to its control surface.
    pub async fn recv(&mut self) -> ControlRequest {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => ControlRequest::Shutdown,
            _ = self.sigint.recv() => ControlRequest::Shutdown,
            _ = self.sigterm.recv() => ControlRequest::Shutdown,
            r = self.sigusr1.recv() => match r {
                Some(()) => ControlRequest::Stop,
                None => ControlRequest::Shutdown,
            },
            r = self.sigusr2.recv() => match r {
                Some(()) => ControlRequest::Restart,
                None => ControlRequest::Shutdown,
            },
        }
    }
}

/// Decodes OS signals into [`ControlRequest`]s.
///
/// Non-Unix platforms only surface `Ctrl-C`, which maps to Shutdown.
#[cfg(not(unix))]
pub struct SignalRouter;

#[cfg(not(unix))]
impl SignalRouter {
    /// Registers the signal handlers.
    pub fn install() -> Result<Self, RuntimeError> {
        Ok(Self)
    }

    /// Waits for the next control request.
    pub async fn recv(&mut self) -> ControlRequest {
        let _ = tokio::signal::ctrl_c().await;
        ControlRequest::Shutdown
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    // One test owns both user signals: raising them before the router is
    // installed would hit the default action and kill the test process.
    #[tokio::test]
    async fn user_signals_map_to_stop_and_restart() {
        let mut router = SignalRouter::install().expect("install router");

        unsafe {
            libc::kill(libc::getpid(), libc::SIGUSR1);
        }
        let req = tokio::time::timeout(std::time::Duration::from_secs(2), router.recv())
            .await
            .expect("no request for SIGUSR1");
        assert_eq!(req, ControlRequest::Stop);

        unsafe {
            libc::kill(libc::getpid(), libc::SIGUSR2);
        }
        let req = tokio::time::timeout(std::time::Duration::from_secs(2), router.recv())
            .await
            .expect("no request for SIGUSR2");
        assert_eq!(req, ControlRequest::Restart);
    }
}
