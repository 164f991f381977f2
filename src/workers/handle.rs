//! # Per-worker run-state handle.
//!
//! [`WorkerHandle`] is the controller's view of one launched worker: its
//! name plus an atomic [`RunState`]. The supervisor owns the transitions;
//! everyone else (controller, status pollers, tests) only reads. Handles
//! are created at start and discarded wholesale at the next start.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Terminal and non-terminal states of one worker's execution context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    /// Handle created, supervisor not yet running.
    Idle = 0,
    /// Supervisor loop is live.
    Running = 1,
    /// Loop ended gracefully (cancellation or clean completion).
    Exited = 2,
    /// A task iteration faulted; the worker is down until the next
    /// start/restart cycle.
    Faulted = 3,
}

impl RunState {
    fn from_u8(v: u8) -> RunState {
        match v {
            1 => RunState::Running,
            2 => RunState::Exited,
            3 => RunState::Faulted,
            _ => RunState::Idle,
        }
    }

    /// `true` for `Exited` and `Faulted`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Exited | RunState::Faulted)
    }
}

/// Shared, read-mostly view of one launched worker.
#[derive(Clone)]
pub struct WorkerHandle {
    name: Arc<str>,
    state: Arc<AtomicU8>,
}

impl WorkerHandle {
    /// Creates a handle in the `Idle` state.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(AtomicU8::new(RunState::Idle as u8)),
        }
    }

    /// The worker's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Records a state transition. Supervisor-only.
    pub(crate) fn transition(&self, next: RunState) {
        self.state.store(next as u8, Ordering::Release);
    }
}

impl std::fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_starts_idle_and_transitions() {
        let h = WorkerHandle::new("video-sender");
        assert_eq!(h.state(), RunState::Idle);
        assert!(!h.state().is_terminal());

        h.transition(RunState::Running);
        let view = h.clone();
        assert_eq!(view.state(), RunState::Running);

        h.transition(RunState::Faulted);
        assert_eq!(view.state(), RunState::Faulted);
        assert!(view.state().is_terminal());
    }
}
