//! # Tracker of currently running worker contexts.
//!
//! [`AliveTracker`] maintains an in-memory set of live worker names by
//! listening to [`EventKind::WorkerStarting`], [`EventKind::WorkerExited`],
//! and [`EventKind::WorkerFaulted`] events.
//!
//! The [`ShutdownWatchdog`](crate::ShutdownWatchdog) reads its snapshot to
//! decide whether any execution contexts besides the main one remain alive
//! after the bounded shutdown wait.
//!
//! ```text
//!  WorkerSupervisor ── publish(Event) ──► Bus ──► AliveTracker listener
//!       WorkerStarting → insert(name)
//!       WorkerExited / WorkerFaulted → remove(name)
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::events::{Event, EventKind};

/// Tracks which workers are currently alive.
///
/// Thread-safe and cloneable; clones share the same internal state.
#[derive(Clone)]
pub struct AliveTracker {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl AliveTracker {
    /// Creates a new, empty tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Spawns a background task that subscribes to events and updates the
    /// tracker until the bus is dropped.
    pub fn spawn_listener(&self, mut rx: tokio::sync::broadcast::Receiver<Event>) {
        let inner = self.inner.clone();

        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                match ev.kind {
                    EventKind::WorkerStarting => {
                        if let Some(name) = ev.worker.as_deref() {
                            inner.lock().await.insert(name.to_string());
                        }
                    }
                    EventKind::WorkerExited | EventKind::WorkerFaulted => {
                        if let Some(name) = ev.worker.as_deref() {
                            inner.lock().await.remove(name);
                        }
                    }
                    _ => {}
                }
            }
        });
    }

    /// Returns a snapshot of currently alive worker names.
    pub async fn snapshot(&self) -> Vec<String> {
        let g = self.inner.lock().await;
        g.iter().cloned().collect()
    }
}

impl Default for AliveTracker {
    fn default() -> Self {
        Self::new()
    }
}
