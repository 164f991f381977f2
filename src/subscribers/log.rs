//! # LogWriter — the durable lifecycle journal.
//!
//! A subscriber that appends one timestamped line per [`Event`] to a file
//! (or stdout). Every fault and lifecycle transition goes through here, so
//! the journal is the record an operator reads after the fact.
//!
//! ## Example output
//! ```text
//! 2026-08-06 14:03:21.412 [service-starting]
//! 2026-08-06 14:03:21.413 [worker-starting] worker="command-reader"
//! 2026-08-06 14:03:54.002 [worker-faulted] worker="telemetry-reporter" reason="adc read failed" iterations=11
//! 2026-08-06 14:05:10.870 [service-stopped]
//! 2026-08-06 14:05:10.991 [all-stopped-within-grace]
//! ```

use std::fs::OpenOptions;
use std::io::{LineWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Appends lifecycle events to a durable journal.
pub struct LogWriter {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl LogWriter {
    /// Journals to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            sink: Mutex::new(Box::new(LineWriter::new(std::io::stdout()))),
        }
    }

    /// Journals to `path`, appending; the file is created if absent.
    pub fn file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            sink: Mutex::new(Box::new(LineWriter::new(file))),
        })
    }

    fn render(e: &Event) -> String {
        let ts: DateTime<Local> = e.at.into();
        let mut line = format!(
            "{} [{}]",
            ts.format("%Y-%m-%d %H:%M:%S%.3f"),
            e.kind.as_label()
        );
        if let Some(worker) = e.worker.as_deref() {
            line.push_str(&format!(" worker={worker:?}"));
        }
        if let Some(reason) = e.reason.as_deref() {
            line.push_str(&format!(" reason={reason:?}"));
        }
        if let Some(n) = e.iterations {
            line.push_str(&format!(" iterations={n}"));
        }
        line
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let line = Self::render(e);
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{line}");
            let _ = sink.flush();
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
