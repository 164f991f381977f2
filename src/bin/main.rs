//! roverd service binary.
//!
//! Wires the TCP endpoint and (simulated) hardware collaborators into the
//! controller, runs it until a shutdown signal, and maps the final
//! disposition to the process exit status: 0 for a clean shutdown, 1 when
//! the watchdog had to force termination.
//!
//! Control surface:
//! - SIGINT / SIGTERM: clean stop, then exit
//! - SIGUSR1: stop workers, keep the process alive
//! - SIGUSR2: restart workers

use std::sync::Arc;
use std::time::Duration;

use roverd::hal::sim::{ConsoleChime, SimActuator, SimPowerMonitor, TestPatternCamera};
use roverd::net::{CommandSink, TcpConfig, TcpNetworkService};
use roverd::{Config, LogWriter, ServiceController, Subscribe};

const JOURNAL_PATH: &str = "/var/log/roverd.log";

/// Journals received command lines; payload parsing lives behind this seam.
struct JournalSink;

impl CommandSink for JournalSink {
    fn dispatch(&self, line: &str) {
        println!("command: {line}");
    }
}

fn journal() -> Arc<dyn Subscribe> {
    match LogWriter::file(JOURNAL_PATH) {
        Ok(w) => Arc::new(w),
        Err(e) => {
            eprintln!("cannot open {JOURNAL_PATH} ({e}); journaling to stdout");
            Arc::new(LogWriter::stdout())
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let net = Arc::new(TcpNetworkService::new(
        TcpConfig::default(),
        Arc::new(JournalSink),
        Arc::new(TestPatternCamera),
        Arc::new(SimPowerMonitor),
    ));

    let controller = Arc::new(ServiceController::new(
        Config::default(),
        net,
        Arc::new(SimActuator::new()),
        Arc::new(ConsoleChime),
        vec![journal()],
    ));

    // Read-only status consumer (the OLED panel's stand-in): polls, never
    // commands.
    {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(20));
            loop {
                tick.tick().await;
                let status = controller.status();
                match status.addr {
                    Some(addr) => println!("status: {} @ {addr}", status.lifecycle),
                    None => println!("status: {}", status.lifecycle),
                }
            }
        });
    }

    let disposition = controller.run().await?;
    disposition.terminate()
}
