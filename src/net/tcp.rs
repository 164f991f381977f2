//! # TCP implementation of the network collaborator.
//!
//! Two listeners — commands and media — plus a periodic telemetry loop.
//! Listeners are bound per cycle (inside each `serve_*` call), so a stop
//! releases the ports and the next start rebinds them. If an orphaned
//! generation still holds a port after a timed-out stop, the rebind fails
//! and surfaces as a worker fault rather than being absorbed.
//!
//! Every blocking point selects on the worker's cancellation token **and**
//! this service's own closer, which [`shutdown`](TcpNetworkService::shutdown)
//! fires to unblock parked accepts/reads.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::hal::{Camera, PowerMonitor};
use crate::net::{CommandSink, NetworkService};

/// Addresses and cadence for the TCP endpoint.
#[derive(Clone, Debug)]
pub struct TcpConfig {
    /// Command listener address.
    pub command_addr: SocketAddr,
    /// Media listener address.
    pub media_addr: SocketAddr,
    /// Interval between telemetry samples.
    pub telemetry_interval: Duration,
}

impl Default for TcpConfig {
    /// The vehicle's conventional ports: commands on 5000, media on 8000,
    /// telemetry every 3 s.
    fn default() -> Self {
        Self {
            command_addr: ([0, 0, 0, 0], 5000).into(),
            media_addr: ([0, 0, 0, 0], 8000).into(),
            telemetry_interval: Duration::from_secs(3),
        }
    }
}

/// TCP-backed [`NetworkService`].
pub struct TcpNetworkService {
    cfg: TcpConfig,
    sink: Arc<dyn CommandSink>,
    camera: Arc<dyn Camera>,
    power: Arc<dyn PowerMonitor>,
    closer: Notify,
    /// Write half of the most recent command client; telemetry lines go here.
    client: tokio::sync::Mutex<Option<OwnedWriteHalf>>,
    bound: Mutex<Option<SocketAddr>>,
}

impl TcpNetworkService {
    /// Creates the service; listeners are bound lazily, per serve call.
    pub fn new(
        cfg: TcpConfig,
        sink: Arc<dyn CommandSink>,
        camera: Arc<dyn Camera>,
        power: Arc<dyn PowerMonitor>,
    ) -> Self {
        Self {
            cfg,
            sink,
            camera,
            power,
            closer: Notify::new(),
            client: tokio::sync::Mutex::new(None),
            bound: Mutex::new(None),
        }
    }

    /// Accepts one connection, or reports why the worker should exit.
    async fn accept(
        &self,
        listener: &TcpListener,
        ctx: &CancellationToken,
    ) -> Result<TcpStream, WorkerError> {
        tokio::select! {
            _ = ctx.cancelled() => Err(WorkerError::Canceled),
            _ = self.closer.notified() => Err(WorkerError::Canceled),
            res = listener.accept() => {
                let (stream, _peer) = res?;
                Ok(stream)
            }
        }
    }
}

#[async_trait]
impl NetworkService for TcpNetworkService {
    async fn serve_commands(&self, ctx: CancellationToken) -> Result<(), WorkerError> {
        let listener = TcpListener::bind(self.cfg.command_addr).await?;
        if let Ok(mut g) = self.bound.lock() {
            *g = listener.local_addr().ok();
        }

        loop {
            let stream = self.accept(&listener, &ctx).await?;
            let (read_half, write_half) = stream.into_split();
            *self.client.lock().await = Some(write_half);

            let mut lines = BufReader::new(read_half).lines();
            loop {
                tokio::select! {
                    _ = ctx.cancelled() => return Err(WorkerError::Canceled),
                    _ = self.closer.notified() => return Err(WorkerError::Canceled),
                    line = lines.next_line() => match line {
                        Ok(Some(cmd)) => self.sink.dispatch(cmd.trim()),
                        // Disconnect or connection reset: accept the next client.
                        Ok(None) | Err(_) => break,
                    },
                }
            }
            self.client.lock().await.take();
        }
    }

    async fn serve_media(&self, ctx: CancellationToken) -> Result<(), WorkerError> {
        let listener = TcpListener::bind(self.cfg.media_addr).await?;

        loop {
            let mut stream = self.accept(&listener, &ctx).await?;

            loop {
                let frame = tokio::select! {
                    _ = ctx.cancelled() => return Err(WorkerError::Canceled),
                    _ = self.closer.notified() => return Err(WorkerError::Canceled),
                    frame = self.camera.capture() => frame?,
                };
                let header = (frame.len() as u32).to_be_bytes();
                if stream.write_all(&header).await.is_err()
                    || stream.write_all(&frame).await.is_err()
                {
                    // Viewer went away; wait for the next one.
                    break;
                }
            }
        }
    }

    async fn report_telemetry(&self, ctx: CancellationToken) -> Result<(), WorkerError> {
        let mut tick = interval(self.cfg.telemetry_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Err(WorkerError::Canceled),
                _ = self.closer.notified() => return Err(WorkerError::Canceled),
                _ = tick.tick() => {}
            }

            let volts = self.power.read_voltage();
            let mut client = self.client.lock().await;
            if let Some(w) = client.as_mut() {
                let line = format!("POWER#{volts:.2}\n");
                if w.write_all(line.as_bytes()).await.is_err() {
                    client.take();
                }
            }
        }
    }

    async fn shutdown(&self) {
        self.closer.notify_waiters();
        self.client.lock().await.take();
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.bound.lock().ok().and_then(|g| *g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::{SimPowerMonitor, TestPatternCamera};
    use std::sync::Mutex as StdMutex;

    use tokio::io::AsyncReadExt;

    struct Recording {
        lines: StdMutex<Vec<String>>,
    }

    impl Recording {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                lines: StdMutex::new(Vec::new()),
            })
        }
        fn seen(&self) -> Vec<String> {
            self.lines.lock().map(|g| g.clone()).unwrap_or_default()
        }
    }

    impl CommandSink for Recording {
        fn dispatch(&self, line: &str) {
            if let Ok(mut g) = self.lines.lock() {
                g.push(line.to_string());
            }
        }
    }

    fn loopback() -> TcpConfig {
        TcpConfig {
            command_addr: ([127, 0, 0, 1], 0).into(),
            media_addr: ([127, 0, 0, 1], 0).into(),
            telemetry_interval: Duration::from_millis(50),
        }
    }

    fn service(sink: Arc<dyn CommandSink>) -> Arc<TcpNetworkService> {
        Arc::new(TcpNetworkService::new(
            loopback(),
            sink,
            Arc::new(TestPatternCamera),
            Arc::new(SimPowerMonitor),
        ))
    }

    async fn wait_for_addr(svc: &TcpNetworkService) -> SocketAddr {
        for _ in 0..100 {
            if let Some(addr) = svc.local_addr() {
                return addr;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("command listener never bound");
    }

    #[tokio::test]
    async fn command_lines_reach_the_sink_and_cancel_unblocks() {
        let sink = Recording::new();
        let svc = service(sink.clone());
        let ctx = CancellationToken::new();

        let serving = {
            let svc = Arc::clone(&svc);
            let ctx = ctx.clone();
            tokio::spawn(async move { svc.serve_commands(ctx).await })
        };

        let addr = wait_for_addr(&svc).await;
        let mut client = TcpStream::connect(addr).await.expect("connect");
        client.write_all(b"LED#ON\nHORN#1\n").await.expect("write");
        client.flush().await.expect("flush");

        for _ in 0..100 {
            if sink.seen().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(sink.seen(), vec!["LED#ON".to_string(), "HORN#1".to_string()]);

        ctx.cancel();
        let res = serving.await.expect("join");
        assert!(matches!(res, Err(WorkerError::Canceled)));
    }

    #[tokio::test]
    async fn shutdown_unblocks_a_parked_accept() {
        let sink = Recording::new();
        let svc = service(sink);
        let ctx = CancellationToken::new();

        let serving = {
            let svc = Arc::clone(&svc);
            let ctx = ctx.clone();
            tokio::spawn(async move { svc.serve_commands(ctx).await })
        };

        wait_for_addr(&svc).await;
        // Give the serve loop a beat to park in its accept select; the
        // closer only wakes waiters that are already registered.
        tokio::time::sleep(Duration::from_millis(50)).await;
        svc.shutdown().await;

        let res = tokio::time::timeout(Duration::from_secs(1), serving)
            .await
            .expect("accept stayed parked after shutdown")
            .expect("join");
        assert!(matches!(res, Err(WorkerError::Canceled)));
    }

    #[tokio::test]
    async fn media_clients_receive_length_prefixed_frames() {
        let ctx = CancellationToken::new();

        // The media listener binds inside serve_media on an ephemeral port;
        // reserve one up front so the test knows where to connect.
        let reserved = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind");
        let media_addr = reserved.local_addr().expect("addr");
        drop(reserved);

        let svc = Arc::new(TcpNetworkService::new(
            TcpConfig {
                media_addr,
                ..loopback()
            },
            Recording::new(),
            Arc::new(TestPatternCamera),
            Arc::new(SimPowerMonitor),
        ));

        let serving = {
            let svc = Arc::clone(&svc);
            let ctx = ctx.clone();
            tokio::spawn(async move { svc.serve_media(ctx).await })
        };

        let mut viewer = 'probe: {
            for _ in 0..100 {
                match TcpStream::connect(media_addr).await {
                    Ok(s) => break 'probe s,
                    Err(_) => tokio::time::sleep(Duration::from_millis(10)).await,
                }
            }
            panic!("media listener never came up");
        };

        let mut header = [0u8; 4];
        viewer.read_exact(&mut header).await.expect("frame header");
        let len = u32::from_be_bytes(header) as usize;
        assert_eq!(len, 256);
        let mut frame = vec![0u8; len];
        viewer.read_exact(&mut frame).await.expect("frame body");
        assert!(frame.iter().all(|b| *b == 0x55));

        ctx.cancel();
        let res = serving.await.expect("join");
        assert!(matches!(res, Err(WorkerError::Canceled)));
    }

    #[tokio::test]
    async fn telemetry_lines_reach_the_connected_command_client() {
        let sink = Recording::new();
        let svc = service(sink);
        let ctx = CancellationToken::new();

        let cmd_task = {
            let svc = Arc::clone(&svc);
            let ctx = ctx.clone();
            tokio::spawn(async move { svc.serve_commands(ctx).await })
        };
        let tele_task = {
            let svc = Arc::clone(&svc);
            let ctx = ctx.clone();
            tokio::spawn(async move { svc.report_telemetry(ctx).await })
        };

        let addr = wait_for_addr(&svc).await;
        let mut client = TcpStream::connect(addr).await.expect("connect");

        let mut buf = [0u8; 64];
        let n = tokio::time::timeout(Duration::from_secs(2), client.read(&mut buf))
            .await
            .expect("no telemetry within 2s")
            .expect("read");
        let line = String::from_utf8_lossy(&buf[..n]);
        assert!(line.starts_with("POWER#"), "got {line:?}");

        ctx.cancel();
        svc.shutdown().await;
        assert!(matches!(
            cmd_task.await.expect("join"),
            Err(WorkerError::Canceled)
        ));
        assert!(matches!(
            tele_task.await.expect("join"),
            Err(WorkerError::Canceled)
        ));
    }
}
