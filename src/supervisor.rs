//! Outer supervisor: starts the arbiter, stats register,
//! upstream/downstream engines, and reporter, then waits on a shutdown
//! signal. Shutdown is a plain `Arc<AtomicBool>` + `Notify` pair rather
//! than a broadcast channel: there is exactly one shutdown source
//! (process signals) and exactly one waiter.

use crate::arbiter::ConcentratorArbiter;
use crate::config::Config;
use crate::downstream::DownstreamEngine;
use crate::hal::Hal;
use crate::reporter::Reporter;
use crate::stats::StatsRegister;
use crate::upstream::UpstreamEngine;
use slog::{info, Logger};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Clean,
    Fast,
}

/// Runs the core until a shutdown signal is observed. Returns the process
/// exit code specifies: `0` on clean shutdown, non-zero on a
/// fatal startup error.
pub async fn run(hal: Box<dyn Hal>, config: Config, logger: Logger, shutdown: ShutdownSignal) -> i32 {
    let mut hal = hal;
    if let Err(e) = hal.start() {
        slog::error!(logger, "failed to start concentrator"; "error" => %e);
        return 1;
    }

    let arbiter = ConcentratorArbiter::new(hal);
    let stats = Arc::new(StatsRegister::new());

    let up_addr = (config.server_address.as_str(), config.serv_port_up);
    let down_addr = (config.server_address.as_str(), config.serv_port_down);

    let up_socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(s) => s,
        Err(e) => {
            slog::error!(logger, "failed to bind upstream socket"; "error" => %e);
            return 1;
        }
    };
    if let Err(e) = up_socket.connect(up_addr).await {
        slog::error!(logger, "failed to resolve server_address (upstream)"; "error" => %e);
        return 1;
    }

    let down_socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(s) => s,
        Err(e) => {
            slog::error!(logger, "failed to bind downstream socket"; "error" => %e);
            return 1;
        }
    };
    if let Err(e) = down_socket.connect(down_addr).await {
        slog::error!(logger, "failed to resolve server_address (downstream)"; "error" => %e);
        return 1;
    }

    let should_exit = Arc::new(AtomicBool::new(false));

    let upstream = UpstreamEngine::new(arbiter.clone(), stats.clone(), up_socket, &config, logger.clone());
    let downstream = DownstreamEngine::new(arbiter.clone(), stats.clone(), down_socket, &config, logger.clone());
    let reporter = Reporter::new(stats.clone(), config.stat_interval_s, logger.clone());

    let upstream_exit = should_exit.clone();
    let downstream_exit = should_exit.clone();
    let reporter_exit = should_exit.clone();

    let upstream_task = tokio::spawn(async move { upstream.run(upstream_exit).await });
    let downstream_task = tokio::spawn(async move { downstream.run(downstream_exit).await });
    let reporter_task = tokio::spawn(async move { reporter.run(reporter_exit).await });

    let reason = shutdown.wait().await;
    should_exit.store(true, Ordering::Relaxed);

    match reason {
        ExitReason::Clean => {
            // Bounded-time drain of the upstream thread; the
            // downstream thread is force-cancelled since it may be parked
            // in a long recv.
            let _ = upstream_task.await;
            downstream_task.abort();
            reporter_task.abort();
        }
        ExitReason::Fast => {
            upstream_task.abort();
            downstream_task.abort();
            reporter_task.abort();
        }
    }

    if let Err(e) = arbiter.stop().await {
        slog::warn!(logger, "error stopping concentrator"; "error" => %e);
    }
    info!(logger, "shutdown complete");
    0
}

/// The external shutdown signal the core accepts.
pub struct ShutdownSignal {
    notify: Arc<tokio::sync::Notify>,
    reason: Arc<std::sync::Mutex<ExitReason>>,
}

impl ShutdownSignal {
    pub fn new() -> (Self, ShutdownTrigger) {
        let notify = Arc::new(tokio::sync::Notify::new());
        let reason = Arc::new(std::sync::Mutex::new(ExitReason::Clean));
        (
            ShutdownSignal {
                notify: notify.clone(),
                reason: reason.clone(),
            },
            ShutdownTrigger { notify, reason },
        )
    }

    async fn wait(self) -> ExitReason {
        self.notify.notified().await;
        *self.reason.lock().expect("shutdown reason mutex poisoned")
    }
}

#[derive(Clone)]
pub struct ShutdownTrigger {
    notify: Arc<tokio::sync::Notify>,
    reason: Arc<std::sync::Mutex<ExitReason>>,
}

impl ShutdownTrigger {
    pub fn trigger(&self, reason: ExitReason) {
        *self.reason.lock().expect("shutdown reason mutex poisoned") = reason;
        self.notify.notify_waiters();
    }
}

/// Installs SIGINT/SIGTERM (clean) and SIGQUIT (fast) handlers, firing the
/// trigger exactly once.
#[cfg(unix)]
pub async fn watch_os_signals(trigger: ShutdownTrigger) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigquit = signal(SignalKind::quit()).expect("failed to install SIGQUIT handler");

    tokio::select! {
        _ = sigint.recv() => trigger.trigger(ExitReason::Clean),
        _ = sigterm.recv() => trigger.trigger(ExitReason::Clean),
        _ = sigquit.recv() => trigger.trigger(ExitReason::Fast),
    }
}
