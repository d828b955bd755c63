//! Refresh loop
//!
//! One tick polls both data sources, draws the resulting frame and then waits
//! for the next tick in short slices so that shutdown is honoured promptly.

use crate::config::RunMode;
use crate::render::Renderer;
use chrono::Utc;
use olmon_adapter_gpu::TelemetrySource;
use olmon_core::{Frame, ModelService, ServicePoll};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Granularity of every cancellable wait
pub const WAIT_SLICE: Duration = Duration::from_millis(100);

/// Cooperative cancellation token shared by the loop and the signal listener
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Spawn a task that requests shutdown on SIGINT or SIGTERM
    pub fn listen_for_signals(&self) {
        let flag = self.clone();
        tokio::spawn(async move {
            wait_for_termination().await;
            flag.request();
        });
    }
}

#[cfg(unix)]
async fn wait_for_termination() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
            }
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            debug!("Received SIGTERM");
        }
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => debug!("Received SIGINT"),
                Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => debug!("Received Ctrl+C"),
        Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
    }
}

/// Sleep for `duration` in [`WAIT_SLICE`] steps
///
/// Returns `true` if shutdown was requested before the full duration elapsed.
pub async fn wait_sliced(duration: Duration, shutdown: &ShutdownFlag) -> bool {
    let mut remaining = duration;
    while !remaining.is_zero() {
        if shutdown.is_requested() {
            return true;
        }
        let slice = remaining.min(WAIT_SLICE);
        sleep(slice).await;
        remaining -= slice;
    }
    shutdown.is_requested()
}

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Polling,
    Rendering,
    Waiting,
    Stopped,
}

/// Outcome of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed poll and draw passes, counted against the run limit
    pub iterations: u64,
    /// Passes whose frame reached the output
    pub frames: u64,
    /// The run ended because shutdown was requested
    pub cancelled: bool,
}

/// Poll, render, wait, repeat
pub struct RefreshLoop<S, W> {
    telemetry: TelemetrySource,
    service: S,
    renderer: Renderer,
    out: W,
    run_mode: RunMode,
    interval: Duration,
    shutdown: ShutdownFlag,
    state: LoopState,
}

impl<S: ModelService, W: Write> RefreshLoop<S, W> {
    pub fn new(
        telemetry: TelemetrySource,
        service: S,
        renderer: Renderer,
        out: W,
        run_mode: RunMode,
        interval: Duration,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            telemetry,
            service,
            renderer,
            out,
            run_mode,
            interval,
            shutdown,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Run until the iteration limit is reached, shutdown is requested or
    /// the output goes away. Releases the telemetry backend on return.
    pub async fn run(&mut self) -> RunSummary {
        let limit = self.run_mode.limit();
        let mut summary = RunSummary::default();

        info!(
            "Refresh loop starting: mode={:?}, interval={:?}, telemetry={}",
            self.run_mode,
            self.interval,
            self.telemetry.backend_name()
        );

        loop {
            if self.shutdown.is_requested() {
                summary.cancelled = true;
                break;
            }

            self.state = LoopState::Polling;
            let frame = self.poll().await;

            if self.shutdown.is_requested() {
                summary.cancelled = true;
                break;
            }

            self.state = LoopState::Rendering;
            match self.renderer.draw(&mut self.out, &frame, Utc::now()) {
                Ok(()) => summary.frames += 1,
                Err(e) => {
                    let err = olmon_core::Error::from(e);
                    if err.is_broken_pipe() {
                        debug!("Output closed, stopping: {}", err);
                        break;
                    }
                    warn!("Failed to draw frame ({}): {}", err.category(), err);
                }
            }
            summary.iterations += 1;

            if limit.is_some_and(|n| summary.iterations >= n) {
                break;
            }

            self.state = LoopState::Waiting;
            if wait_sliced(self.interval, &self.shutdown).await {
                summary.cancelled = true;
                break;
            }
        }

        self.state = LoopState::Stopped;
        self.telemetry.close();
        info!(
            "Refresh loop stopped after {} pass(es), {} frame(s) drawn, cancelled={}",
            summary.iterations, summary.frames, summary.cancelled
        );
        summary
    }

    async fn poll(&mut self) -> Frame {
        let devices = self.telemetry.snapshot();
        let ServicePoll { status, catalog } = self.service.poll().await;
        debug!(
            "Tick: {} device(s), service {}, {} installed",
            devices.len(),
            status,
            catalog.len()
        );
        Frame::capture(devices, status, catalog)
    }
}
