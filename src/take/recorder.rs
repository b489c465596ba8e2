use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{info, warn};

use super::pending::PendingSlot;
use crate::audio::{AudioClip, AudioFrame, CaptureConfig, DeviceGate, StreamHandle};
use crate::error::StudioError;

/// Where the recorder is in its capture loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderStatus {
    Idle,
    Requesting,
    Recording,
}

/// One live capture: the owned stream plus the tasks serving it.
///
/// Release actions are registered at acquisition: dropping this aborts both
/// tasks, and the normal stop path releases the stream handle first.
struct ActiveCapture {
    stream: Option<StreamHandle>,
    capture_task: JoinHandle<()>,
    ticker_abort: AbortHandle,
    stop_requested: Arc<AtomicBool>,
}

impl Drop for ActiveCapture {
    fn drop(&mut self) {
        self.capture_task.abort();
        self.ticker_abort.abort();
    }
}

/// Owns the active capture session: start/stop, elapsed-time ticking, and
/// assembly of captured audio into a single buffer handed to the pending
/// slot.
///
/// State machine: `idle → requesting → recording → idle`, looping. A failed
/// device acquisition simply returns to idle; the contributor retries
/// manually.
pub struct TakeRecorder {
    session_id: String,
    gate: DeviceGate,
    config: CaptureConfig,
    pending: PendingSlot,
    status: Arc<Mutex<RecorderStatus>>,
    elapsed_secs: Arc<AtomicU64>,
    /// Latched on denial; stays visible until a later request is granted.
    denied: Arc<AtomicBool>,
    /// Set when the device went away mid-take (informational only).
    interrupted: Arc<AtomicBool>,
    active: Option<ActiveCapture>,
}

impl TakeRecorder {
    pub fn new(session_id: String, gate: DeviceGate, config: CaptureConfig, pending: PendingSlot) -> Self {
        Self {
            session_id,
            gate,
            config,
            pending,
            status: Arc::new(Mutex::new(RecorderStatus::Idle)),
            elapsed_secs: Arc::new(AtomicU64::new(0)),
            denied: Arc::new(AtomicBool::new(false)),
            interrupted: Arc::new(AtomicBool::new(false)),
            active: None,
        }
    }

    /// True if this environment can capture at all.
    pub fn check_support(&self) -> bool {
        self.gate.check_support()
    }

    pub async fn status(&self) -> RecorderStatus {
        *self.status.lock().await
    }

    pub async fn is_recording(&self) -> bool {
        self.status().await == RecorderStatus::Recording
    }

    /// Seconds captured so far in the active take.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs.load(Ordering::SeqCst)
    }

    /// Whether the last access request was refused. Not auto-cleared.
    pub fn denied(&self) -> bool {
        self.denied.load(Ordering::SeqCst)
    }

    /// Whether the last take ended because the device went away.
    pub fn interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// The persistent notice for the capture surface, if any.
    pub fn last_error(&self) -> Option<StudioError> {
        if self.denied() {
            Some(StudioError::PermissionDenied)
        } else if self.interrupted() {
            Some(StudioError::CaptureInterrupted)
        } else {
            None
        }
    }

    /// Request device access and begin a new take.
    ///
    /// Suspends through the permission prompt. On denial the recorder is
    /// back at idle with the denial latched and nothing held. Any previous
    /// unconfirmed take is discarded before the new capture session opens.
    pub async fn start(&mut self) -> Result<(), StudioError> {
        {
            let mut status = self.status.lock().await;
            match *status {
                RecorderStatus::Idle => *status = RecorderStatus::Requesting,
                other => {
                    warn!("start ignored: recorder is {:?}", other);
                    return Ok(());
                }
            }
        }

        // An interrupted take leaves its finished capture behind; reap it
        // so the stream handle is not held across two takes.
        self.reap_finished().await;

        let mut stream = match self.gate.request_access().await {
            Ok(stream) => stream,
            Err(e) => {
                *self.status.lock().await = RecorderStatus::Idle;
                if matches!(e, StudioError::PermissionDenied) {
                    self.denied.store(true, Ordering::SeqCst);
                }
                return Err(e);
            }
        };
        self.denied.store(false, Ordering::SeqCst);

        let frames = match stream.take_frames() {
            Some(frames) => frames,
            None => {
                stream.release().await;
                *self.status.lock().await = RecorderStatus::Idle;
                return Err(StudioError::UnsupportedEnvironment);
            }
        };

        // At most one unconfirmed buffer: the old pending take goes before
        // the new capture session begins.
        self.pending.discard().await;

        self.elapsed_secs.store(0, Ordering::SeqCst);
        self.interrupted.store(false, Ordering::SeqCst);
        *self.status.lock().await = RecorderStatus::Recording;

        let ticker = Self::spawn_ticker(Arc::clone(&self.elapsed_secs));
        let ticker_abort = ticker.abort_handle();
        let stop_requested = Arc::new(AtomicBool::new(false));

        let capture_task = tokio::spawn(Self::capture_loop(CaptureLoop {
            frames,
            ticker,
            stop_requested: Arc::clone(&stop_requested),
            pending: self.pending.clone(),
            status: Arc::clone(&self.status),
            elapsed_secs: Arc::clone(&self.elapsed_secs),
            interrupted: Arc::clone(&self.interrupted),
            config: self.config.clone(),
            session_id: self.session_id.clone(),
        }));

        self.active = Some(ActiveCapture {
            stream: Some(stream),
            capture_task,
            ticker_abort,
            stop_requested,
        });

        info!("recording started [{}]", self.session_id);
        Ok(())
    }

    /// Stop the active take.
    ///
    /// Always succeeds: releases the input stream (device indicator off),
    /// then waits for finalization, which hands whatever was captured to
    /// the pending slot. A no-op when nothing is recording.
    pub async fn stop(&mut self) {
        let Some(mut active) = self.active.take() else {
            warn!("stop ignored: not recording");
            return;
        };

        active.stop_requested.store(true, Ordering::SeqCst);
        if let Some(stream) = active.stream.take() {
            stream.release().await;
        }
        if let Err(e) = (&mut active.capture_task).await {
            if !e.is_cancelled() {
                warn!("capture task failed: {}", e);
            }
        }
    }

    /// Abandon any leftover capture whose loop already finished on its own
    /// (device loss finalizes without a stop call).
    async fn reap_finished(&mut self) {
        if self.active.as_ref().is_some_and(|a| a.capture_task.is_finished()) {
            if let Some(mut active) = self.active.take() {
                if let Some(stream) = active.stream.take() {
                    stream.release().await;
                }
            }
        }
    }

    fn spawn_ticker(elapsed: Arc<AtomicU64>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut tick = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                tick.tick().await;
                elapsed.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    /// Drain frames until the channel closes, then finalize.
    ///
    /// Finalization lives on this task's exit path so that every way the
    /// channel can close — explicit stop or the device going away — ends
    /// with the tick cancelled and a pending take installed.
    async fn capture_loop(ctx: CaptureLoop) {
        let CaptureLoop {
            mut frames,
            ticker,
            stop_requested,
            pending,
            status,
            elapsed_secs,
            interrupted,
            config,
            session_id,
        } = ctx;

        let mut chunks: Vec<AudioFrame> = Vec::new();
        while let Some(frame) = frames.recv().await {
            chunks.push(frame);
        }

        ticker.abort();

        if !stop_requested.load(Ordering::SeqCst) {
            interrupted.store(true, Ordering::SeqCst);
            warn!("capture interrupted, finalizing partial take [{}]", session_id);
        }

        let clip = Arc::new(AudioClip::from_frames(
            &chunks,
            config.target_sample_rate,
            config.target_channels,
        ));
        let duration_secs = elapsed_secs.load(Ordering::SeqCst);

        info!(
            "take finalized: {}s, {} samples [{}]",
            duration_secs,
            clip.sample_count(),
            session_id
        );

        pending.install(clip, duration_secs).await;
        *status.lock().await = RecorderStatus::Idle;
    }
}

/// Everything the capture loop needs, owned for the life of one take.
struct CaptureLoop {
    frames: mpsc::Receiver<AudioFrame>,
    ticker: JoinHandle<()>,
    stop_requested: Arc<AtomicBool>,
    pending: PendingSlot,
    status: Arc<Mutex<RecorderStatus>>,
    elapsed_secs: Arc<AtomicU64>,
    interrupted: Arc<AtomicBool>,
    config: CaptureConfig,
    session_id: String,
}
