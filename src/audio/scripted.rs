use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::backend::{AudioFrame, CaptureBackend, CaptureConfig};

/// A capture script: frames to replay and how the "device" behaves.
///
/// Stands in for real hardware in tests, demos and `--synthetic` CLI runs,
/// including the two failure modes the recorder has to survive: a refused
/// permission prompt and a device that detaches mid-take.
#[derive(Debug, Clone)]
pub struct ScriptedCapture {
    /// Whether the simulated permission prompt is granted
    pub grant_access: bool,
    /// Frames replayed in order once capture starts
    pub frames: Vec<AudioFrame>,
    /// Delay between consecutive frames
    pub frame_interval: Duration,
    /// Detach the device (close the frame channel) after this many frames
    pub disconnect_after: Option<usize>,
}

impl ScriptedCapture {
    /// A granted script that replays the given frames at 100ms pace.
    pub fn granted(frames: Vec<AudioFrame>) -> Self {
        Self {
            grant_access: true,
            frames,
            frame_interval: Duration::from_millis(100),
            disconnect_after: None,
        }
    }

    /// A script whose permission prompt is refused.
    pub fn denied() -> Self {
        Self {
            grant_access: false,
            frames: Vec::new(),
            frame_interval: Duration::from_millis(100),
            disconnect_after: None,
        }
    }

    /// A granted script carrying `total` worth of a 440 Hz tone, framed at
    /// the configured buffer duration. Used by the synthetic CLI path.
    pub fn tone(total: Duration, config: &CaptureConfig) -> Self {
        let frame_ms = config.buffer_duration_ms.max(1);
        let samples_per_frame =
            (config.target_sample_rate as u64 * frame_ms / 1000) as usize * config.target_channels as usize;
        let frame_count = (total.as_millis() as u64 / frame_ms) as usize;

        let mut frames = Vec::with_capacity(frame_count);
        for i in 0..frame_count {
            let base = i * samples_per_frame;
            let samples = (0..samples_per_frame)
                .map(|j| {
                    let t = (base + j) as f32 / config.target_sample_rate as f32;
                    ((t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 8000.0) as i16
                })
                .collect();
            frames.push(AudioFrame {
                samples,
                sample_rate: config.target_sample_rate,
                channels: config.target_channels,
                timestamp_ms: i as u64 * frame_ms,
            });
        }

        Self {
            grant_access: true,
            frames,
            frame_interval: Duration::from_millis(frame_ms),
            disconnect_after: None,
        }
    }
}

/// Capture backend that replays a [`ScriptedCapture`].
pub struct ScriptedBackend {
    script: ScriptedCapture,
    capturing: Arc<AtomicBool>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ScriptedBackend {
    pub fn new(script: ScriptedCapture) -> Self {
        Self {
            script,
            capturing: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ScriptedBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let (tx, rx) = mpsc::channel(100);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        self.stop_tx = Some(stop_tx);
        self.capturing.store(true, Ordering::SeqCst);

        let script = self.script.clone();
        let capturing = Arc::clone(&self.capturing);

        self.task = Some(tokio::spawn(async move {
            let mut sent = 0usize;

            for frame in script.frames {
                if script.disconnect_after.is_some_and(|n| sent >= n) {
                    break;
                }

                tokio::select! {
                    _ = &mut stop_rx => {
                        capturing.store(false, Ordering::SeqCst);
                        return;
                    }
                    _ = tokio::time::sleep(script.frame_interval) => {}
                }

                if tx.send(frame).await.is_err() {
                    break;
                }
                sent += 1;
            }

            if script.disconnect_after.is_some() {
                // Simulated device detach: the channel closes with capture
                // still nominally active.
                warn!("scripted capture device detached after {} frames", sent);
            } else {
                // Frames exhausted but the device stays attached (silence)
                // until the recorder releases it.
                let _ = stop_rx.await;
            }
            capturing.store(false, Ordering::SeqCst);
        }));

        info!("scripted capture started");
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.capturing.store(false, Ordering::SeqCst);
        info!("scripted capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
