use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc;
use tracing::{error, info};

use super::backend::{AudioFrame, CaptureBackend, CaptureConfig};

/// Microphone capture via the cpal default input device.
///
/// cpal streams are not `Send`, so the stream lives on a dedicated thread
/// and frames are forwarded (lossily, if the consumer falls behind) into a
/// tokio channel.
pub struct MicBackend {
    config: CaptureConfig,
    capturing: Arc<AtomicBool>,
    stop_flag: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl MicBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            capturing: Arc::new(AtomicBool::new(false)),
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Whether the host exposes any input device at all.
    pub fn device_available() -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    fn run_stream(tx: mpsc::Sender<AudioFrame>, stop_flag: Arc<AtomicBool>, capturing: Arc<AtomicBool>) {
        let host = cpal::default_host();
        let device = match host.default_input_device() {
            Some(d) => d,
            None => {
                error!("no input device available");
                capturing.store(false, Ordering::SeqCst);
                return;
            }
        };

        info!("audio input device: {}", device.name().unwrap_or_default());

        let supported = match device.default_input_config() {
            Ok(c) => c,
            Err(e) => {
                error!("failed to query input config: {}", e);
                capturing.store(false, Ordering::SeqCst);
                return;
            }
        };

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        let stream_config: cpal::StreamConfig = supported.clone().into();
        let started = Instant::now();
        let err_fn = |err| error!("input stream error: {}", err);

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => {
                let tx = tx.clone();
                device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &_| {
                        let samples = data
                            .iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                            .collect();
                        forward(&tx, samples, sample_rate, channels, started);
                    },
                    err_fn,
                    None,
                )
            }
            cpal::SampleFormat::I16 => {
                let tx = tx.clone();
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &_| {
                        forward(&tx, data.to_vec(), sample_rate, channels, started);
                    },
                    err_fn,
                    None,
                )
            }
            other => {
                error!("unsupported sample format: {:?}", other);
                capturing.store(false, Ordering::SeqCst);
                return;
            }
        };

        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                error!("failed to build input stream: {}", e);
                capturing.store(false, Ordering::SeqCst);
                return;
            }
        };

        if let Err(e) = stream.play() {
            error!("failed to start input stream: {}", e);
            capturing.store(false, Ordering::SeqCst);
            return;
        }

        info!("microphone capture started: {}Hz, {} channels", sample_rate, channels);

        // Park until the recorder releases the device; dropping the stream
        // ends the hardware's activity indicator.
        while !stop_flag.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(50));
        }

        drop(stream);
        capturing.store(false, Ordering::SeqCst);
        info!("microphone capture stopped");
    }
}

/// Forward one callback buffer as a frame. Dropped if the consumer is behind.
fn forward(
    tx: &mpsc::Sender<AudioFrame>,
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
    started: Instant,
) {
    let _ = tx.try_send(AudioFrame {
        samples,
        sample_rate,
        channels,
        timestamp_ms: started.elapsed().as_millis() as u64,
    });
}

#[async_trait::async_trait]
impl CaptureBackend for MicBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if !Self::device_available() {
            anyhow::bail!("no input device available");
        }

        // Channel sized for ~10s of buffered frames at the configured pace.
        let capacity = (10_000 / self.config.buffer_duration_ms.max(1)).max(16) as usize;
        let (tx, rx) = mpsc::channel(capacity);

        self.stop_flag.store(false, Ordering::SeqCst);
        self.capturing.store(true, Ordering::SeqCst);

        let stop_flag = Arc::clone(&self.stop_flag);
        let capturing = Arc::clone(&self.capturing);
        self.thread = Some(
            thread::Builder::new()
                .name("mic-capture".into())
                .spawn(move || Self::run_stream(tx, stop_flag, capturing))
                .context("failed to spawn capture thread")?,
        );

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            tokio::task::spawn_blocking(move || {
                let _ = handle.join();
            })
            .await
            .context("capture thread join failed")?;
        }
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "microphone"
    }
}
