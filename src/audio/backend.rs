use anyhow::Result;
use tokio::sync::mpsc;

use super::scripted::{ScriptedBackend, ScriptedCapture};

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for a capture backend
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate
    pub target_sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub target_channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16000,
            target_channels: 1,
            buffer_duration_ms: 100,
        }
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - `MicBackend`: cpal default input device (all desktop platforms)
/// - `ScriptedBackend`: replays a prepared frame sequence (tests, demos)
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames. The channel
    /// closes when the backend is stopped or the device goes away.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio and release the device
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Where capture input comes from
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Default microphone via cpal
    Microphone,
    /// Prepared frame sequence (tests, demos, `--synthetic` CLI runs)
    Scripted(ScriptedCapture),
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    /// Create a capture backend for the given source
    pub fn create(source: CaptureSource, config: CaptureConfig) -> Result<Box<dyn CaptureBackend>> {
        match source {
            CaptureSource::Microphone => {
                use super::mic::MicBackend;
                Ok(Box::new(MicBackend::new(config)))
            }
            CaptureSource::Scripted(script) => Ok(Box::new(ScriptedBackend::new(script))),
        }
    }

    /// Whether the given source can capture at all in this environment.
    ///
    /// For the microphone this asks the host for a default input device;
    /// scripted sources are always available.
    pub fn supported(source: &CaptureSource) -> bool {
        match source {
            CaptureSource::Microphone => super::mic::MicBackend::device_available(),
            CaptureSource::Scripted(_) => true,
        }
    }
}
