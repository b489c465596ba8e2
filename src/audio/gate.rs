use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::backend::{AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource};
use crate::error::StudioError;

/// Checks environment capability and requests access to the capture device.
///
/// Owns no resources itself; on success it hands the caller an exclusively
/// owned [`StreamHandle`] which must be released when capture ends.
pub struct DeviceGate {
    source: CaptureSource,
    config: CaptureConfig,
}

impl DeviceGate {
    pub fn new(source: CaptureSource, config: CaptureConfig) -> Self {
        Self { source, config }
    }

    /// True if this environment can capture from the configured source.
    pub fn check_support(&self) -> bool {
        CaptureBackendFactory::supported(&self.source)
    }

    /// Ask for access to the capture device.
    ///
    /// Suspends until the device is acquired or refused. Exactly two
    /// outcomes: a live stream handle, or `PermissionDenied` with nothing
    /// held. Never retried automatically.
    pub async fn request_access(&self) -> Result<StreamHandle, StudioError> {
        if !self.check_support() {
            return Err(StudioError::UnsupportedEnvironment);
        }

        if let CaptureSource::Scripted(script) = &self.source {
            if !script.grant_access {
                info!("capture access denied by scripted prompt");
                return Err(StudioError::PermissionDenied);
            }
        }

        let mut backend = CaptureBackendFactory::create(self.source.clone(), self.config.clone())
            .map_err(|e| {
            warn!("failed to create capture backend: {}", e);
            StudioError::UnsupportedEnvironment
        })?;

        match backend.start().await {
            Ok(frames) => {
                info!("capture access granted via {} backend", backend.name());
                Ok(StreamHandle {
                    backend,
                    frames: Some(frames),
                })
            }
            Err(e) => {
                warn!("capture access refused: {}", e);
                Err(StudioError::PermissionDenied)
            }
        }
    }
}

/// Exclusively owned handle to a live input stream.
///
/// The frame receiver is taken once by the capture loop; releasing the
/// handle stops the backend and ends the device's activity indicator.
pub struct StreamHandle {
    backend: Box<dyn CaptureBackend>,
    frames: Option<mpsc::Receiver<AudioFrame>>,
}

impl StreamHandle {
    /// Take the frame receiver. Yields `None` on a second call.
    pub fn take_frames(&mut self) -> Option<mpsc::Receiver<AudioFrame>> {
        self.frames.take()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn is_capturing(&self) -> bool {
        self.backend.is_capturing()
    }

    /// Stop the backend and release the device.
    pub async fn release(mut self) {
        if let Err(e) = self.backend.stop().await {
            warn!("failed to stop capture backend: {}", e);
        }
    }
}
