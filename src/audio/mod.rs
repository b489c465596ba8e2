pub mod backend;
pub mod clip;
pub mod gate;
pub mod mic;
pub mod scripted;

pub use backend::{AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource};
pub use clip::{AudioClip, CLIP_FILE_EXT};
pub use gate::{DeviceGate, StreamHandle};
pub use scripted::{ScriptedBackend, ScriptedCapture};
