pub mod audio;
pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod take;

pub use audio::{
    AudioClip, AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource,
    DeviceGate, ScriptedCapture, StreamHandle,
};
pub use config::Config;
pub use error::StudioError;
pub use session::{format_duration, SessionConfig, StudioSession, StudioStats};
pub use store::{
    export_file, export_filename, ExportFile, PlaybackChange, PlaybackManager, PlaybackSink,
    RecordingStore, RecordingSummary, SavedRecording,
};
pub use take::{
    Category, Dialect, Language, Metadata, MetadataPatch, PendingSlot, PendingView,
    RecorderStatus, TakeRecorder, PROMPT_PHRASES,
};
