use thiserror::Error;

/// Error taxonomy for the recording studio core.
///
/// Only `UnsupportedEnvironment` and `PermissionDenied` are surfaced to the
/// contributor; the rest are either absorbed locally (validation, device
/// loss) or reported to the calling shell (`NotFound`).
#[derive(Debug, Error)]
pub enum StudioError {
    /// The environment exposes no capture API; fatal for this feature only.
    #[error("audio capture is not supported in this environment")]
    UnsupportedEnvironment,

    /// Microphone access refused or no device present. Never auto-retried.
    #[error("microphone access was denied")]
    PermissionDenied,

    /// The capture device went away mid-take. Treated as an implicit stop.
    #[error("capture device disconnected mid-take")]
    CaptureInterrupted,

    /// A metadata field was out of range or outside its closed enumeration.
    #[error("invalid metadata: {0}")]
    ValidationRejected(String),

    /// confirm()/preview was called with no pending take in the slot.
    #[error("no pending take")]
    NothingPending,

    /// The store has no recording with this id (e.g. a double delete).
    #[error("no recording with id {0}")]
    NotFound(u64),

    /// WAV encoding failed while building a clip or export payload.
    #[error("audio encoding failed: {0}")]
    Encode(#[from] hound::Error),
}
