use crate::audio::{CaptureConfig, CaptureSource};

/// Configuration for one studio session (one page visit).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier, used for log correlation only
    pub session_id: String,

    /// Where capture input comes from
    pub source: CaptureSource,

    /// Capture parameters passed to the backend
    pub capture: CaptureConfig,
}

impl SessionConfig {
    /// A session reading the default microphone.
    pub fn microphone() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            source: CaptureSource::Microphone,
            capture: CaptureConfig::default(),
        }
    }

    /// A session driven by a prepared capture script.
    pub fn scripted(script: crate::audio::ScriptedCapture) -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            source: CaptureSource::Scripted(script),
            capture: CaptureConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::microphone()
    }
}
