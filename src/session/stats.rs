use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::take::RecorderStatus;

/// Snapshot of a studio session for the page shell.
#[derive(Debug, Clone, Serialize)]
pub struct StudioStats {
    /// Session identifier
    pub session_id: String,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// Recorder state (idle / requesting / recording)
    pub recorder_status: RecorderStatus,

    /// Seconds captured so far in the active take
    pub elapsed_secs: u64,

    /// Whether the last access request was refused
    pub permission_denied: bool,

    /// Whether the last take ended because the device went away
    pub last_take_interrupted: bool,

    /// Whether a stopped take is awaiting confirm/discard
    pub pending_take: bool,

    /// Number of saved recordings
    pub saved_count: usize,

    /// Id of the recording currently playing, if any
    pub playing_id: Option<u64>,
}

/// Render seconds as `m:ss` for display surfaces.
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
