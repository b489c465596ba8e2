use chrono::{DateTime, Utc};
use tracing::info;

use super::config::SessionConfig;
use super::stats::StudioStats;
use crate::audio::DeviceGate;
use crate::error::StudioError;
use crate::store::{
    export_file, ExportFile, PlaybackChange, PlaybackManager, RecordingStore, RecordingSummary,
    SavedRecording,
};
use crate::take::{MetadataPatch, PendingSlot, PendingView, TakeRecorder};

/// One page visit's recording studio: gate → recorder → pending slot →
/// store → playback, wired together behind the operations the page shell
/// calls.
///
/// Nothing here survives the session; `teardown` releases every
/// outstanding resource.
pub struct StudioSession {
    config: SessionConfig,
    recorder: TakeRecorder,
    pending: PendingSlot,
    store: RecordingStore,
    playback: PlaybackManager,
    started_at: DateTime<Utc>,
}

impl StudioSession {
    pub fn new(config: SessionConfig) -> Self {
        let pending = PendingSlot::new();
        let gate = DeviceGate::new(config.source.clone(), config.capture.clone());
        let recorder = TakeRecorder::new(
            config.session_id.clone(),
            gate,
            config.capture.clone(),
            pending.clone(),
        );

        info!("studio session created: {}", config.session_id);

        Self {
            recorder,
            pending,
            store: RecordingStore::new(),
            playback: PlaybackManager::new(),
            started_at: Utc::now(),
            config,
        }
    }

    /// Same session with a custom playback sink implementation.
    pub fn with_playback(config: SessionConfig, playback: PlaybackManager) -> Self {
        let mut session = Self::new(config);
        session.playback = playback;
        session
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Capability check for the page shell: render the capture UI or an
    /// "unsupported environment" notice.
    pub fn is_supported(&self) -> bool {
        self.recorder.check_support()
    }

    // ------------------------------------------------------------------
    // Capture
    // ------------------------------------------------------------------

    /// Request device access and begin a new take. Any unconfirmed pending
    /// take is discarded first.
    pub async fn start_take(&mut self) -> Result<(), StudioError> {
        self.recorder.start().await
    }

    /// Stop the active take, releasing the device and handing whatever was
    /// captured to the pending slot. Always succeeds.
    pub async fn stop_take(&mut self) {
        self.recorder.stop().await
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.recorder.elapsed_secs()
    }

    /// Whether the last access request was refused. Latched until a retry
    /// is granted.
    pub fn permission_denied(&self) -> bool {
        self.recorder.denied()
    }

    // ------------------------------------------------------------------
    // Pending take
    // ------------------------------------------------------------------

    pub async fn pending(&self) -> Option<PendingView> {
        self.pending.snapshot().await
    }

    /// Apply one metadata form edit to the pending draft.
    pub async fn update_draft(&self, patch: MetadataPatch) {
        self.pending.update_draft(patch).await
    }

    pub async fn preview_take(&self) -> Result<(), StudioError> {
        self.pending.start_preview().await
    }

    pub async fn stop_preview(&self) {
        self.pending.stop_preview().await
    }

    /// Save the pending take: moves its buffer and metadata snapshot into
    /// the store and returns the new recording's id.
    pub async fn confirm_take(&mut self) -> Result<u64, StudioError> {
        let take = self.pending.confirm().await?;
        Ok(self.store.add(take.clip, take.duration_secs, take.metadata))
    }

    /// Throw the pending take away. Safe to call when nothing is pending.
    pub async fn discard_take(&self) {
        self.pending.discard().await
    }

    // ------------------------------------------------------------------
    // Saved recordings
    // ------------------------------------------------------------------

    /// Saved recordings, newest first.
    pub fn recordings(&self) -> &[SavedRecording] {
        self.store.list()
    }

    pub fn summaries(&self) -> Vec<RecordingSummary> {
        self.store.summaries()
    }

    /// Play, resume or pause one recording; at most one plays at a time.
    pub async fn toggle_play(&self, id: u64) -> Result<PlaybackChange, StudioError> {
        let recording = self.store.get(id).ok_or(StudioError::NotFound(id))?;
        self.playback.toggle(id, &recording.clip).await
    }

    pub async fn playing_id(&self) -> Option<u64> {
        self.playback.active_id().await
    }

    /// Delete a recording irreversibly: stops its playback, releases its
    /// handle and removes it from the list.
    pub async fn delete_recording(&mut self, id: u64) -> Result<(), StudioError> {
        if self.store.get(id).is_none() {
            return Err(StudioError::NotFound(id));
        }
        self.playback.release(id).await;
        self.store.remove(id)?;
        Ok(())
    }

    /// Build the downloadable file for one recording. No state change.
    pub fn export_recording(&self, id: u64) -> Result<ExportFile, StudioError> {
        let recording = self.store.get(id).ok_or(StudioError::NotFound(id))?;
        export_file(recording)
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    pub async fn stats(&self) -> StudioStats {
        StudioStats {
            session_id: self.config.session_id.clone(),
            started_at: self.started_at,
            recorder_status: self.recorder.status().await,
            elapsed_secs: self.recorder.elapsed_secs(),
            permission_denied: self.recorder.denied(),
            last_take_interrupted: self.recorder.interrupted(),
            pending_take: self.pending.is_occupied().await,
            saved_count: self.store.len(),
            playing_id: self.playback.active_id().await,
        }
    }

    /// Page-unload path: finalize and discard any in-flight take, release
    /// every playback handle, drop all stored recordings.
    pub async fn teardown(&mut self) {
        // stop() is a safe no-op when idle and also reaps a capture that
        // ended on its own (device loss), so it runs unconditionally.
        self.recorder.stop().await;
        self.pending.discard().await;
        self.playback.shutdown().await;
        self.store.clear();
        info!("studio session torn down: {}", self.config.session_id);
    }
}
