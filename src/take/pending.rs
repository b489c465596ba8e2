use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use super::metadata::{Metadata, MetadataPatch};
use crate::audio::AudioClip;
use crate::error::StudioError;
use crate::store::playback::{ClockSink, PlaybackSink};

/// A stopped, not-yet-confirmed take.
pub struct PendingTake {
    clip: Arc<AudioClip>,
    duration_secs: u64,
    draft: Metadata,
    /// Transient preview player; released on confirm and discard.
    preview: Option<Box<dyn PlaybackSink>>,
}

/// Read model of the pending take for the form surface.
#[derive(Clone)]
pub struct PendingView {
    pub clip: Arc<AudioClip>,
    pub duration_secs: u64,
    pub draft: Metadata,
}

/// What `confirm()` moves out of the slot.
pub struct ConfirmedTake {
    pub clip: Arc<AudioClip>,
    pub duration_secs: u64,
    pub metadata: Metadata,
}

/// Holds at most one unconfirmed take.
///
/// The single-occupancy invariant is a type-level fact: the slot is an
/// `Option<PendingTake>`, and `install` releases any previous occupant
/// before the new one goes in. Clones share the same slot; the capture
/// loop installs into it while the form surface edits it.
#[derive(Clone, Default)]
pub struct PendingSlot {
    inner: Arc<Mutex<Option<PendingTake>>>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a freshly stopped take into the slot, discarding any previous one.
    pub async fn install(&self, clip: Arc<AudioClip>, duration_secs: u64) {
        let mut slot = self.inner.lock().await;
        if slot.take().is_some() {
            info!("previous pending take discarded by new capture");
        }
        *slot = Some(PendingTake {
            clip,
            duration_secs,
            draft: Metadata::default(),
            preview: None,
        });
    }

    pub async fn is_occupied(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    pub async fn snapshot(&self) -> Option<PendingView> {
        self.inner.lock().await.as_ref().map(|take| PendingView {
            clip: Arc::clone(&take.clip),
            duration_secs: take.duration_secs,
            draft: take.draft.clone(),
        })
    }

    /// Apply one form edit to the draft metadata.
    ///
    /// Ignored silently when no take is pending; a validation rejection is
    /// logged and swallowed, leaving the last valid value in place.
    pub async fn update_draft(&self, patch: MetadataPatch) {
        let mut slot = self.inner.lock().await;
        match slot.as_mut() {
            Some(take) => {
                if let Err(e) = take.draft.apply(patch) {
                    warn!("draft edit rejected: {}", e);
                }
            }
            None => warn!("draft edit ignored: no pending take"),
        }
    }

    /// Move the take out of the slot for saving.
    ///
    /// Releases the preview player first; the audio buffer itself is moved,
    /// not copied.
    pub async fn confirm(&self) -> Result<ConfirmedTake, StudioError> {
        let mut slot = self.inner.lock().await;
        let mut take = slot.take().ok_or(StudioError::NothingPending)?;

        if let Some(mut preview) = take.preview.take() {
            preview.stop();
        }

        Ok(ConfirmedTake {
            clip: take.clip,
            duration_secs: take.duration_secs,
            metadata: take.draft,
        })
    }

    /// Release the pending buffer and clear the slot.
    ///
    /// Safe to call when nothing is pending (no-op), so calling it twice in
    /// a row has the same effect as once.
    pub async fn discard(&self) {
        let mut slot = self.inner.lock().await;
        if let Some(mut take) = slot.take() {
            if let Some(mut preview) = take.preview.take() {
                preview.stop();
            }
            info!("pending take discarded ({}s)", take.duration_secs);
        }
    }

    /// Play the pending buffer from the start through a transient player.
    pub async fn start_preview(&self) -> Result<(), StudioError> {
        let mut slot = self.inner.lock().await;
        let take = slot.as_mut().ok_or(StudioError::NothingPending)?;

        let mut sink = take.preview.take().unwrap_or_else(|| Box::new(ClockSink::new()));
        sink.stop();
        let _done = sink.play(&take.clip, 0)?;
        take.preview = Some(sink);
        Ok(())
    }

    /// Stop the preview player, keeping the take pending.
    pub async fn stop_preview(&self) {
        let mut slot = self.inner.lock().await;
        if let Some(take) = slot.as_mut() {
            if let Some(preview) = take.preview.as_mut() {
                preview.stop();
            }
        }
    }
}
