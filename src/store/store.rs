use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::audio::AudioClip;
use crate::error::StudioError;
use crate::take::metadata::Metadata;

/// A confirmed take retained for the rest of the page session.
#[derive(Debug)]
pub struct SavedRecording {
    /// Unique, monotonically assigned, never reused.
    pub id: u64,
    /// Moved from the confirming pending take, never copied.
    pub clip: Arc<AudioClip>,
    pub duration_secs: u64,
    /// Confirmed snapshot; later drafts never touch it.
    pub metadata: Metadata,
    pub recorded_at: DateTime<Utc>,
}

impl SavedRecording {
    pub fn summary(&self) -> RecordingSummary {
        RecordingSummary {
            id: self.id,
            duration_secs: self.duration_secs,
            metadata: self.metadata.clone(),
            recorded_at: self.recorded_at,
        }
    }
}

/// Serializable list read model for the page shell.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingSummary {
    pub id: u64,
    pub duration_secs: u64,
    pub metadata: Metadata,
    pub recorded_at: DateTime<Utc>,
}

/// Ordered collection of confirmed recordings, newest first.
#[derive(Default)]
pub struct RecordingStore {
    recordings: Vec<SavedRecording>,
    next_id: u64,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a confirmed take under the next unused id. Newest entries sit
    /// at the front of the list.
    pub fn add(&mut self, clip: Arc<AudioClip>, duration_secs: u64, metadata: Metadata) -> u64 {
        self.next_id += 1;
        let id = self.next_id;

        self.recordings.insert(
            0,
            SavedRecording {
                id,
                clip,
                duration_secs,
                metadata,
                recorded_at: Utc::now(),
            },
        );

        info!("recording {} saved ({}s)", id, duration_secs);
        id
    }

    /// All recordings, newest first.
    pub fn list(&self) -> &[SavedRecording] {
        &self.recordings
    }

    pub fn summaries(&self) -> Vec<RecordingSummary> {
        self.recordings.iter().map(SavedRecording::summary).collect()
    }

    pub fn get(&self, id: u64) -> Option<&SavedRecording> {
        self.recordings.iter().find(|r| r.id == id)
    }

    /// Remove a recording irreversibly. The caller is responsible for
    /// releasing its playback handle first.
    pub fn remove(&mut self, id: u64) -> Result<SavedRecording, StudioError> {
        let index = self
            .recordings
            .iter()
            .position(|r| r.id == id)
            .ok_or(StudioError::NotFound(id))?;

        let removed = self.recordings.remove(index);
        info!("recording {} deleted", id);
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    /// Drop every stored recording. Ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.recordings.clear();
    }
}
