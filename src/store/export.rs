use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::store::SavedRecording;
use crate::audio::CLIP_FILE_EXT;
use crate::error::StudioError;

/// A named binary payload ready for the host's "save as file" mechanism.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Write the payload into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create export directory {}", dir.display()))?;

        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!("exported {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Build the downloadable file for one recording. No state change.
pub fn export_file(recording: &SavedRecording) -> Result<ExportFile, StudioError> {
    let bytes = recording.clip.wav_bytes()?;
    Ok(ExportFile {
        filename: export_filename(recording),
        bytes,
    })
}

/// Deterministic export filename:
/// `qashqai-<speaker>-<dialect>-<category>-<id>.<ext>`.
///
/// Each metadata component is slugged with a fixed fallback when absent;
/// the id suffix keeps names unique even when all metadata matches.
pub fn export_filename(recording: &SavedRecording) -> String {
    let meta = &recording.metadata;
    format!(
        "qashqai-{}-{}-{}-{}.{}",
        slug(&meta.speaker_name, "speaker"),
        slug(meta.dialect.map(|d| d.as_str()).unwrap_or(""), "qashqai"),
        slug(meta.category.map(|c| c.as_str()).unwrap_or(""), "phrase"),
        recording.id,
        CLIP_FILE_EXT,
    )
}

/// Lower-case and collapse every non-alphanumeric run to a single dash.
fn slug(input: &str, fallback: &str) -> String {
    let mut out = String::new();
    let mut pending_dash = false;

    for ch in input.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }

    if out.is_empty() {
        fallback.to_string()
    } else {
        out
    }
}
