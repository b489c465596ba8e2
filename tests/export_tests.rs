// Tests for export filename derivation and WAV payloads

use std::io::Cursor;
use std::sync::Arc;

use anyhow::Result;
use qashqai_voice::{
    export_file, export_filename, AudioClip, AudioFrame, Category, Dialect, Metadata,
    MetadataPatch, RecordingStore,
};
use tempfile::TempDir;

fn clip(seconds: u64) -> Arc<AudioClip> {
    let frames: Vec<AudioFrame> = (0..seconds * 10)
        .map(|i| AudioFrame {
            samples: vec![250i16; 1600],
            sample_rate: 16000,
            channels: 1,
            timestamp_ms: i * 100,
        })
        .collect();
    Arc::new(AudioClip::from_frames(&frames, 16000, 1))
}

fn tagged_metadata() -> Metadata {
    let mut meta = Metadata::default();
    meta.apply(MetadataPatch::SpeakerName("Afsaneh  Q!".into())).unwrap();
    meta.apply(MetadataPatch::Dialect(Dialect::Kashkuli)).unwrap();
    meta.apply(MetadataPatch::Category(Category::Song)).unwrap();
    meta
}

#[test]
fn test_filename_falls_back_when_metadata_is_absent() {
    let mut store = RecordingStore::new();
    let id = store.add(clip(1), 1, Metadata::default());

    let name = export_filename(store.get(id).unwrap());
    assert_eq!(name, format!("qashqai-speaker-qashqai-phrase-{id}.wav"));
}

#[test]
fn test_filename_slugs_metadata_components() {
    let mut store = RecordingStore::new();
    let id = store.add(clip(1), 1, tagged_metadata());

    let name = export_filename(store.get(id).unwrap());
    assert_eq!(name, format!("qashqai-afsaneh-q-kashkuli-song-{id}.wav"));
}

#[test]
fn test_filenames_are_unique_for_identical_metadata() {
    let mut store = RecordingStore::new();
    let first = store.add(clip(1), 1, tagged_metadata());
    let second = store.add(clip(1), 1, tagged_metadata());

    let name_a = export_filename(store.get(first).unwrap());
    let name_b = export_filename(store.get(second).unwrap());
    assert_ne!(name_a, name_b, "the id suffix keeps names unique");
}

#[test]
fn test_export_payload_is_a_readable_wav() -> Result<()> {
    let mut store = RecordingStore::new();
    let audio = clip(2);
    let id = store.add(Arc::clone(&audio), 2, Metadata::default());

    let export = export_file(store.get(id).unwrap())?;

    let reader = hound::WavReader::new(Cursor::new(&export.bytes))?;
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len() as usize, audio.sample_count());

    Ok(())
}

#[test]
fn test_export_writes_file_to_disk() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = RecordingStore::new();
    let id = store.add(clip(1), 1, tagged_metadata());

    let export = export_file(store.get(id).unwrap())?;
    let path = export.write_to(temp_dir.path())?;

    assert!(path.exists());
    assert_eq!(std::fs::metadata(&path)?.len() as usize, export.bytes.len());
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("qashqai-afsaneh-q-kashkuli-song-"));

    Ok(())
}

#[test]
fn test_export_does_not_change_state() -> Result<()> {
    let mut store = RecordingStore::new();
    let id = store.add(clip(1), 1, Metadata::default());

    let _ = export_file(store.get(id).unwrap())?;
    let _ = export_file(store.get(id).unwrap())?;

    assert_eq!(store.len(), 1);
    Ok(())
}
