//! Session recording store, playback management and export operations
//!
//! Confirmed recordings live here for the rest of the page session:
//! - `RecordingStore`: ordered collection, newest first
//! - `PlaybackManager`: at most one recording playing at a time
//! - export: deterministic filenames + WAV payloads

pub mod export;
pub mod playback;
pub mod store;

pub use export::{export_file, export_filename, ExportFile};
pub use playback::{ClockSink, PlaybackChange, PlaybackManager, PlaybackSink};
pub use store::{RecordingStore, RecordingSummary, SavedRecording};
