use std::io::Cursor;
use std::sync::Arc;

use super::backend::AudioFrame;

/// File extension matching the clip encoding produced by [`AudioClip::wav_bytes`].
pub const CLIP_FILE_EXT: &str = "wav";

/// A finalized, immutable audio buffer.
///
/// Built once when a take stops, then shared by reference: the pending slot,
/// the store and the playback manager all hold the same `Arc<AudioClip>`, so
/// confirming a take moves the buffer rather than copying it.
#[derive(Debug)]
pub struct AudioClip {
    samples: Arc<[i16]>,
    sample_rate: u32,
    channels: u16,
}

impl AudioClip {
    /// Concatenate captured frames into a single clip.
    ///
    /// Format is taken from the first frame; `fallback_rate`/`fallback_channels`
    /// cover the empty-take case (stop pressed before any audio arrived).
    pub fn from_frames(frames: &[AudioFrame], fallback_rate: u32, fallback_channels: u16) -> Self {
        let sample_rate = frames.first().map(|f| f.sample_rate).unwrap_or(fallback_rate);
        let channels = frames.first().map(|f| f.channels).unwrap_or(fallback_channels);

        let total: usize = frames.iter().map(|f| f.samples.len()).sum();
        let mut samples = Vec::with_capacity(total);
        for frame in frames {
            samples.extend_from_slice(&frame.samples);
        }

        Self {
            samples: samples.into(),
            sample_rate,
            channels,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Playback length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / (self.sample_rate as u64 * self.channels as u64)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_ms() as f64 / 1000.0
    }

    /// Encode the clip as a 16-bit PCM WAV payload.
    pub fn wav_bytes(&self) -> Result<Vec<u8>, hound::Error> {
        let spec = hound::WavSpec {
            channels: self.channels.max(1),
            sample_rate: self.sample_rate.max(1),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in self.samples.iter() {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }

        Ok(cursor.into_inner())
    }
}
