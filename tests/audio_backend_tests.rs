// Unit tests for audio backend abstractions
//
// These tests verify the core audio types and the clip assembly work
// correctly.

use qashqai_voice::{AudioClip, AudioFrame, CaptureConfig};

fn frame(samples: Vec<i16>, timestamp_ms: u64) -> AudioFrame {
    AudioFrame {
        samples,
        sample_rate: 16000,
        channels: 1,
        timestamp_ms,
    }
}

#[test]
fn test_audio_frame_creation() {
    let frame = AudioFrame {
        samples: vec![100, 200, 300],
        sample_rate: 16000,
        channels: 1,
        timestamp_ms: 1000,
    };

    assert_eq!(frame.samples.len(), 3);
    assert_eq!(frame.sample_rate, 16000);
    assert_eq!(frame.channels, 1);
    assert_eq!(frame.timestamp_ms, 1000);
}

#[test]
fn test_capture_config_default() {
    let config = CaptureConfig::default();

    assert_eq!(config.target_sample_rate, 16000);
    assert_eq!(config.target_channels, 1, "Default should be mono");
    assert_eq!(config.buffer_duration_ms, 100, "Default buffer should be 100ms");
}

#[test]
fn test_clip_concatenates_frames_in_order() {
    let frames = vec![
        frame(vec![1, 2, 3], 0),
        frame(vec![4, 5], 100),
        frame(vec![6], 200),
    ];

    let clip = AudioClip::from_frames(&frames, 16000, 1);

    assert_eq!(clip.samples(), &[1, 2, 3, 4, 5, 6]);
    assert_eq!(clip.sample_count(), 6);
    assert_eq!(clip.sample_rate(), 16000);
    assert_eq!(clip.channels(), 1);
}

#[test]
fn test_empty_clip_uses_fallback_format() {
    let clip = AudioClip::from_frames(&[], 48000, 2);

    assert!(clip.is_empty());
    assert_eq!(clip.sample_rate(), 48000);
    assert_eq!(clip.channels(), 2);
    assert_eq!(clip.duration_ms(), 0);
}

#[test]
fn test_clip_duration_from_sample_count() {
    // 16000 mono samples at 16kHz = exactly one second.
    let clip = AudioClip::from_frames(&[frame(vec![0i16; 16000], 0)], 16000, 1);

    assert_eq!(clip.duration_ms(), 1000);
    assert_eq!(clip.duration_seconds(), 1.0);
}

#[test]
fn test_stereo_clip_duration_counts_interleaved_samples() {
    // 3 sample pairs at 16kHz stereo.
    let stereo = AudioFrame {
        samples: vec![100, 200, 150, 250, 175, 275],
        sample_rate: 16000,
        channels: 2,
        timestamp_ms: 0,
    };

    let clip = AudioClip::from_frames(&[stereo], 16000, 2);
    assert_eq!(clip.sample_count(), 6);
    assert_eq!(clip.duration_ms(), 0, "3 pairs are well under a millisecond");
}
