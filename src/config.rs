use anyhow::Result;
use serde::Deserialize;

use crate::audio::CaptureConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_duration_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ExportConfig {
    pub output_dir: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            target_sample_rate: self.audio.sample_rate,
            target_channels: self.audio.channels,
            buffer_duration_ms: self.audio.buffer_duration_ms,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "qashqai-voice".to_string(),
            },
            audio: AudioConfig {
                sample_rate: 16000,
                channels: 1,
                buffer_duration_ms: 100,
            },
            export: ExportConfig {
                output_dir: "recordings".to_string(),
            },
        }
    }
}
