use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use qashqai_voice::{
    format_duration, Category, Config, Dialect, MetadataPatch, ScriptedCapture, SessionConfig,
    StudioSession, PROMPT_PHRASES,
};

#[derive(Parser)]
#[command(name = "qashqai-voice", version, about = "Capture, review and export Qashqai voice samples")]
struct Cli {
    /// Config file to load (name without extension)
    #[arg(long, default_value = "config/qashqai-voice")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether this environment can capture audio
    Support {
        /// Check the synthetic source instead of the microphone
        #[arg(long)]
        synthetic: bool,
    },

    /// Record one take, confirm it with metadata, and export the file
    Record {
        /// Seconds to capture before stopping
        #[arg(long, default_value_t = 3)]
        seconds: u64,

        /// Use a synthetic tone instead of the microphone
        #[arg(long)]
        synthetic: bool,

        #[arg(long)]
        speaker: Option<String>,

        #[arg(long)]
        age: Option<u8>,

        #[arg(long)]
        dialect: Option<Dialect>,

        #[arg(long)]
        category: Option<Category>,

        #[arg(long)]
        transcription: Option<String>,

        /// Output directory (defaults to the configured export dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let cfg = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("config not loaded ({}), using defaults", e);
            Config::default()
        }
    };

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Support { synthetic } => {
            let session = StudioSession::new(session_config(&cfg, synthetic, 0));
            if session.is_supported() {
                println!("capture supported");
            } else {
                println!("capture NOT supported in this environment");
            }
        }

        Command::Record {
            seconds,
            synthetic,
            speaker,
            age,
            dialect,
            category,
            transcription,
            out,
        } => {
            let mut session = StudioSession::new(session_config(&cfg, synthetic, seconds));

            if !session.is_supported() {
                anyhow::bail!("audio capture is not supported in this environment");
            }

            println!("Read aloud: {}", PROMPT_PHRASES[0]);
            session.start_take().await?;

            tokio::time::sleep(Duration::from_secs(seconds)).await;
            session.stop_take().await;

            if let Some(name) = speaker {
                session.update_draft(MetadataPatch::SpeakerName(name)).await;
            }
            if let Some(age) = age {
                session.update_draft(MetadataPatch::SpeakerAge(age)).await;
            }
            if let Some(dialect) = dialect {
                session.update_draft(MetadataPatch::Dialect(dialect)).await;
            }
            if let Some(category) = category {
                session.update_draft(MetadataPatch::Category(category)).await;
            }
            if let Some(text) = transcription {
                session.update_draft(MetadataPatch::Transcription(text)).await;
            }

            let id = session.confirm_take().await?;
            let export = session.export_recording(id)?;

            let dir = out.unwrap_or_else(|| PathBuf::from(&cfg.export.output_dir));
            let path = export.write_to(&dir)?;

            let recording = &session.recordings()[0];
            println!(
                "Saved {} ({})",
                path.display(),
                format_duration(recording.duration_secs)
            );
            println!("{}", serde_json::to_string_pretty(&session.summaries())?);

            session.teardown().await;
        }
    }

    Ok(())
}

fn session_config(cfg: &Config, synthetic: bool, seconds: u64) -> SessionConfig {
    let capture = cfg.capture_config();

    let mut session_config = if synthetic {
        // One extra second of tone so a stop at the requested mark never
        // runs out of frames first.
        let script = ScriptedCapture::tone(Duration::from_secs(seconds + 1), &capture);
        SessionConfig::scripted(script)
    } else {
        SessionConfig::microphone()
    };

    session_config.capture = capture;
    session_config
}
