use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::audio::AudioClip;
use crate::error::StudioError;

/// A live player for one audio buffer.
///
/// `play` starts (or resumes) playback and returns a receiver that resolves
/// when the clip reaches its natural end; `pause` halts and reports the
/// position reached; `stop` halts and rewinds. Implementations own whatever
/// decode/output resource they need and release it on drop.
pub trait PlaybackSink: Send {
    fn play(&mut self, clip: &AudioClip, from_ms: u64) -> Result<oneshot::Receiver<()>, StudioError>;

    /// Pause and return the playback position in milliseconds.
    fn pause(&mut self) -> u64;

    /// Stop and rewind to the start.
    fn stop(&mut self);

    fn name(&self) -> &str;
}

/// Default sink: tracks playback against the tokio clock without touching
/// audio hardware. Honors virtual time, so tests drive it deterministically;
/// a device-output sink would implement the same trait.
#[derive(Default)]
pub struct ClockSink {
    /// Set while playing: when playback started and from which position.
    origin: Option<(tokio::time::Instant, u64)>,
    duration_ms: u64,
    timer: Option<JoinHandle<()>>,
}

impl ClockSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl PlaybackSink for ClockSink {
    fn play(&mut self, clip: &AudioClip, from_ms: u64) -> Result<oneshot::Receiver<()>, StudioError> {
        self.cancel_timer();
        self.duration_ms = clip.duration_ms();

        let remaining = self.duration_ms.saturating_sub(from_ms);
        let (done_tx, done_rx) = oneshot::channel();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(remaining)).await;
            let _ = done_tx.send(());
        }));
        self.origin = Some((tokio::time::Instant::now(), from_ms));

        Ok(done_rx)
    }

    fn pause(&mut self) -> u64 {
        self.cancel_timer();
        match self.origin.take() {
            Some((started, from_ms)) => {
                (from_ms + started.elapsed().as_millis() as u64).min(self.duration_ms)
            }
            None => 0,
        }
    }

    fn stop(&mut self) {
        self.cancel_timer();
        self.origin = None;
    }

    fn name(&self) -> &str {
        "clock"
    }
}

impl Drop for ClockSink {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// Outcome of a toggle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackChange {
    Started,
    Paused,
}

type SinkFactory = dyn Fn() -> Box<dyn PlaybackSink> + Send + Sync;

struct PlayerEntry {
    sink: Box<dyn PlaybackSink>,
    /// Position retained across pause/resume; rewound when another
    /// recording takes over or playback completes.
    position_ms: u64,
    playing: bool,
}

#[derive(Default)]
struct Inner {
    players: HashMap<u64, PlayerEntry>,
    active: Option<u64>,
    /// Bumped on every play so a stale completion watcher can never clear
    /// the marker of a newer playback.
    play_seq: u64,
}

/// Enforces the single-playing invariant across all stored recordings.
///
/// Owns the capability map from recording id to its live player. All
/// mutation goes through [`PlaybackManager::toggle`], so the mutual
/// exclusion check lives in exactly one place.
#[derive(Clone)]
pub struct PlaybackManager {
    inner: Arc<Mutex<Inner>>,
    make_sink: Arc<SinkFactory>,
}

impl PlaybackManager {
    pub fn new() -> Self {
        Self::with_sink_factory(|| Box::new(ClockSink::new()))
    }

    /// Use a custom player implementation (device output, instrumented test
    /// sinks).
    pub fn with_sink_factory<F>(make_sink: F) -> Self
    where
        F: Fn() -> Box<dyn PlaybackSink> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            make_sink: Arc::new(make_sink),
        }
    }

    /// Play, resume or pause the given recording.
    ///
    /// If it is currently playing: pause it, keep its position, clear the
    /// marker. Otherwise: pause-and-rewind every other player, lazily create
    /// this recording's player, resume from its retained position and mark
    /// it active. A completion watcher clears the marker when the clip ends.
    pub async fn toggle(&self, id: u64, clip: &Arc<AudioClip>) -> Result<PlaybackChange, StudioError> {
        let mut inner = self.inner.lock().await;

        if inner.active == Some(id) {
            if let Some(entry) = inner.players.get_mut(&id) {
                entry.position_ms = entry.sink.pause();
                entry.playing = false;
                debug!("paused recording {} at {}ms", id, entry.position_ms);
            }
            inner.active = None;
            return Ok(PlaybackChange::Paused);
        }

        for (other, entry) in inner.players.iter_mut() {
            if *other != id {
                entry.sink.stop();
                entry.position_ms = 0;
                entry.playing = false;
            }
        }

        let make_sink = self.make_sink.as_ref();
        let done_rx = {
            let entry = inner.players.entry(id).or_insert_with(|| PlayerEntry {
                sink: make_sink(),
                position_ms: 0,
                playing: false,
            });
            let done_rx = entry.sink.play(clip, entry.position_ms)?;
            entry.playing = true;
            done_rx
        };

        inner.active = Some(id);
        inner.play_seq += 1;
        let seq = inner.play_seq;

        let watcher_inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if done_rx.await.is_ok() {
                let mut inner = watcher_inner.lock().await;
                if inner.play_seq == seq && inner.active == Some(id) {
                    inner.active = None;
                    if let Some(entry) = inner.players.get_mut(&id) {
                        entry.sink.stop();
                        entry.position_ms = 0;
                        entry.playing = false;
                    }
                    debug!("playback of recording {} reached the end", id);
                }
            }
        });

        Ok(PlaybackChange::Started)
    }

    pub async fn active_id(&self) -> Option<u64> {
        self.inner.lock().await.active
    }

    pub async fn is_playing(&self, id: u64) -> bool {
        self.inner.lock().await.active == Some(id)
    }

    /// Retained position of a paused player (0 if never played or rewound).
    pub async fn position_ms(&self, id: u64) -> u64 {
        self.inner
            .lock()
            .await
            .players
            .get(&id)
            .map(|e| e.position_ms)
            .unwrap_or(0)
    }

    /// Tear down the player for one recording. Part of deletion: stops any
    /// active playback for that id and releases the handle exactly once.
    pub async fn release(&self, id: u64) {
        let mut inner = self.inner.lock().await;
        if let Some(mut entry) = inner.players.remove(&id) {
            entry.sink.stop();
        }
        if inner.active == Some(id) {
            inner.active = None;
        }
    }

    /// Release every outstanding player, whatever is mid-playback.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        for (_, entry) in inner.players.iter_mut() {
            entry.sink.stop();
        }
        let count = inner.players.len();
        inner.players.clear();
        inner.active = None;
        if count > 0 {
            info!("released {} playback handles", count);
        }
    }
}

impl Default for PlaybackManager {
    fn default() -> Self {
        Self::new()
    }
}
