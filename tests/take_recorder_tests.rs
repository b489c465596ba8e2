// Integration tests for the take capture lifecycle
//
// These run against the scripted capture backend with the tokio clock
// paused, so frame pacing and the elapsed-seconds tick are deterministic.

use std::time::Duration;

use anyhow::Result;
use qashqai_voice::{
    AudioFrame, RecorderStatus, ScriptedCapture, SessionConfig, StudioError, StudioSession,
};

fn frames(n: usize) -> Vec<AudioFrame> {
    (0..n)
        .map(|i| AudioFrame {
            samples: vec![0i16; 1600],
            sample_rate: 16000,
            channels: 1,
            timestamp_ms: i as u64 * 100,
        })
        .collect()
}

fn scripted_session(script: ScriptedCapture) -> StudioSession {
    StudioSession::new(SessionConfig::scripted(script))
}

#[tokio::test(start_paused = true)]
async fn test_stop_hands_take_to_pending_slot() -> Result<()> {
    let mut session = scripted_session(ScriptedCapture::granted(frames(40)));

    session.start_take().await?;
    tokio::time::sleep(Duration::from_millis(3050)).await;
    session.stop_take().await;

    let pending = session.pending().await.expect("pending take after stop");
    assert_eq!(pending.duration_secs, 3);
    assert!(pending.clip.sample_count() > 0);
    assert_eq!(pending.draft.speaker_name, "", "draft starts empty");

    let stats = session.stats().await;
    assert_eq!(stats.recorder_status, RecorderStatus::Idle);
    assert!(stats.pending_take);
    assert_eq!(stats.saved_count, 0, "nothing stored until confirm");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_always_produces_a_pending_take() -> Result<()> {
    // Stop immediately: no full second elapsed, possibly no frames captured.
    let mut session = scripted_session(ScriptedCapture::granted(frames(40)));

    session.start_take().await?;
    session.stop_take().await;

    let pending = session.pending().await.expect("even an instant stop pends a take");
    assert_eq!(pending.duration_secs, 0);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_denied_permission_leaves_recorder_idle() -> Result<()> {
    let mut session = scripted_session(ScriptedCapture::denied());

    let err = session.start_take().await.unwrap_err();
    assert!(matches!(err, StudioError::PermissionDenied));

    let stats = session.stats().await;
    assert_eq!(stats.recorder_status, RecorderStatus::Idle);
    assert!(stats.permission_denied, "denial is latched, not auto-cleared");
    assert!(!stats.pending_take, "no pending take was created");

    // Never auto-retried: the flag stays until a manual retry succeeds.
    assert!(session.permission_denied());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_new_capture_discards_previous_pending_take() -> Result<()> {
    let mut session = scripted_session(ScriptedCapture::granted(frames(40)));

    // First take: 2 seconds.
    session.start_take().await?;
    tokio::time::sleep(Duration::from_millis(2050)).await;
    session.stop_take().await;
    assert_eq!(session.pending().await.expect("first take").duration_secs, 2);

    // Second take implicitly discards the first.
    session.start_take().await?;
    assert!(
        session.pending().await.is_none(),
        "starting a new capture clears the unconfirmed take"
    );
    tokio::time::sleep(Duration::from_millis(1050)).await;
    session.stop_take().await;

    let pending = session.pending().await.expect("second take");
    assert_eq!(pending.duration_secs, 1, "only the new take is pending");
    assert!(session.recordings().is_empty(), "nothing was ever stored");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_device_loss_finalizes_partial_take() -> Result<()> {
    let script = ScriptedCapture {
        grant_access: true,
        frames: frames(40),
        frame_interval: Duration::from_millis(100),
        disconnect_after: Some(5),
    };
    let mut session = scripted_session(script);

    session.start_take().await?;
    // The device detaches at ~500ms; give the capture loop time to notice.
    tokio::time::sleep(Duration::from_secs(2)).await;

    let pending = session.pending().await.expect("partial take preserved");
    assert_eq!(pending.clip.sample_count(), 5 * 1600);

    let stats = session.stats().await;
    assert_eq!(stats.recorder_status, RecorderStatus::Idle);
    assert!(stats.last_take_interrupted);

    // The recorder is usable again after an interruption.
    session.start_take().await?;
    tokio::time::sleep(Duration::from_millis(250)).await;
    session.stop_take().await;
    assert!(session.pending().await.is_some());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_ticks_once_per_second() -> Result<()> {
    let mut session = scripted_session(ScriptedCapture::granted(frames(60)));

    session.start_take().await?;
    assert_eq!(session.elapsed_secs(), 0);

    tokio::time::sleep(Duration::from_millis(1050)).await;
    assert_eq!(session.elapsed_secs(), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(session.elapsed_secs(), 3);

    session.stop_take().await;
    Ok(())
}

#[tokio::test]
async fn test_scripted_source_reports_supported() {
    let session = scripted_session(ScriptedCapture::granted(Vec::new()));
    assert!(session.is_supported());
}

#[tokio::test(start_paused = true)]
async fn test_teardown_releases_everything() -> Result<()> {
    let mut session = scripted_session(ScriptedCapture::granted(frames(40)));

    session.start_take().await?;
    tokio::time::sleep(Duration::from_millis(1050)).await;
    session.teardown().await;

    let stats = session.stats().await;
    assert_eq!(stats.recorder_status, RecorderStatus::Idle);
    assert!(!stats.pending_take, "teardown discards the in-flight take");
    assert_eq!(stats.saved_count, 0);
    assert_eq!(stats.playing_id, None);

    Ok(())
}
