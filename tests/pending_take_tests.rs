// Integration tests for the pending take slot and the metadata form
//
// Covers the confirm/discard hand-off, move semantics of the audio buffer,
// and the closed-range validation of draft edits.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use qashqai_voice::{
    AudioFrame, Category, Dialect, Language, Metadata, MetadataPatch, ScriptedCapture,
    SessionConfig, StudioError, StudioSession,
};

fn frames(n: usize) -> Vec<AudioFrame> {
    (0..n)
        .map(|i| AudioFrame {
            samples: vec![(i % 100) as i16; 1600],
            sample_rate: 16000,
            channels: 1,
            timestamp_ms: i as u64 * 100,
        })
        .collect()
}

fn scripted_session() -> StudioSession {
    StudioSession::new(SessionConfig::scripted(ScriptedCapture::granted(frames(60))))
}

async fn record_take(session: &mut StudioSession, millis: u64) -> Result<()> {
    session.start_take().await?;
    tokio::time::sleep(Duration::from_millis(millis)).await;
    session.stop_take().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_confirm_moves_buffer_into_store() -> Result<()> {
    let mut session = scripted_session();
    record_take(&mut session, 1050).await?;

    let before = session.pending().await.expect("pending take");
    let id = session.confirm_take().await?;

    assert_eq!(session.recordings().len(), 1);
    let saved = &session.recordings()[0];
    assert_eq!(saved.id, id);
    assert!(
        Arc::ptr_eq(&before.clip, &saved.clip),
        "the buffer is moved, not copied"
    );
    assert!(session.pending().await.is_none(), "slot cleared by confirm");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_confirm_without_pending_take_fails() -> Result<()> {
    let mut session = scripted_session();
    let err = session.confirm_take().await.unwrap_err();
    assert!(matches!(err, StudioError::NothingPending));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_discard_is_idempotent() -> Result<()> {
    let mut session = scripted_session();
    record_take(&mut session, 1050).await?;

    session.discard_take().await;
    assert!(session.pending().await.is_none());
    assert!(session.recordings().is_empty(), "store untouched by discard");

    // Calling discard twice has the same effect as once.
    session.discard_take().await;
    assert!(session.pending().await.is_none());
    assert!(session.recordings().is_empty());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_draft_edits_without_pending_take_are_ignored() -> Result<()> {
    let session = scripted_session();
    // Must not panic or create a take out of thin air.
    session
        .update_draft(MetadataPatch::SpeakerName("nobody".into()))
        .await;
    assert!(session.pending().await.is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_speaker_age_validation_keeps_last_valid_value() -> Result<()> {
    let mut session = scripted_session();
    record_take(&mut session, 1050).await?;

    session.update_draft(MetadataPatch::SpeakerAge(34)).await;
    session.update_draft(MetadataPatch::SpeakerAge(0)).await;
    session.update_draft(MetadataPatch::SpeakerAge(121)).await;

    let draft = session.pending().await.expect("pending take").draft;
    assert_eq!(draft.speaker_age, Some(34), "out-of-range edits are rejected");

    Ok(())
}

#[test]
fn test_metadata_validation_bounds() {
    let mut meta = Metadata::default();

    assert!(meta.apply(MetadataPatch::SpeakerAge(1)).is_ok());
    assert!(meta.apply(MetadataPatch::SpeakerAge(120)).is_ok());
    assert!(meta.apply(MetadataPatch::SpeakerAge(0)).is_err());
    assert!(meta.apply(MetadataPatch::SpeakerAge(121)).is_err());
    assert_eq!(meta.speaker_age, Some(120));

    // Free-text fields take arbitrary script, including RTL.
    assert!(meta
        .apply(MetadataPatch::Transcription("من قاشقایام".into()))
        .is_ok());
    assert!(meta
        .apply(MetadataPatch::Translation(Language::Fa, "من قشقایی هستم".into()))
        .is_ok());
    assert_eq!(meta.translations.get(&Language::Fa).map(String::as_str), Some("من قشقایی هستم"));
}

#[test]
fn test_enumerations_are_closed() {
    assert_eq!("kashkuli".parse::<Dialect>().unwrap(), Dialect::Kashkuli);
    assert!("tehrani".parse::<Dialect>().is_err());

    assert_eq!("song".parse::<Category>().unwrap(), Category::Song);
    assert!("poem".parse::<Category>().is_err());

    assert_eq!("fa".parse::<Language>().unwrap(), Language::Fa);
    assert!("xx".parse::<Language>().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_three_second_kashkuli_scenario() -> Result<()> {
    // Record for 3 seconds, stop, tag only the dialect, confirm.
    let mut session = scripted_session();
    record_take(&mut session, 3050).await?;

    session
        .update_draft(MetadataPatch::Dialect(Dialect::Kashkuli))
        .await;
    session.confirm_take().await?;

    assert_eq!(session.recordings().len(), 1);
    let saved = &session.recordings()[0];
    assert_eq!(saved.duration_secs, 3);
    assert_eq!(saved.metadata.dialect, Some(Dialect::Kashkuli));
    assert_eq!(saved.metadata.speaker_name, "");
    assert_eq!(saved.metadata.category, None);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_recordings_are_listed_newest_first() -> Result<()> {
    let mut session = scripted_session();

    record_take(&mut session, 1050).await?;
    let first = session.confirm_take().await?;

    record_take(&mut session, 1050).await?;
    let second = session.confirm_take().await?;

    let ids: Vec<u64> = session.recordings().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second, first], "descending id order");
    assert!(second > first, "ids are monotonically assigned");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_metadata_is_a_snapshot() -> Result<()> {
    let mut session = scripted_session();

    record_take(&mut session, 1050).await?;
    session
        .update_draft(MetadataPatch::SpeakerName("Afsaneh".into()))
        .await;
    session.confirm_take().await?;

    // A later draft never retroactively edits the saved record.
    record_take(&mut session, 1050).await?;
    session
        .update_draft(MetadataPatch::SpeakerName("Bahram".into()))
        .await;

    let saved = session.recordings().last().expect("first recording");
    assert_eq!(saved.metadata.speaker_name, "Afsaneh");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_preview_released_on_discard() -> Result<()> {
    let mut session = scripted_session();
    record_take(&mut session, 1050).await?;

    session.preview_take().await?;
    session.discard_take().await;

    let err = session.preview_take().await.unwrap_err();
    assert!(matches!(err, StudioError::NothingPending));

    Ok(())
}
