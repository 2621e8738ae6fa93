// Integration tests for the per-contact capture session.
//
// A scripted media source stands in for the remote endpoint + demuxer
// so the session lifecycle (pump, finalize, abort, teardown) can be
// exercised end to end without a network.

use anyhow::{bail, Result};
use chrono::{DateTime, TimeZone, Utc};
use contact_capture::{
    CaptureSession, CaptureTarget, DisplayHandle, FrameFeed, LaneAudio, MediaFrame, MediaSource,
    RemoteError, RetryPolicy, SessionRegistry, Track, CUSTOMER_TRACK_LABEL, OPERATOR_TRACK_LABEL,
};
use std::collections::VecDeque;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

struct ScriptedFeed {
    frames: VecDeque<MediaFrame>,
    fail_at_end: bool,
}

impl FrameFeed for ScriptedFeed {
    fn next_frame(&mut self) -> Result<Option<MediaFrame>> {
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None if self.fail_at_end => bail!("truncated cluster"),
            None => Ok(None),
        }
    }
}

struct ScriptedMedia {
    frames: Mutex<Vec<MediaFrame>>,
    fail_endpoint: bool,
    fail_at_end: bool,
    feeds_opened: AtomicUsize,
}

impl ScriptedMedia {
    fn new(frames: Vec<MediaFrame>) -> Self {
        Self {
            frames: Mutex::new(frames),
            fail_endpoint: false,
            fail_at_end: false,
            feeds_opened: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl MediaSource for ScriptedMedia {
    async fn resolve_endpoint(&self, _stream_id: &str) -> Result<String, RemoteError> {
        if self.fail_endpoint {
            return Err(RemoteError::fatal("stream not found").with_code("ResourceNotFound"));
        }
        Ok("https://media.local".to_string())
    }

    async fn open_feed(
        &self,
        _endpoint: &str,
        _stream_id: &str,
        _start: DateTime<Utc>,
    ) -> Result<Box<dyn FrameFeed>, RemoteError> {
        self.feeds_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedFeed {
            frames: self.frames.lock().unwrap().clone().into(),
            fail_at_end: self.fail_at_end,
        }))
    }
}

fn frame(label: &str, payload: &[u8]) -> MediaFrame {
    MediaFrame {
        track_label: label.to_string(),
        payload: payload.to_vec(),
        timestamp_ms: 0,
    }
}

fn target() -> CaptureTarget {
    CaptureTarget {
        stream_id: "my-stream-42".to_string(),
        started_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
    }
}

fn session(
    media: ScriptedMedia,
    registry: &SessionRegistry,
    dir: &TempDir,
) -> CaptureSession {
    CaptureSession::new(
        target(),
        std::sync::Arc::new(media),
        registry.clone(),
        DisplayHandle::null(),
        RetryPolicy::new(1, Duration::from_millis(1)),
        dir.path().to_path_buf(),
    )
}

#[tokio::test]
async fn session_writes_one_wav_per_lane() -> Result<()> {
    let dir = TempDir::new()?;
    let registry = SessionRegistry::new();
    registry.dispatch(&target());

    let media = ScriptedMedia::new(vec![
        frame(CUSTOMER_TRACK_LABEL, &[1, 0, 2, 0]),
        frame(OPERATOR_TRACK_LABEL, &[9, 0]),
        frame(CUSTOMER_TRACK_LABEL, &[3, 0]),
    ]);

    session(media, &registry, &dir).run().await;

    let customer = dir.path().join("2023-11-14-22-13-20-000-cu.wav");
    let operator = dir.path().join("2023-11-14-22-13-20-000-op.wav");

    // Header is 44 bytes; lane bytes follow verbatim.
    assert_eq!(fs::metadata(&customer)?.len(), 44 + 6);
    assert_eq!(fs::metadata(&operator)?.len(), 44 + 2);

    let customer = LaneAudio::open(&customer)?;
    assert!(customer.is_capture_format());
    assert_eq!(customer.samples, vec![1, 2, 3]);

    let operator = LaneAudio::open(&operator)?;
    assert_eq!(operator.samples, vec![9]);

    assert!(registry.is_empty(), "registry entry should be removed");
    Ok(())
}

#[tokio::test]
async fn unknown_track_labels_reach_neither_lane() -> Result<()> {
    let dir = TempDir::new()?;
    let registry = SessionRegistry::new();
    registry.dispatch(&target());

    let media = ScriptedMedia::new(vec![
        frame("VIDEO_FROM_CUSTOMER", &[0xAA; 64]),
        frame(CUSTOMER_TRACK_LABEL, &[5, 0]),
    ]);

    session(media, &registry, &dir).run().await;

    let customer = LaneAudio::open(dir.path().join("2023-11-14-22-13-20-000-cu.wav"))?;
    assert_eq!(customer.samples, vec![5]);

    let operator = LaneAudio::open(dir.path().join("2023-11-14-22-13-20-000-op.wav"))?;
    assert!(operator.samples.is_empty());
    Ok(())
}

#[tokio::test]
async fn endpoint_failure_aborts_without_output() -> Result<()> {
    let dir = TempDir::new()?;
    let registry = SessionRegistry::new();
    registry.dispatch(&target());

    let mut media = ScriptedMedia::new(vec![frame(CUSTOMER_TRACK_LABEL, &[1, 0])]);
    media.fail_endpoint = true;
    let feeds = std::sync::Arc::new(media);
    let media: std::sync::Arc<dyn MediaSource> = feeds.clone();

    CaptureSession::new(
        target(),
        media,
        registry.clone(),
        DisplayHandle::null(),
        RetryPolicy::new(2, Duration::from_millis(1)),
        dir.path().to_path_buf(),
    )
    .run()
    .await;

    assert_eq!(fs::read_dir(dir.path())?.count(), 0, "no files on abort");
    assert!(registry.is_empty(), "registry entry removed even on abort");
    assert_eq!(feeds.feeds_opened.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn decode_error_still_finalizes_accumulated_audio() -> Result<()> {
    let dir = TempDir::new()?;
    let registry = SessionRegistry::new();
    registry.dispatch(&target());

    let mut media = ScriptedMedia::new(vec![frame(CUSTOMER_TRACK_LABEL, &[7, 0, 8, 0])]);
    media.fail_at_end = true;

    session(media, &registry, &dir).run().await;

    let customer = LaneAudio::open(dir.path().join("2023-11-14-22-13-20-000-cu.wav"))?;
    assert_eq!(customer.samples, vec![7, 8]);
    assert!(registry.is_empty());
    Ok(())
}

#[tokio::test]
async fn display_sees_panel_lifecycle_and_spectra() -> Result<()> {
    let dir = TempDir::new()?;
    let registry = SessionRegistry::new();
    registry.dispatch(&target());
    let (display, mut rx) = DisplayHandle::channel();

    let media = ScriptedMedia::new(vec![
        frame(CUSTOMER_TRACK_LABEL, &[1, 0, 2, 0, 3, 0, 4, 0]),
        frame(OPERATOR_TRACK_LABEL, &[5, 0, 6, 0, 7, 0, 8, 0]),
    ]);

    CaptureSession::new(
        target(),
        std::sync::Arc::new(media),
        registry.clone(),
        display,
        RetryPolicy::new(1, Duration::from_millis(1)),
        dir.path().to_path_buf(),
    )
    .run()
    .await;

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    use contact_capture::DisplayEvent;
    assert!(matches!(
        events.first(),
        Some(DisplayEvent::PanelOpened { stream_id, .. }) if stream_id == "my-stream-42"
    ));
    assert!(matches!(
        events.last(),
        Some(DisplayEvent::PanelClosed { stream_id }) if stream_id == "my-stream-42"
    ));

    let mut tracks_seen = Vec::new();
    for event in &events {
        if let DisplayEvent::Spectrum {
            track, magnitudes, ..
        } = event
        {
            // 8-byte payloads yield floor(8/4) = 2 magnitudes.
            assert_eq!(magnitudes.len(), 2);
            tracks_seen.push(*track);
        }
    }
    assert_eq!(tracks_seen, vec![Track::Customer, Track::Operator]);
    Ok(())
}
