use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::router::{FrameRouter, Track};
use crate::audio::write_lane_wav;
use crate::contact::CaptureTarget;
use crate::display::DisplayHandle;
use crate::registry::{SessionRegistry, SessionStatus};
use crate::retry::RetryPolicy;
use crate::source::{FrameFeed, MediaSource};

/// One capture session: resolves a media endpoint, pumps the demuxed
/// feed through the frame router, and renders both lanes to WAV files
/// when the feed ends.
///
/// Runs as its own task so a long call never stalls the event poller
/// or unrelated sessions. The registry entry is removed on every exit
/// path, including aborts before the feed opens.
pub struct CaptureSession {
    target: CaptureTarget,
    media: Arc<dyn MediaSource>,
    registry: SessionRegistry,
    display: DisplayHandle,
    retry: RetryPolicy,
    output_dir: PathBuf,
}

impl CaptureSession {
    pub fn new(
        target: CaptureTarget,
        media: Arc<dyn MediaSource>,
        registry: SessionRegistry,
        display: DisplayHandle,
        retry: RetryPolicy,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            target,
            media,
            registry,
            display,
            retry,
            output_dir,
        }
    }

    /// Drive the session from dispatch to teardown.
    pub async fn run(self) {
        let stream_id = self.target.stream_id.clone();
        let started_at = self.target.started_at;

        info!(
            stream_id = %stream_id,
            started_at = %started_at,
            "capture session starting"
        );
        self.registry.set_status(&stream_id, SessionStatus::Active);

        if let Some((customer, operator)) = self.capture().await {
            self.registry.set_status(&stream_id, SessionStatus::Closing);

            // One write per lane; a failure on one lane never blocks
            // the other.
            for (track, pcm) in [(Track::Customer, customer), (Track::Operator, operator)] {
                if let Err(e) = write_lane_wav(&self.output_dir, started_at, track, &pcm) {
                    error!(
                        stream_id = %stream_id,
                        track = ?track,
                        "failed to write lane audio: {:#}",
                        e
                    );
                }
            }

            info!(stream_id = %stream_id, "capture session complete");
        } else {
            warn!(stream_id = %stream_id, "capture session aborted, no audio written");
        }

        self.registry.remove(&stream_id);
    }

    /// Open the feed and pump it to exhaustion. `None` means the
    /// session could not get a feed and aborts without output.
    async fn capture(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        let endpoint = self
            .retry
            .run("resolve_endpoint", || {
                self.media.resolve_endpoint(&self.target.stream_id)
            })
            .await?;

        let feed = self
            .retry
            .run("open_feed", || {
                self.media
                    .open_feed(&endpoint, &self.target.stream_id, self.target.started_at)
            })
            .await?;

        let router = FrameRouter::new(self.target.clone(), self.display.clone());
        let stream_id = self.target.stream_id.clone();

        // The demux pump blocks until the feed ends, so it runs on a
        // blocking thread while this task awaits the result.
        info!(stream_id = %stream_id, "recording started");
        let router = match tokio::task::spawn_blocking(move || pump_feed(feed, router)).await {
            Ok(router) => router,
            Err(e) => {
                error!(stream_id = %stream_id, "demux pump panicked: {}", e);
                return None;
            }
        };
        info!(stream_id = %stream_id, "recording finished");

        Some(router.finish())
    }
}

/// Pump frames from the blocking feed into the router until EOF or a
/// decode error. A decode error ends the feed but the session still
/// finalizes whatever was accumulated.
fn pump_feed(mut feed: Box<dyn FrameFeed>, mut router: FrameRouter) -> FrameRouter {
    loop {
        match feed.next_frame() {
            Ok(Some(frame)) => router.route(&frame.track_label, &frame.payload),
            Ok(None) => break,
            Err(e) => {
                warn!("media feed decode error, ending capture: {:#}", e);
                break;
            }
        }
    }
    router
}
