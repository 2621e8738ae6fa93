// Event poll loop: shard discovery, cursor acquisition, and the
// fetch/dispatch/sleep cycle that feeds the session registry.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::capture::CaptureSession;
use crate::config::CaptureConfig;
use crate::contact::capture_target;
use crate::display::DisplayHandle;
use crate::registry::SessionRegistry;
use crate::retry::RetryPolicy;
use crate::source::{EventSource, MediaSource};

/// Sequential poller over one event-stream shard.
///
/// Records are dispatched synchronously in source order; each new
/// capture target spawns an independent session task, so the loop
/// never waits on a capture. The loop ends when the stream has no
/// shards, a cursor cannot be obtained, a fetch fails for good, the
/// shard is exhausted, or the stop flag is raised.
pub struct EventPoller {
    events: Arc<dyn EventSource>,
    media: Arc<dyn MediaSource>,
    registry: SessionRegistry,
    display: DisplayHandle,
    retry: RetryPolicy,
    stream_name: String,
    poll_interval: Duration,
    output_dir: PathBuf,
    stop: Arc<AtomicBool>,
}

impl EventPoller {
    pub fn new(
        events: Arc<dyn EventSource>,
        media: Arc<dyn MediaSource>,
        registry: SessionRegistry,
        display: DisplayHandle,
        config: &CaptureConfig,
    ) -> Self {
        Self {
            events,
            media,
            registry,
            display,
            retry: config.retry_policy(),
            stream_name: config.stream_name.clone(),
            poll_interval: config.poll_interval(),
            output_dir: config.output_dir.clone(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag an embedder raises to end the loop. Observed before
    /// each sleep; in-flight sessions are never forcibly cancelled.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Run the poll loop to termination, then wait for every live
    /// capture session to finish.
    pub async fn run(self) {
        let mut workers: Vec<JoinHandle<()>> = Vec::new();

        if let Some(mut cursor) = self.acquire_cursor().await {
            info!(stream = %self.stream_name, "starting event poll loop");

            loop {
                if self.stop.load(Ordering::SeqCst) {
                    info!("stop requested, ending event poll loop");
                    break;
                }

                let batch = match self
                    .retry
                    .run("fetch_records", || self.events.fetch_records(&cursor))
                    .await
                {
                    Some(batch) => batch,
                    None => {
                        error!("record fetch failed for good, ending event poll loop");
                        break;
                    }
                };

                for record in &batch.records {
                    if let Some(target) = capture_target(&record.data) {
                        if self.registry.dispatch(&target) {
                            let session = CaptureSession::new(
                                target,
                                Arc::clone(&self.media),
                                self.registry.clone(),
                                self.display.clone(),
                                self.retry,
                                self.output_dir.clone(),
                            );
                            workers.push(tokio::spawn(session.run()));
                        }
                    }
                }

                match batch.next_cursor {
                    Some(next) if !next.is_empty() => cursor = next,
                    _ => {
                        info!("shard cursor exhausted, ending event poll loop");
                        break;
                    }
                }

                workers.retain(|handle| !handle.is_finished());

                if self.stop.load(Ordering::SeqCst) {
                    info!("stop requested, ending event poll loop");
                    break;
                }
                tokio::time::sleep(self.poll_interval).await;
            }

            info!(stream = %self.stream_name, "event poll loop ended");
        }

        // Sessions observe their own feed's termination; here we only
        // wait for them, never cancel them.
        if !workers.is_empty() {
            info!(count = workers.len(), "waiting for active capture sessions");
        }
        for handle in workers {
            if let Err(e) = handle.await {
                error!("capture session task panicked: {}", e);
            }
        }

        info!("capture pipeline terminated");
    }

    /// Resolve the first shard of the stream and obtain a cursor at
    /// "latest". `None` ends the pipeline before polling starts.
    async fn acquire_cursor(&self) -> Option<String> {
        let shards = self
            .retry
            .run("list_shards", || self.events.list_shards(&self.stream_name))
            .await?;

        let shard_id = match shards.first() {
            Some(shard_id) => shard_id.clone(),
            None => {
                warn!(stream = %self.stream_name, "stream has no shards");
                return None;
            }
        };

        let cursor = self
            .retry
            .run("latest_cursor", || {
                self.events.latest_cursor(&self.stream_name, &shard_id)
            })
            .await?;

        match cursor {
            Some(cursor) if !cursor.is_empty() => Some(cursor),
            _ => {
                warn!(stream = %self.stream_name, shard = %shard_id, "no cursor issued for shard");
                None
            }
        }
    }
}
