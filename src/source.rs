// Interfaces to the remote event stream and media source.
//
// The real backends (shard discovery, iterator issuance, record fetch,
// endpoint resolution, media retrieval, container demuxing) live behind
// these traits so the capture pipeline can be driven by any binding,
// including the in-process stubs used by the integration tests.

use anyhow::Result;
use chrono::{DateTime, Utc};

/// Track label carried on frames that originate from the customer.
pub const CUSTOMER_TRACK_LABEL: &str = "AUDIO_FROM_CUSTOMER";

/// Track label carried on frames that are played back to the customer.
pub const OPERATOR_TRACK_LABEL: &str = "AUDIO_TO_CUSTOMER";

/// A failure reported by a remote collaborator.
///
/// `retryable` is the collaborator's own classification; the retry
/// executor honors it verbatim.
#[derive(Debug, Clone)]
pub struct RemoteError {
    pub code: Option<String>,
    pub message: String,
    pub retryable: bool,
}

impl RemoteError {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

/// One opaque event record body (JSON bytes) from the event stream.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub data: Vec<u8>,
}

/// Result of one record fetch: the batch plus the cursor for the next
/// fetch. A missing next cursor means the shard is exhausted.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    pub records: Vec<EventRecord>,
    pub next_cursor: Option<String>,
}

/// Polled event stream (shards, cursors, record batches).
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// List the shard ids of the named stream.
    async fn list_shards(&self, stream_name: &str) -> Result<Vec<String>, RemoteError>;

    /// Obtain a cursor positioned at "latest" for one shard.
    async fn latest_cursor(
        &self,
        stream_name: &str,
        shard_id: &str,
    ) -> Result<Option<String>, RemoteError>;

    /// Fetch the next batch of records at the given cursor.
    async fn fetch_records(&self, cursor: &str) -> Result<RecordBatch, RemoteError>;
}

/// One demuxed media frame: a track label, the raw PCM payload, and the
/// fragment timestamp in milliseconds.
#[derive(Debug, Clone)]
pub struct MediaFrame {
    pub track_label: String,
    pub payload: Vec<u8>,
    pub timestamp_ms: u64,
}

/// Blocking, ordered frame feed produced by the external demuxer.
///
/// `next_frame` does not return until a frame is available, the feed
/// ends (`Ok(None)`), or decoding fails. Callers must drive it off the
/// async runtime's worker threads.
pub trait FrameFeed: Send {
    fn next_frame(&mut self) -> Result<Option<MediaFrame>>;
}

/// Remote media-session API: endpoint discovery plus feed opening.
#[async_trait::async_trait]
pub trait MediaSource: Send + Sync {
    /// Resolve the data endpoint serving media for one stream.
    async fn resolve_endpoint(&self, stream_id: &str) -> Result<String, RemoteError>;

    /// Open a media feed at `endpoint`, starting at the server-side
    /// timestamp `start`.
    async fn open_feed(
        &self,
        endpoint: &str,
        stream_id: &str,
        start: DateTime<Utc>,
    ) -> Result<Box<dyn FrameFeed>, RemoteError>;
}
