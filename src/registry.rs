// Session dispatcher and registry.
//
// One map, one lock, held only for lookup/insert/remove. Worker launch
// and all I/O happen outside the critical section.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::contact::CaptureTarget;

/// Lifecycle of one capture session, as seen by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Registered by the dispatcher, worker not yet running.
    Pending,
    /// Worker is pumping the media feed.
    Active,
    /// Feed has ended; lanes are being finalized.
    Closing,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    target: CaptureTarget,
    status: SessionStatus,
}

/// Registry of active capture sessions keyed by media stream id.
///
/// At most one entry per stream id exists at any time; a second
/// dispatch for a stream with a live session is a no-op.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` if its stream id is not already live.
    ///
    /// Returns `true` when a new entry was inserted (the caller then
    /// launches a worker) and `false` when a session for this stream
    /// already exists.
    pub fn dispatch(&self, target: &CaptureTarget) -> bool {
        let mut sessions = self.inner.lock().unwrap();
        if sessions.contains_key(&target.stream_id) {
            debug!(
                stream_id = %target.stream_id,
                "session already active, ignoring duplicate event"
            );
            return false;
        }

        sessions.insert(
            target.stream_id.clone(),
            SessionEntry {
                target: target.clone(),
                status: SessionStatus::Pending,
            },
        );
        info!(stream_id = %target.stream_id, "registered new capture session");
        true
    }

    /// Record a lifecycle transition for a live session.
    pub fn set_status(&self, stream_id: &str, status: SessionStatus) {
        let mut sessions = self.inner.lock().unwrap();
        if let Some(entry) = sessions.get_mut(stream_id) {
            entry.status = status;
        }
    }

    /// Drop a session's entry. Called exactly once, by the session's
    /// own worker, at teardown.
    pub fn remove(&self, stream_id: &str) {
        let removed = self.inner.lock().unwrap().remove(stream_id);
        if removed.is_some() {
            info!(stream_id, "capture session removed from registry");
        }
    }

    pub fn status(&self, stream_id: &str) -> Option<SessionStatus> {
        self.inner
            .lock()
            .unwrap()
            .get(stream_id)
            .map(|entry| entry.status)
    }

    pub fn target(&self, stream_id: &str) -> Option<CaptureTarget> {
        self.inner
            .lock()
            .unwrap()
            .get(stream_id)
            .map(|entry| entry.target.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
