// One-way notification channel to the display collaborator.
//
// The capture path never waits on the display: sends are unbounded and
// a closed receiver is ignored.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::debug;

use crate::capture::Track;

/// Events delivered to the display, keyed by media stream id.
#[derive(Debug, Clone)]
pub enum DisplayEvent {
    /// A session produced its first frame; show a panel for it.
    PanelOpened {
        stream_id: String,
        started_at: DateTime<Utc>,
    },
    /// Fresh magnitude spectrum for one lane of one session.
    Spectrum {
        stream_id: String,
        track: Track,
        magnitudes: Vec<f32>,
    },
    /// The session closed; remove its panel.
    PanelClosed { stream_id: String },
}

/// Fire-and-forget sender half handed to the capture pipeline.
#[derive(Clone)]
pub struct DisplayHandle {
    tx: Option<mpsc::UnboundedSender<DisplayEvent>>,
}

impl DisplayHandle {
    /// Create a handle and the receiver the display drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DisplayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A handle that drops every event, for embeddings with no display.
    pub fn null() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, event: DisplayEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                // Display is gone; capture carries on without it.
                debug!("display receiver dropped, event discarded");
            }
        }
    }
}
