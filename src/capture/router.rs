// Classifies demuxed frames by track and feeds the lane accumulators
// and the live spectrum display.

use tracing::debug;

use crate::audio::magnitude_spectrum;
use crate::contact::CaptureTarget;
use crate::display::{DisplayEvent, DisplayHandle};
use crate::source::{CUSTOMER_TRACK_LABEL, OPERATOR_TRACK_LABEL};

/// The two audio lanes of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    /// Audio from the customer.
    Customer,
    /// Audio played to the customer.
    Operator,
}

impl Track {
    /// Map a demuxer track label onto a lane. Labels outside the two
    /// known constants have no lane.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            CUSTOMER_TRACK_LABEL => Some(Track::Customer),
            OPERATOR_TRACK_LABEL => Some(Track::Operator),
            _ => None,
        }
    }

    /// Output file suffix for this lane.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Track::Customer => "cu",
            Track::Operator => "op",
        }
    }
}

/// Per-session frame router: two append-only lane buffers plus the
/// fire-and-forget spectrum feed. Owned by the session's worker, so no
/// locking is needed.
pub struct FrameRouter {
    target: CaptureTarget,
    display: DisplayHandle,
    panel_opened: bool,
    customer: Vec<u8>,
    operator: Vec<u8>,
}

impl FrameRouter {
    pub fn new(target: CaptureTarget, display: DisplayHandle) -> Self {
        Self {
            target,
            display,
            panel_opened: false,
            customer: Vec::new(),
            operator: Vec::new(),
        }
    }

    /// Route one frame. Unknown labels are dropped without touching
    /// either lane.
    pub fn route(&mut self, label: &str, bytes: &[u8]) {
        let track = match Track::from_label(label) {
            Some(track) => track,
            None => {
                debug!(label, "unrecognized track label, frame dropped");
                return;
            }
        };

        if !self.panel_opened {
            self.display.send(DisplayEvent::PanelOpened {
                stream_id: self.target.stream_id.clone(),
                started_at: self.target.started_at,
            });
            self.panel_opened = true;
        }

        match track {
            Track::Customer => self.customer.extend_from_slice(bytes),
            Track::Operator => self.operator.extend_from_slice(bytes),
        }

        let magnitudes = magnitude_spectrum(bytes);
        if !magnitudes.is_empty() {
            self.display.send(DisplayEvent::Spectrum {
                stream_id: self.target.stream_id.clone(),
                track,
                magnitudes,
            });
        }
    }

    pub fn lane(&self, track: Track) -> &[u8] {
        match track {
            Track::Customer => &self.customer,
            Track::Operator => &self.operator,
        }
    }

    /// Close the display panel (if one was opened) and yield the two
    /// lane accumulators for finalization.
    pub fn finish(self) -> (Vec<u8>, Vec<u8>) {
        if self.panel_opened {
            self.display.send(DisplayEvent::PanelClosed {
                stream_id: self.target.stream_id.clone(),
            });
        }
        (self.customer, self.operator)
    }
}
