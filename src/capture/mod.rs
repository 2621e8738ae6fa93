//! Per-contact capture sessions
//!
//! Each dispatched contact gets one `CaptureSession` task that:
//! - resolves a media endpoint and opens the feed
//! - routes demuxed frames into the two lane accumulators
//! - feeds the live spectrum display
//! - renders both lanes to WAV files at feed end

mod router;
mod session;

pub use router::{FrameRouter, Track};
pub use session::CaptureSession;
