pub mod audio;
pub mod capture;
pub mod config;
pub mod contact;
pub mod display;
pub mod poller;
pub mod registry;
pub mod retry;
pub mod source;

pub use audio::{lane_file_name, magnitude_spectrum, write_lane_wav, LaneAudio};
pub use capture::{CaptureSession, FrameRouter, Track};
pub use config::Config;
pub use contact::{capture_target, CaptureTarget};
pub use display::{DisplayEvent, DisplayHandle};
pub use poller::EventPoller;
pub use registry::{SessionRegistry, SessionStatus};
pub use retry::RetryPolicy;
pub use source::{
    EventRecord, EventSource, FrameFeed, MediaFrame, MediaSource, RecordBatch, RemoteError,
    CUSTOMER_TRACK_LABEL, OPERATOR_TRACK_LABEL,
};
