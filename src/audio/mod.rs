pub mod file;
pub mod finalize;
pub mod spectrum;

pub use file::LaneAudio;
pub use finalize::{lane_file_name, write_lane_wav, SAMPLE_RATE};
pub use spectrum::magnitude_spectrum;
