use anyhow::{Context, Result};
use hound::WavReader;
use std::path::Path;

use super::finalize::SAMPLE_RATE;

/// A finalized lane read back from disk.
pub struct LaneAudio {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl LaneAudio {
    /// Open a lane WAV file and decode its samples.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let reader =
            WavReader::open(path).with_context(|| format!("failed to open lane WAV {:?}", path))?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read lane samples")?;

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Whether the file carries the capture pipeline's output format
    /// (mono, 8 kHz).
    pub fn is_capture_format(&self) -> bool {
        self.channels == 1 && self.sample_rate == SAMPLE_RATE
    }
}
