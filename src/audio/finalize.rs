// Renders one lane's accumulated bytes into a standalone WAV file.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::capture::Track;

/// Sample rate of the captured telephony audio.
pub const SAMPLE_RATE: u32 = 8000;

const WAV_SPEC: hound::WavSpec = hound::WavSpec {
    channels: 1,
    sample_rate: SAMPLE_RATE,
    bits_per_sample: 16,
    sample_format: hound::SampleFormat::Int,
};

/// File name for one lane of a session: the start timestamp plus the
/// lane suffix, e.g. `2023-11-14-22-13-20-000-cu.wav`.
pub fn lane_file_name(started_at: DateTime<Utc>, track: Track) -> String {
    format!(
        "{}-{}.wav",
        started_at.format("%Y-%m-%d-%H-%M-%S-%3f"),
        track.file_suffix()
    )
}

/// Write one lane's raw PCM bytes (16-bit little-endian, mono, 8 kHz)
/// as a WAV file under `dir`. All-or-nothing per lane: a failure here
/// never touches the sibling lane.
pub fn write_lane_wav(
    dir: &Path,
    started_at: DateTime<Utc>,
    track: Track,
    pcm: &[u8],
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {:?}", dir))?;

    let path = dir.join(lane_file_name(started_at, track));

    if pcm.len() % 2 != 0 {
        warn!(
            path = %path.display(),
            bytes = pcm.len(),
            "lane byte count is odd, dropping trailing byte"
        );
    }

    let mut writer = hound::WavWriter::create(&path, WAV_SPEC)
        .with_context(|| format!("failed to create WAV file {:?}", path))?;

    for sample in pcm.chunks_exact(2) {
        writer
            .write_sample(i16::from_le_bytes([sample[0], sample[1]]))
            .context("failed to write sample to WAV")?;
    }

    writer.finalize().context("failed to finalize WAV file")?;

    info!(
        path = %path.display(),
        bytes = pcm.len(),
        track = ?track,
        "lane audio written"
    );

    Ok(path)
}
