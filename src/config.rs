use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    /// Region the event and media streams live in.
    pub region: String,
    /// Name of the contact-event stream to poll.
    pub stream_name: String,
    /// Additional attempts per remote call after the first.
    pub max_retry_count: u32,
    /// Pause between retry attempts, in milliseconds.
    pub retry_interval_ms: u64,
    /// Pause between record fetches, in milliseconds.
    pub poll_interval_ms: u64,
    /// Directory the per-lane WAV files are written to.
    pub output_dir: PathBuf,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capture.region.is_empty() {
            bail!("capture.region must not be empty");
        }
        if self.capture.stream_name.is_empty() {
            bail!("capture.stream_name must not be empty");
        }
        if self.capture.output_dir.as_os_str().is_empty() {
            bail!("capture.output_dir must not be empty");
        }
        Ok(())
    }
}

impl CaptureConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retry_count,
            Duration::from_millis(self.retry_interval_ms),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
