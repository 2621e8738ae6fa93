use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

use crate::source::RemoteError;

/// Bounded-retry policy applied to every remote call in the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first (so at most `max_retries + 1`
    /// attempts total).
    pub max_retries: u32,
    /// Pause between attempts.
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, interval: Duration) -> Self {
        Self {
            max_retries,
            interval,
        }
    }

    /// Run `op` until it succeeds, fails fatally, or retries are
    /// exhausted. Returns `None` when no result could be obtained; the
    /// caller aborts its own unit of work only.
    ///
    /// Every failure is logged with the collaborator's code, message,
    /// and retryability before the executor continues or gives up.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        for attempt in 1..=self.max_retries + 1 {
            match op().await {
                Ok(value) => return Some(value),
                Err(e) => {
                    warn!(
                        call = label,
                        attempt,
                        code = e.code.as_deref().unwrap_or("-"),
                        retryable = e.retryable,
                        "remote call failed: {}",
                        e.message
                    );
                    if !e.retryable {
                        error!(call = label, "non-retryable failure, giving up");
                        return None;
                    }
                }
            }

            if attempt <= self.max_retries {
                tokio::time::sleep(self.interval).await;
            }
        }

        error!(
            call = label,
            attempts = self.max_retries + 1,
            "retries exhausted"
        );
        None
    }
}
