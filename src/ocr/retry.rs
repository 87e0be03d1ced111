//! Bounded retries around any [`OcrEngine`].
//!
//! HTTP 429 / 503 from vision APIs are transient. Exponential backoff
//! (`backoff_ms * 2^(attempt-1)`): with 500 ms base and 3 retries the waits
//! are 500 ms → 1 s → 2 s per page. A missing engine is not transient and is
//! returned at once.

use super::OcrEngine;
use crate::error::OcrError;
use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::warn;

/// Retries the inner engine up to `max_retries` extra times.
pub struct RetryingEngine {
    inner: Arc<dyn OcrEngine>,
    name: String,
    max_retries: u32,
    backoff_ms: u64,
}

impl RetryingEngine {
    pub fn new(inner: Arc<dyn OcrEngine>, max_retries: u32, backoff_ms: u64) -> Self {
        let name = format!("{}+retry", inner.name());
        Self {
            inner,
            name,
            max_retries,
            backoff_ms,
        }
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

#[async_trait]
impl OcrEngine for RetryingEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let mut attempt = 0;
        loop {
            match self.inner.extract_text(image).await {
                Ok(text) => return Ok(text),
                Err(e @ OcrError::EngineUnavailable { .. }) => return Err(e),
                Err(e) if attempt >= self.max_retries => return Err(e),
                Err(e) => {
                    attempt += 1;
                    let backoff = self.backoff_for(attempt);
                    warn!(
                        "{}: attempt {} failed ({}); retry {}/{} after {:?}",
                        self.inner.name(),
                        attempt,
                        e,
                        attempt,
                        self.max_retries,
                        backoff
                    );
                    sleep(backoff).await;
                }
            }
        }
    }
}
