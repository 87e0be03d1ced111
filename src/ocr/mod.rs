//! OCR engines behind one capability: image in, text out.
//!
//! | Engine | Backend | When to use |
//! |--------|---------|-------------|
//! | [`TesseractEngine`] | local `tesseract` binary | offline, free, printed text |
//! | [`VisionEngine`] | vision LLM via `edgequake-llm` | handwriting, poor scans |
//! | [`RetryingEngine`] | wraps either | flaky networks or rate limits |
//!
//! The batch driver only sees `Arc<dyn OcrEngine>`; which engine it gets is
//! decided once by [`build_engine`] from [`crate::config::BatchConfig`].

pub mod retry;
pub mod tesseract;
pub mod vision;

pub use retry::RetryingEngine;
pub use tesseract::TesseractEngine;
pub use vision::VisionEngine;

use crate::config::{BatchConfig, OcrBackend};
use crate::error::{Ocr2PdfError, OcrError};
use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;
use tracing::info;

/// Extracts the text of one page image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Recognise the text on `image`. An empty string means no text was found.
    async fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Resolve the engine for a batch.
///
/// A pre-built [`BatchConfig::engine`] wins; otherwise the engine named by
/// [`BatchConfig::backend`] is constructed and probed, so a missing binary or
/// API key stops the batch before the first file. Wrapped in a
/// [`RetryingEngine`] when `max_retries > 0`.
pub async fn build_engine(config: &BatchConfig) -> Result<Arc<dyn OcrEngine>, Ocr2PdfError> {
    let base: Arc<dyn OcrEngine> = match (&config.engine, &config.backend) {
        (Some(engine), _) => Arc::clone(engine),
        (None, OcrBackend::Tesseract(opts)) => {
            let engine = TesseractEngine::new(opts.clone());
            let version = engine
                .version()
                .await
                .map_err(|e| Ocr2PdfError::ProviderNotConfigured {
                    provider: "tesseract".to_string(),
                    hint: format!(
                        "{e}\nInstall tesseract-ocr or pass --tesseract-bin /path/to/tesseract."
                    ),
                })?;
            info!("Using {}", version);
            Arc::new(engine)
        }
        (None, OcrBackend::Vision(opts)) => Arc::new(VisionEngine::from_options(opts)?),
    };

    if config.max_retries > 0 {
        Ok(Arc::new(RetryingEngine::new(
            base,
            config.max_retries,
            config.retry_backoff_ms,
        )))
    } else {
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TesseractOptions;

    struct FixedEngine;

    #[async_trait]
    impl OcrEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn extract_text(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            Ok("fixed".into())
        }
    }

    #[tokio::test]
    async fn prebuilt_engine_wins() {
        let config = BatchConfig::builder()
            .engine(Arc::new(FixedEngine))
            .build()
            .unwrap();
        let engine = build_engine(&config).await.unwrap();
        assert_eq!(engine.name(), "fixed");
    }

    #[tokio::test]
    async fn retries_wrap_engine() {
        let config = BatchConfig::builder()
            .engine(Arc::new(FixedEngine))
            .max_retries(2)
            .build()
            .unwrap();
        let engine = build_engine(&config).await.unwrap();
        assert_eq!(engine.name(), "fixed+retry");
    }

    #[tokio::test]
    async fn missing_tesseract_is_fatal() {
        let config = BatchConfig::builder()
            .backend(OcrBackend::Tesseract(TesseractOptions {
                binary: "definitely-not-a-real-tesseract-binary".into(),
                ..TesseractOptions::default()
            }))
            .build()
            .unwrap();
        let err = build_engine(&config).await.err().unwrap();
        assert!(matches!(err, Ocr2PdfError::ProviderNotConfigured { .. }));
    }
}
