//! Batch conversion entry points.
//!
//! [`convert_batch`] is the primary API: discover every PDF in the input
//! directory, convert them one after another, and return a [`BatchReport`].
//! Use [`crate::stream::convert_batch_stream`] instead to observe each file as
//! it finishes.
//!
//! Per-file work goes through a [`Converter`], which owns the OCR engine and
//! rasteriser for the batch so that both are resolved once, not per file.

use crate::config::{BatchConfig, FailurePolicy};
use crate::error::{ConversionError, Ocr2PdfError};
use crate::layout::paginate;
use crate::ocr::{build_engine, OcrEngine};
use crate::output::{BatchReport, FileFailure, FileReport};
use crate::pipeline::discover::{
    check_pdf_magic, discover_pdfs, ensure_output_dir, output_path_for,
};
use crate::pipeline::postprocess::clean_ocr_text;
use crate::pipeline::preprocess::preprocess_page;
use crate::pipeline::render::{spawn_render, PdfiumRasterizer, Rasterizer, RenderOptions};
use crate::pipeline::sink::write_document;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// OCR text of one input PDF, with the number of source pages it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrText {
    pub text: String,
    pub source_pages: usize,
}

/// Converts single files with the engine and rasteriser of one batch.
pub struct Converter {
    config: BatchConfig,
    engine: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl Converter {
    /// Validate `config` and resolve its OCR engine and rasteriser.
    ///
    /// # Errors
    /// Fatal setup errors only: invalid configuration, OCR backend not
    /// available, pdfium library not found.
    pub async fn new(config: &BatchConfig) -> Result<Self, Ocr2PdfError> {
        config.validate()?;
        let engine = build_engine(config).await?;

        let rasterizer: Arc<dyn Rasterizer> = match config.rasterizer {
            Some(ref r) => Arc::clone(r),
            None => {
                let lib_dir = config.pdfium_lib_path.clone();
                let r = tokio::task::spawn_blocking(move || PdfiumRasterizer::new(lib_dir))
                    .await
                    .map_err(|e| Ocr2PdfError::Internal(format!("pdfium probe panicked: {e}")))??;
                Arc::new(r)
            }
        };

        Ok(Self {
            config: config.clone(),
            engine,
            rasterizer,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<dyn OcrEngine> {
        &self.engine
    }

    /// Rasterise and recognise every page of `path`.
    ///
    /// Page `i` contributes `page_header.render(i)` followed by its cleaned
    /// text. Pages are rendered and recognised one at a time.
    pub async fn ocr_document(&self, path: &Path) -> Result<OcrText, ConversionError> {
        check_pdf_magic(path)?;

        let (mut pages, render_task) = spawn_render(
            Arc::clone(&self.rasterizer),
            path.to_path_buf(),
            RenderOptions::from_config(&self.config),
        );

        let mut text = String::new();
        let mut source_pages = 0;
        while let Some(item) = pages.recv().await {
            let page = item?;
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_page_ocr(path, page.page_num, page.total_pages);
            }

            let image = if self.config.preprocess {
                preprocess_page(&page.image)
            } else {
                page.image
            };

            let raw = self.engine.extract_text(&image).await.map_err(|e| {
                ConversionError::OcrFailed {
                    page: page.page_num,
                    detail: e.to_string(),
                }
            })?;
            let page_text = if self.config.clean_text {
                clean_ocr_text(&raw)
            } else {
                raw
            };
            debug!(
                "{} page {}/{}: {} chars",
                path.display(),
                page.page_num,
                page.total_pages,
                page_text.len()
            );

            text.push_str(&self.config.page_header.render(page.page_num));
            text.push_str(&page_text);
            source_pages += 1;
        }

        render_task
            .await
            .map_err(|e| ConversionError::Internal(format!("render task failed: {e}")))?;

        Ok(OcrText { text, source_pages })
    }

    /// OCR `input` and write the repaginated text PDF to `output`.
    pub async fn convert_file(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<FileReport, ConversionError> {
        let start = Instant::now();
        let ocr = self.ocr_document(input).await?;

        let document = paginate(&ocr.text, &self.config.geometry)
            .map_err(|e| ConversionError::Internal(e.to_string()))?;
        let lines = document.line_count();

        let geometry = self.config.geometry;
        let title = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out = output.to_path_buf();
        let output_pages = tokio::task::spawn_blocking(move || {
            write_document(&document, &geometry, &title, &out)
        })
        .await
        .map_err(|e| ConversionError::Internal(format!("PDF writer panicked: {e}")))?
        .map_err(|e| ConversionError::PdfWriteFailed {
            path: output.to_path_buf(),
            detail: e.to_string(),
        })?;

        Ok(FileReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            source_pages: ocr.source_pages,
            output_pages,
            lines,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Convert the `index`-th of `total` batch files, reporting progress.
    pub(crate) async fn run_file(
        &self,
        input: &Path,
        index: usize,
        total: usize,
    ) -> Result<FileReport, FileFailure> {
        let output = output_path_for(input, &self.config.output_dir, &self.config.output_suffix);
        info!("[{}/{}] {}", index, total, input.display());
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_file_start(input, index, total);
        }

        match self.convert_file(input, &output).await {
            Ok(report) => {
                info!(
                    "Wrote {} ({} source page(s) → {} page(s), {}ms)",
                    report.output.display(),
                    report.source_pages,
                    report.output_pages,
                    report.duration_ms
                );
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_file_complete(input, &report.output, report.output_pages);
                }
                Ok(report)
            }
            Err(error) => {
                warn!("Failed {}: {}", input.display(), error);
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_file_error(input, &error.to_string());
                }
                Err(FileFailure {
                    input: input.to_path_buf(),
                    error,
                })
            }
        }
    }
}

/// Validate, create the output directory, and discover the batch inputs.
pub(crate) fn prepare_batch(config: &BatchConfig) -> Result<Vec<PathBuf>, Ocr2PdfError> {
    config.validate()?;
    ensure_output_dir(&config.output_dir)?;
    let inputs = discover_pdfs(&config.input_dir)?;
    info!(
        "Found {} PDF(s) in {}",
        inputs.len(),
        config.input_dir.display()
    );
    Ok(inputs)
}

/// Convert every PDF in `config.input_dir` into a text PDF in `config.output_dir`.
///
/// Files are processed sequentially, pages within a file likewise.
///
/// # Returns
/// `Ok(BatchReport)` once every file has been attempted, even if some failed
/// under [`FailurePolicy::SkipAndContinue`] (check `report.failures`).
///
/// # Errors
/// Returns `Err(Ocr2PdfError)` only for fatal errors:
/// - invalid configuration (checked before any file is touched)
/// - input directory unreadable / output directory not creatable
/// - OCR backend or pdfium unavailable
/// - a file failed under [`FailurePolicy::Abort`]
///
/// # Example
/// ```rust,no_run
/// use edgequake_ocr2pdf::{convert_batch, BatchConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BatchConfig::default(); // answer_sheet → extracted_pdfs
/// let report = convert_batch(&config).await?;
/// eprintln!("{} converted, {} failed", report.stats.succeeded, report.stats.failed);
/// # Ok(())
/// # }
/// ```
pub async fn convert_batch(config: &BatchConfig) -> Result<BatchReport, Ocr2PdfError> {
    let total_start = Instant::now();
    let inputs = prepare_batch(config)?;
    let total = inputs.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut report = BatchReport::default();
    if total > 0 {
        let converter = Converter::new(config).await?;
        for (i, input) in inputs.iter().enumerate() {
            let outcome = converter.run_file(input, i + 1, total).await;
            if let Err(ref failure) = outcome {
                if config.failure_policy == FailurePolicy::Abort {
                    return Err(Ocr2PdfError::Aborted {
                        path: failure.input.clone(),
                        source: failure.error.clone(),
                    });
                }
            }
            report.record(outcome);
        }
    }
    report.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Batch complete: {} succeeded, {} failed, {}ms",
        report.stats.succeeded, report.stats.failed, report.stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(report.stats.succeeded, report.stats.failed);
    }

    Ok(report)
}

/// Synchronous wrapper around [`convert_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_batch_sync(config: &BatchConfig) -> Result<BatchReport, Ocr2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Ocr2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_batch(config))
}

/// The PDFs a batch would convert, without converting anything.
///
/// Needs neither an OCR backend nor pdfium.
pub fn list_inputs(config: &BatchConfig) -> Result<Vec<PathBuf>, Ocr2PdfError> {
    discover_pdfs(&config.input_dir)
}
