//! Streaming batch API: emit one result per file as it finishes.
//!
//! A batch over a folder of scans takes minutes. [`convert_batch_stream`]
//! yields a `Result<FileReport, FileFailure>` as soon as each output PDF is
//! written, so callers can report progress or move files along without
//! waiting for the whole folder. Files still run one at a time, in discovery
//! order.

use crate::config::{BatchConfig, FailurePolicy};
use crate::convert::{prepare_batch, Converter};
use crate::error::Ocr2PdfError;
use crate::output::{FileFailure, FileReport};
use futures::future;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;

/// A boxed stream of per-file results.
pub type FileStream = Pin<Box<dyn Stream<Item = Result<FileReport, FileFailure>> + Send>>;

/// Convert every PDF in `config.input_dir`, streaming file results.
///
/// Under [`FailurePolicy::Abort`] the failing file is the last item yielded.
/// `on_batch_start` fires before this returns; `on_batch_complete` is left to
/// the caller, who knows when it stops polling.
///
/// # Returns
/// - `Ok(FileStream)`: one item per attempted file
/// - `Err(Ocr2PdfError)`: fatal setup error (bad config, unreadable input
///   directory, OCR backend or pdfium unavailable)
///
/// # Example
/// ```rust,no_run
/// use edgequake_ocr2pdf::{convert_batch_stream, BatchConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BatchConfig::default();
/// let mut files = convert_batch_stream(&config).await?;
/// while let Some(item) = files.next().await {
///     match item {
///         Ok(report) => println!("{}", report.output.display()),
///         Err(failure) => eprintln!("{failure}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert_batch_stream(config: &BatchConfig) -> Result<FileStream, Ocr2PdfError> {
    let inputs = prepare_batch(config)?;
    let total = inputs.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }
    if total == 0 {
        return Ok(Box::pin(stream::empty::<Result<FileReport, FileFailure>>()));
    }

    let converter = Arc::new(Converter::new(config).await?);
    let abort_on_failure = config.failure_policy == FailurePolicy::Abort;

    let s = stream::iter(inputs.into_iter().enumerate())
        .then(move |(i, input)| {
            let converter = Arc::clone(&converter);
            async move { converter.run_file(&input, i + 1, total).await }
        })
        .scan(false, move |stopped, item| {
            if *stopped {
                return future::ready(None);
            }
            if item.is_err() && abort_on_failure {
                *stopped = true;
            }
            future::ready(Some(item))
        });

    Ok(Box::pin(s))
}
