//! Progress-callback trait for per-file and per-page batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to follow a long
//! batch: which file is being converted, which of its pages is in OCR, and
//! how each file ended.
//!
//! # Example
//!
//! ```rust
//! use edgequake_ocr2pdf::{BatchConfig, BatchProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_page_ocr(&self, file: &Path, page_num: usize, total_pages: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}: page {}/{}", file.display(), page_num, total_pages);
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { pages: AtomicUsize::new(0) });
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(cb as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the batch driver as it works through files and pages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Files are processed sequentially, but the trait is
/// `Send + Sync` so a callback can be shared with other tasks.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after discovery, before the first file.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is rasterised.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position of the file in the batch
    fn on_file_start(&self, file: &Path, index: usize, total_files: usize) {
        let _ = (file, index, total_files);
    }

    /// Called just before a page image is sent to the OCR engine.
    fn on_page_ocr(&self, file: &Path, page_num: usize, total_pages: usize) {
        let _ = (file, page_num, total_pages);
    }

    /// Called when the output PDF for `file` has been written.
    fn on_file_complete(&self, file: &Path, output: &Path, pages_written: usize) {
        let _ = (file, output, pages_written);
    }

    /// Called when a file fails.
    fn on_file_error(&self, file: &Path, error: &str) {
        let _ = (file, error);
    }

    /// Called once after all files have been attempted.
    fn on_batch_complete(&self, succeeded: usize, failed: usize) {
        let _ = (succeeded, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        files: AtomicUsize,
        pages: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_file_start(&self, _file: &Path, _index: usize, _total: usize) {
            self.files.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_ocr(&self, _file: &Path, _page: usize, _total: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _file: &Path, _output: &Path, _pages: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _file: &Path, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        let f = Path::new("a.pdf");
        cb.on_batch_start(2);
        cb.on_file_start(f, 1, 2);
        cb.on_page_ocr(f, 1, 3);
        cb.on_file_complete(f, Path::new("out/a_ocr.pdf"), 1);
        cb.on_file_error(f, "boom");
        cb.on_batch_complete(1, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let t = TrackingCallback::default();
        let f = Path::new("sheet.pdf");
        t.on_file_start(f, 1, 1);
        t.on_page_ocr(f, 1, 2);
        t.on_page_ocr(f, 2, 2);
        t.on_file_complete(f, Path::new("sheet_ocr.pdf"), 1);

        assert_eq!(t.files.load(Ordering::SeqCst), 1);
        assert_eq!(t.pages.load(Ordering::SeqCst), 2);
        assert_eq!(t.completes.load(Ordering::SeqCst), 1);
        assert_eq!(t.errors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_page_ocr(Path::new("x.pdf"), 1, 10);
    }
}
