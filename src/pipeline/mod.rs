//! Pipeline stages for scanned-PDF-to-text-PDF conversion.
//!
//! Each submodule implements one transformation step, testable on its own.
//! The OCR step itself lives in [`crate::ocr`] and the repagination in
//! [`crate::layout`].
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ render ──▶ preprocess ──▶ OCR ──▶ postprocess ──▶ layout ──▶ sink
//! (folder)    (pdfium)   (optional)    (engine)  (cleanup)     (paginate) (printpdf)
//! ```
//!
//! 1. [`discover`]: list `*.pdf` inputs and name their outputs
//! 2. [`render`]: rasterise pages on the blocking pool, one page in flight
//! 3. [`preprocess`]: grayscale + contrast boost for faint scans
//! 4. [`encode`]: PNG bytes for tesseract, base64 `ImageData` for vision APIs
//! 5. [`postprocess`]: strip engine artefacts from the recognised text
//! 6. [`sink`]: replay laid-out pages into a PDF and write it atomically

pub mod discover;
pub mod encode;
pub mod postprocess;
pub mod preprocess;
pub mod render;
pub mod sink;
