//! # edgequake-ocr2pdf
//!
//! Batch-convert scanned PDFs (answer sheets, forms, letters) into plain,
//! searchable text PDFs.
//!
//! ## Pipeline Overview
//!
//! ```text
//! answer_sheet/*.pdf
//!  │
//!  ├─ 1. Discover  list *.pdf (any case) in the input folder
//!  ├─ 2. Render    rasterise each page via pdfium (spawn_blocking)
//!  ├─ 3. OCR       tesseract or a vision LLM, one page at a time
//!  ├─ 4. Clean     strip form feeds, fences, trailing whitespace
//!  ├─ 5. Layout    repaginate the text onto fixed-size pages
//!  └─ 6. Write     extracted_pdfs/<name>_ocr.pdf (atomic write)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_ocr2pdf::{convert_batch, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder()
//!         .input_dir("answer_sheet")
//!         .output_dir("extracted_pdfs")
//!         .build()?;
//!     let report = convert_batch(&config).await?;
//!     for failure in &report.failures {
//!         eprintln!("skipped {failure}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Layout Only
//!
//! The repagination step is usable without pdfium or an OCR engine:
//!
//! ```rust
//! use edgequake_ocr2pdf::{paginate, PageGeometry};
//!
//! let text = vec!["X"; 150].join("\n");
//! let doc = paginate(&text, &PageGeometry::letter()).unwrap();
//! assert_eq!(doc.page_count(), 3);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocr2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-ocr2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    BatchConfig, BatchConfigBuilder, FailurePolicy, OcrBackend, PageHeader, TesseractOptions,
    VisionOptions,
};
pub use convert::{convert_batch, convert_batch_sync, list_inputs, Converter, OcrText};
pub use error::{ConversionError, Ocr2PdfError, OcrError};
pub use layout::{paginate, Document, PageBuffer, PageGeometry, Paginator, PlacedLine};
pub use ocr::{build_engine, OcrEngine, RetryingEngine, TesseractEngine, VisionEngine};
pub use output::{BatchReport, BatchStats, FileFailure, FileReport};
pub use pipeline::render::{PdfiumRasterizer, Rasterizer, RenderOptions, RenderedPage};
pub use pipeline::sink::{emit_document, write_document, PdfSink, PrintPdfSink, SinkError};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_batch_stream, FileStream};
