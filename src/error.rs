//! Error types for the edgequake-ocr2pdf library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`Ocr2PdfError`]: **Fatal**: the batch cannot start or must stop
//!   (degenerate page geometry, output directory cannot be created, OCR
//!   backend not configured). Returned as `Err(Ocr2PdfError)` from the
//!   top-level `convert_*` functions.
//!
//! * [`ConversionError`]: **Per file**: one input PDF could not be
//!   rasterised, recognised, or written. Under the default
//!   [`crate::config::FailurePolicy::SkipAndContinue`] it is recorded in the
//!   [`crate::output::BatchReport`] and the batch moves on.
//!
//! * [`OcrError`]: raised by an [`crate::ocr::OcrEngine`] for a single image;
//!   the driver wraps it into [`ConversionError::OcrFailed`] with the page
//!   number attached.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-ocr2pdf library.
#[derive(Debug, Error)]
pub enum Ocr2PdfError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or geometry validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Discovery errors ──────────────────────────────────────────────────
    /// The input directory does not exist or cannot be listed.
    #[error("Cannot read input directory '{path}': {source}")]
    InputDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Backend errors ────────────────────────────────────────────────────
    /// The configured vision provider is not initialised (missing API key etc.).
    #[error("OCR provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium system-wide, or set PDFIUM_LIB_PATH to the directory\n\
that contains libpdfium.so / libpdfium.dylib / pdfium.dll.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Batch errors ──────────────────────────────────────────────────────
    /// A file failed while the batch runs with [`crate::config::FailurePolicy::Abort`].
    #[error("Batch aborted at '{path}': {source}")]
    Aborted {
        path: PathBuf,
        #[source]
        source: ConversionError,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single input file.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ConversionError {
    /// The file exists but does not start with `%PDF`.
    #[error("not a PDF (first bytes: {magic:?})")]
    NotAPdf { magic: [u8; 4] },

    /// The file could not be opened or read.
    #[error("cannot read file: {detail}")]
    Unreadable { detail: String },

    /// pdfium could not parse the document.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { detail: String },

    /// The document is encrypted and no (or a wrong) password was given.
    #[error("PDF is encrypted; provide the password with --password")]
    PasswordRequired,

    /// Rasterisation of one page failed.
    #[error("page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The OCR engine failed on one page.
    #[error("page {page}: OCR failed: {detail}")]
    OcrFailed { page: usize, detail: String },

    /// The output PDF could not be built or written.
    #[error("cannot write '{path}': {detail}")]
    PdfWriteFailed { path: PathBuf, detail: String },

    /// Unexpected internal error (task panic etc.).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure of one OCR call.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine binary or service is missing.
    #[error("OCR engine '{engine}' is unavailable: {detail}")]
    EngineUnavailable { engine: String, detail: String },

    /// The engine ran but reported failure.
    #[error("OCR engine '{engine}' failed: {detail}")]
    ProcessFailed { engine: String, detail: String },

    /// Remote API call failed.
    #[error("OCR API error: {0}")]
    Api(String),

    /// The page image could not be prepared for the engine.
    #[error("image preparation failed: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
