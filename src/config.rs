//! Configuration types for batch OCR conversion.
//!
//! All batch behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Folders, page geometry, and the OCR backend are
//! explicit fields rather than process-wide constants, so two batches with
//! different settings can run side by side in one process.

use crate::error::Ocr2PdfError;
use crate::layout::PageGeometry;
use crate::ocr::OcrEngine;
use crate::pipeline::render::Rasterizer;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for one batch run.
///
/// Built via [`BatchConfig::builder()`] or using [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_ocr2pdf::{BatchConfig, PageGeometry};
///
/// let config = BatchConfig::builder()
///     .input_dir("scans")
///     .output_dir("scans/text")
///     .dpi(200)
///     .geometry(PageGeometry::a4())
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Directory scanned for `*.pdf` inputs. Default: `answer_sheet`.
    pub input_dir: PathBuf,

    /// Directory receiving the text PDFs; created if absent. Default: `extracted_pdfs`.
    pub output_dir: PathBuf,

    /// Appended to the input stem to name the output. Default: `_ocr`.
    pub output_suffix: String,

    /// Layout of the generated pages. Default: US Letter, 40 pt margin.
    pub geometry: PageGeometry,

    /// Rasterisation DPI. Range: 72–600. Default: 300.
    ///
    /// Tesseract is tuned for ~300 DPI input; lower values lose small print.
    pub dpi: u32,

    /// Cap on the longest rendered edge in pixels. Default: 4000.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted inputs.
    pub password: Option<String>,

    /// Which OCR engine to build when [`engine`](Self::engine) is `None`.
    pub backend: OcrBackend,

    /// Pre-constructed OCR engine. Takes precedence over `backend`.
    pub engine: Option<Arc<dyn OcrEngine>>,

    /// Pre-constructed rasteriser. Defaults to pdfium.
    pub rasterizer: Option<Arc<dyn Rasterizer>>,

    /// Directory holding the pdfium shared library. If None, the system library is used.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Grayscale + contrast pass on each page image before OCR. Default: false.
    pub preprocess: bool,

    /// Retries per page on OCR failure. Default: 0.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Normalise raw OCR text before layout. Default: true.
    pub clean_text: bool,

    /// Line inserted before each source page's text. Default: [`PageHeader::Reference`].
    pub page_header: PageHeader,

    /// What to do when one file fails. Default: [`FailurePolicy::SkipAndContinue`].
    pub failure_policy: FailurePolicy,

    /// Per-file / per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("answer_sheet"),
            output_dir: PathBuf::from("extracted_pdfs"),
            output_suffix: "_ocr".to_string(),
            geometry: PageGeometry::default(),
            dpi: 300,
            max_rendered_pixels: 4000,
            password: None,
            backend: OcrBackend::default(),
            engine: None,
            rasterizer: None,
            pdfium_lib_path: None,
            preprocess: false,
            max_retries: 0,
            retry_backoff_ms: 500,
            clean_text: true,
            page_header: PageHeader::default(),
            failure_policy: FailurePolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("output_suffix", &self.output_suffix)
            .field("geometry", &self.geometry)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("backend", &self.backend)
            .field("engine", &self.engine.as_ref().map(|e| e.name()))
            .field("rasterizer", &self.rasterizer.as_ref().map(|_| "<dyn Rasterizer>"))
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("preprocess", &self.preprocess)
            .field("max_retries", &self.max_retries)
            .field("clean_text", &self.clean_text)
            .field("page_header", &self.page_header)
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check constraints the builder cannot enforce by clamping.
    ///
    /// Public fields can be edited after `build()`, so the batch driver calls
    /// this again before touching any file.
    pub fn validate(&self) -> Result<(), Ocr2PdfError> {
        self.geometry.validate()?;
        if !(72..=600).contains(&self.dpi) {
            return Err(Ocr2PdfError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                self.dpi
            )));
        }
        if self.output_suffix.is_empty() && same_dir(&self.input_dir, &self.output_dir) {
            return Err(Ocr2PdfError::InvalidConfig(
                "empty output suffix with output dir == input dir would overwrite the inputs"
                    .into(),
            ));
        }
        if let OcrBackend::Tesseract(ref t) = self.backend {
            if t.language.trim().is_empty() {
                return Err(Ocr2PdfError::InvalidConfig(
                    "tesseract language must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

/// `true` when both paths name the same directory.
///
/// Resolves symlinks when both exist; otherwise compares absolute paths, so
/// `scans` and `./scans` match before the output folder is created.
fn same_dir(a: &Path, b: &Path) -> bool {
    if let (Ok(ca), Ok(cb)) = (a.canonicalize(), b.canonicalize()) {
        return ca == cb;
    }
    match (std::path::absolute(a), std::path::absolute(b)) {
        (Ok(aa), Ok(ab)) => aa == ab,
        _ => a == b,
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.output_suffix = suffix.into();
        self
    }

    pub fn geometry(mut self, geometry: PageGeometry) -> Self {
        self.config.geometry = geometry;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn backend(mut self, backend: OcrBackend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn preprocess(mut self, v: bool) -> Self {
        self.config.preprocess = v;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn clean_text(mut self, v: bool) -> Self {
        self.config.clean_text = v;
        self
    }

    pub fn page_header(mut self, header: PageHeader) -> Self {
        self.config.page_header = header;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, Ocr2PdfError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which OCR engine the batch builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OcrBackend {
    /// Local `tesseract` binary.
    Tesseract(TesseractOptions),
    /// Vision LLM behind an API (OpenAI, Anthropic, Gemini, Ollama, …).
    Vision(VisionOptions),
}

impl Default for OcrBackend {
    fn default() -> Self {
        OcrBackend::Tesseract(TesseractOptions::default())
    }
}

/// Options for the local tesseract engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TesseractOptions {
    /// Executable name or path. Default: `tesseract`.
    pub binary: PathBuf,
    /// Language pack(s), e.g. `eng` or `eng+deu`. Default: `eng`.
    pub language: String,
    /// Page segmentation mode. Default: 3 (fully automatic).
    pub psm: u8,
}

impl Default for TesseractOptions {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            psm: 3,
        }
    }
}

/// Options for the vision-LLM engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionOptions {
    /// Provider name (e.g. "openai", "anthropic", "ollama"). If None, auto-detected.
    pub provider_name: Option<String>,
    /// Model identifier. If None, `gpt-4.1-nano`.
    pub model: Option<String>,
    /// Custom system prompt. If None, uses the built-in transcription prompt.
    pub system_prompt: Option<String>,
    /// Maximum tokens per page. Default: 4096.
    pub max_tokens: usize,
}

impl Default for VisionOptions {
    fn default() -> Self {
        Self {
            provider_name: None,
            model: None,
            system_prompt: None,
            max_tokens: 4096,
        }
    }
}

/// Line inserted before the OCR text of each source page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PageHeader {
    /// No header; source pages separated by a blank line.
    None,
    /// `--- Page N ---` preceded by two blank lines. (default)
    #[default]
    Reference,
    /// Custom header; `{n}` is replaced by the 1-indexed page number.
    Custom(String),
}

impl PageHeader {
    /// Text placed before page `page_num` (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageHeader::None if page_num <= 1 => String::new(),
            PageHeader::None => "\n\n".to_string(),
            PageHeader::Reference => format!("\n\n--- Page {} ---\n", page_num),
            PageHeader::Custom(t) => format!("\n\n{}\n", t.replace("{n}", &page_num.to_string())),
        }
    }
}

/// What the batch does when one file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Log, record in the report, continue with the next file. (default)
    #[default]
    SkipAndContinue,
    /// Stop the batch with [`Ocr2PdfError::Aborted`].
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_folders() {
        let c = BatchConfig::default();
        assert_eq!(c.input_dir, PathBuf::from("answer_sheet"));
        assert_eq!(c.output_dir, PathBuf::from("extracted_pdfs"));
        assert_eq!(c.output_suffix, "_ocr");
        assert_eq!(c.dpi, 300);
        assert_eq!(c.failure_policy, FailurePolicy::SkipAndContinue);
        assert!(matches!(c.backend, OcrBackend::Tesseract(_)));
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = BatchConfig::builder().dpi(10).build().unwrap();
        assert_eq!(c.dpi, 72);
        let c = BatchConfig::builder().dpi(5000).build().unwrap();
        assert_eq!(c.dpi, 600);
    }

    #[test]
    fn builder_rejects_degenerate_geometry() {
        let g = PageGeometry {
            page_height: 60.0,
            margin: 30.0,
            ..PageGeometry::letter()
        };
        let err = BatchConfig::builder().geometry(g).build().unwrap_err();
        assert!(matches!(err, Ocr2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_self_overwrite() {
        let err = BatchConfig::builder()
            .input_dir("scans")
            .output_dir("scans")
            .output_suffix("")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("overwrite"));
    }

    #[test]
    fn self_overwrite_detected_through_path_spelling() {
        for output in ["./scans", "scans/", "scans/./"] {
            let err = BatchConfig::builder()
                .input_dir("scans")
                .output_dir(output)
                .output_suffix("")
                .build()
                .unwrap_err();
            assert!(matches!(err, Ocr2PdfError::InvalidConfig(_)), "{output}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn self_overwrite_detected_through_symlink() {
        let dir = tempfile::TempDir::new().unwrap();
        let scans = dir.path().join("scans");
        std::fs::create_dir(&scans).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&scans, &link).unwrap();

        let err = BatchConfig::builder()
            .input_dir(&scans)
            .output_dir(&link)
            .output_suffix("")
            .build()
            .unwrap_err();
        assert!(matches!(err, Ocr2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn empty_suffix_allowed_for_distinct_dirs() {
        assert!(BatchConfig::builder()
            .input_dir("scans")
            .output_dir("./text")
            .output_suffix("")
            .build()
            .is_ok());
    }

    #[test]
    fn validate_catches_post_build_edits() {
        let mut c = BatchConfig::default();
        c.dpi = 5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn reference_header_matches_layout() {
        assert_eq!(PageHeader::Reference.render(1), "\n\n--- Page 1 ---\n");
        assert_eq!(PageHeader::Reference.render(12), "\n\n--- Page 12 ---\n");
    }

    #[test]
    fn plain_header_separates_pages_only() {
        assert_eq!(PageHeader::None.render(1), "");
        assert_eq!(PageHeader::None.render(2), "\n\n");
    }

    #[test]
    fn custom_header_substitutes_page_number() {
        let h = PageHeader::Custom("== Sheet {n} ==".into());
        assert_eq!(h.render(4), "\n\n== Sheet 4 ==\n");
    }

    #[test]
    fn debug_hides_trait_objects() {
        let s = format!("{:?}", BatchConfig::default());
        assert!(s.contains("BatchConfig"));
        assert!(s.contains("engine: None"));
    }
}
