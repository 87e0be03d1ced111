//! CLI binary for edgequake-ocr2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BatchConfig` and prints a per-file summary.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_ocr2pdf::{
    convert_batch, list_inputs, BatchConfig, BatchProgressCallback, FailurePolicy, OcrBackend,
    PageGeometry, PageHeader, ProgressCallback, TesseractOptions, VisionOptions,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the files of the batch, with the
/// current file and page in the message and a log line per finished file.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_batch_start` reports how many files were found.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning input folder…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    fn file_name(file: &Path) -> String {
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string())
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_files} PDF(s)"))
        ));
    }

    fn on_file_start(&self, file: &Path, _index: usize, _total_files: usize) {
        self.bar.set_message(Self::file_name(file));
    }

    fn on_page_ocr(&self, file: &Path, page_num: usize, total_pages: usize) {
        self.bar.set_message(format!(
            "{}  page {page_num}/{total_pages}",
            Self::file_name(file)
        ));
    }

    fn on_file_complete(&self, file: &Path, output: &Path, pages_written: usize) {
        self.bar.println(format!(
            "  {} {}  →  {}  {}",
            green("✓"),
            Self::file_name(file),
            output.display(),
            dim(&format!("{pages_written} page(s)")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, file: &Path, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {}  {}",
            red("✗"),
            Self::file_name(file),
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize) {
        self.bar.finish_and_clear();
        if failed == 0 {
            eprintln!(
                "{} {} file(s) converted successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} file(s) converted  ({} failed)",
                if succeeded == 0 { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                succeeded + failed,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert answer_sheet/*.pdf into extracted_pdfs/*_ocr.pdf
  ocr2pdf

  # Other folders
  ocr2pdf scans -o scans/text

  # German + English, one uniform block of text per page
  ocr2pdf --lang deu+eng --psm 6 scans

  # Handwritten sheets through a vision model
  ocr2pdf --engine vision --provider openai --model gpt-4.1-mini --preprocess

  # See what would be converted
  ocr2pdf --list-only

  # Machine-readable summary
  ocr2pdf --json > report.json

ENGINES:
  tesseract  Local binary (apt install tesseract-ocr). Free, offline. Default.
  vision     Vision LLM via edgequake-llm: openai, anthropic, gemini, ollama, …
             Needs the matching API key in the environment.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Directory containing libpdfium
  OCR2PDF_*               Every flag, e.g. OCR2PDF_DPI=200
"#;

/// Batch-convert scanned PDFs into searchable text PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "ocr2pdf",
    version,
    about = "Batch-convert scanned PDF answer sheets into text PDFs via OCR",
    long_about = "Render every page of every PDF in a folder, recognise its text with \
tesseract or a vision LLM, and lay the text out again as a plain, searchable PDF.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder containing the scanned PDFs.
    #[arg(env = "OCR2PDF_INPUT_DIR", default_value = "answer_sheet")]
    input_dir: PathBuf,

    /// Folder receiving the text PDFs (created if missing).
    #[arg(short, long, env = "OCR2PDF_OUTPUT_DIR", default_value = "extracted_pdfs")]
    output_dir: PathBuf,

    /// Appended to each input name: exam.pdf → exam<SUFFIX>.pdf.
    #[arg(long, env = "OCR2PDF_SUFFIX", default_value = "_ocr")]
    suffix: String,

    /// OCR engine.
    #[arg(long, env = "OCR2PDF_ENGINE", value_enum, default_value = "tesseract")]
    engine: EngineArg,

    /// Tesseract language pack(s), e.g. eng or deu+eng.
    #[arg(long, env = "OCR2PDF_LANG", default_value = "eng")]
    lang: String,

    /// Tesseract page segmentation mode (0–13).
    #[arg(long, env = "OCR2PDF_PSM", default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(0..=13))]
    psm: u8,

    /// Tesseract executable.
    #[arg(long, env = "OCR2PDF_TESSERACT_BIN", default_value = "tesseract")]
    tesseract_bin: PathBuf,

    /// Vision provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Vision model ID (default gpt-4.1-nano).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Path to a text file containing a custom OCR prompt (vision engine).
    #[arg(long, env = "OCR2PDF_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Max output tokens per page (vision engine).
    #[arg(long, env = "OCR2PDF_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Grayscale + contrast boost before OCR.
    #[arg(long, env = "OCR2PDF_PREPROCESS")]
    preprocess: bool,

    /// Retries per page on OCR failure.
    #[arg(long, env = "OCR2PDF_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Initial retry delay in ms, doubled per attempt.
    #[arg(long, env = "OCR2PDF_RETRY_BACKOFF_MS", default_value_t = 500)]
    retry_backoff_ms: u64,

    /// Rendering DPI (72–600).
    #[arg(long, env = "OCR2PDF_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Output page size.
    #[arg(long, env = "OCR2PDF_PAGE_SIZE", value_enum, default_value = "letter")]
    page_size: PageSizeArg,

    /// Page margin in points (default 40).
    #[arg(long, env = "OCR2PDF_MARGIN")]
    margin: Option<f32>,

    /// Font size in points (default 10).
    #[arg(long, env = "OCR2PDF_FONT_SIZE")]
    font_size: Option<f32>,

    /// Distance between baselines in points (default 12).
    #[arg(long, env = "OCR2PDF_LINE_PITCH")]
    line_pitch: Option<f32>,

    /// Header before each source page: reference, none, or a custom string ({n} = page).
    #[arg(long, env = "OCR2PDF_HEADER", default_value = "reference")]
    header: String,

    /// Keep raw OCR output (no whitespace / form-feed cleanup).
    #[arg(long, env = "OCR2PDF_NO_CLEAN")]
    no_clean: bool,

    /// PDF user password for encrypted inputs.
    #[arg(long, env = "OCR2PDF_PASSWORD")]
    password: Option<String>,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Stop at the first file that fails.
    #[arg(long, env = "OCR2PDF_FAIL_FAST")]
    fail_fast: bool,

    /// List the PDFs that would be converted, then exit.
    #[arg(long)]
    list_only: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "OCR2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "OCR2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCR2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OCR2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EngineArg {
    Tesseract,
    Vision,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    Letter,
    A4,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.list_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    // ── List-only mode ───────────────────────────────────────────────────
    if cli.list_only {
        let inputs = list_inputs(&config).context("Failed to list input PDFs")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&inputs).context("Failed to serialise file list")?
            );
        } else {
            for input in &inputs {
                println!("{}", input.display());
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Run batch ────────────────────────────────────────────────────────
    let report = convert_batch(&config).await.context("Batch failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        // Only print inline stats when the progress callback is disabled.
        eprintln!(
            "Converted {}/{} file(s) in {}ms",
            report.stats.succeeded, report.stats.total_files, report.stats.total_duration_ms
        );
        for failure in &report.failures {
            eprintln!("  {} {}", red("✗"), failure);
        }
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

/// Map CLI args to `BatchConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let backend = match cli.engine {
        EngineArg::Tesseract => OcrBackend::Tesseract(TesseractOptions {
            binary: cli.tesseract_bin.clone(),
            language: cli.lang.clone(),
            psm: cli.psm,
        }),
        EngineArg::Vision => OcrBackend::Vision(VisionOptions {
            provider_name: cli.provider.clone(),
            model: cli.model.clone(),
            system_prompt,
            max_tokens: cli.max_tokens,
        }),
    };

    let mut builder = BatchConfig::builder()
        .input_dir(&cli.input_dir)
        .output_dir(&cli.output_dir)
        .output_suffix(&cli.suffix)
        .geometry(build_geometry(cli))
        .dpi(cli.dpi)
        .backend(backend)
        .preprocess(cli.preprocess)
        .max_retries(cli.max_retries)
        .retry_backoff_ms(cli.retry_backoff_ms)
        .clean_text(!cli.no_clean)
        .page_header(parse_header(&cli.header))
        .failure_policy(if cli.fail_fast {
            FailurePolicy::Abort
        } else {
            FailurePolicy::SkipAndContinue
        });

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref lib) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn build_geometry(cli: &Cli) -> PageGeometry {
    let mut g = match cli.page_size {
        PageSizeArg::Letter => PageGeometry::letter(),
        PageSizeArg::A4 => PageGeometry::a4(),
    };
    if let Some(m) = cli.margin {
        g.margin = m;
    }
    if let Some(f) = cli.font_size {
        g.font_size = f;
    }
    if let Some(p) = cli.line_pitch {
        g.line_pitch = p;
    }
    g
}

/// Parse `--header` string into `PageHeader`.
fn parse_header(s: &str) -> PageHeader {
    match s.to_lowercase().as_str() {
        "none" => PageHeader::None,
        "reference" | "default" => PageHeader::Reference,
        _ => PageHeader::Custom(s.to_string()),
    }
}
