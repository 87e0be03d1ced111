//! System prompt for vision-model OCR.
//!
//! The output is a plain text PDF, so the prompt asks for a
//! literal transcription: no Markdown, no commentary, line breaks kept where
//! the writer put them. Callers can override it via
//! [`crate::config::VisionOptions::system_prompt`].

/// Reply the model gives for a page with no legible text.
///
/// Mapped to an empty string by [`crate::ocr::vision::VisionEngine`], so a blank
/// sheet produces a blank page rather than the sentinel itself.
pub const NO_TEXT_SENTINEL: &str = "[[NO_TEXT]]";

/// Default system prompt for transcribing a scanned page image.
pub const OCR_SYSTEM_PROMPT: &str = r#"You are an OCR engine. Transcribe ALL text visible in the scanned page image.

Rules:
1. Reproduce the text exactly as written, including spelling mistakes, numbering, and punctuation.
2. Keep one output line per written line, in reading order (top to bottom, left to right).
3. Keep blank lines between separate blocks of text.
4. Transcribe handwriting as well as printed text. Write [illegible] for words you cannot read.
5. Output plain text only: no Markdown, no code fences, no commentary, no page numbers you invented.
6. If the page contains no text at all, output exactly [[NO_TEXT]]."#;
