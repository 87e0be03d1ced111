//! Post-processing: deterministic cleanup of raw OCR text.
//!
//! Both engines leave artefacts that are not part of the page:
//!
//! - tesseract terminates every page with a form feed (`\f`)
//! - vision models sometimes wrap their answer in a ```` ``` ```` fence
//! - scans from Windows tooling come back with `\r\n`
//! - zero-width characters and BOMs slip through and render as boxes
//!
//! Interior blank lines are content: the layout stage turns each one into an
//! empty line on the output page, so nothing here collapses them.
//!
//! ## Rule Order
//!
//! Fences are stripped first so the fence lines themselves are not mistaken
//! for text; line endings are normalised before any per-line rule.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to one page of OCR output.
///
/// Rules (applied in order):
/// 1. Strip an outer code fence
/// 2. Normalise line endings (CRLF / CR → LF)
/// 3. Strip form feeds and invisible Unicode
/// 4. Trim trailing whitespace per line
/// 5. Drop trailing blank lines
pub fn clean_ocr_text(input: &str) -> String {
    let s = strip_outer_fence(input);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    drop_trailing_blank_lines(&s)
}

// ── Rule 1: Strip outer fence ────────────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\r?\n(.*?)\r?\n```\s*$").unwrap());

fn strip_outer_fence(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCE.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Remove form feeds and invisible Unicode ─────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{000C}', '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .split('\n')
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Drop trailing blank lines ────────────────────────────────────────

fn drop_trailing_blank_lines(input: &str) -> String {
    input.trim_end_matches('\n').to_string()
}
