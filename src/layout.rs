//! Text layout: repaginate OCR text into fixed-size PDF pages.
//!
//! The paginator walks the text line by line with a vertical cursor that
//! starts at the top margin and moves down one line pitch per line. The
//! overflow check runs *before* a line is placed: when the cursor is at or
//! below the bottom margin the open page buffer is sealed and a fresh one is
//! started at the top.
//!
//! ```text
//!  page_height ┬───────────────────────────┐
//!              │          margin           │
//!   top ───────┼ line 1   (y = top)        │
//!              │ line 2   (y = top − pitch)│
//!              │ …                         │
//!   margin ────┼───────────── seal here ───┤
//!            0 └───────────────────────────┘
//! ```
//!
//! Coordinates are PDF points measured from the bottom edge, matching what
//! the PDF sink expects.

use crate::error::Ocr2PdfError;
use serde::{Deserialize, Serialize};

/// Fixed page geometry for one output document, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Margin applied on every edge.
    pub margin: f32,
    pub font_size: f32,
    /// Vertical distance between consecutive baselines.
    pub line_pitch: f32,
}

impl Default for PageGeometry {
    /// US Letter, 40 pt margin, 10 pt text on a 12 pt pitch.
    fn default() -> Self {
        Self::letter()
    }
}

impl PageGeometry {
    pub const fn letter() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 40.0,
            font_size: 10.0,
            line_pitch: 12.0,
        }
    }

    pub const fn a4() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin: 40.0,
            font_size: 10.0,
            line_pitch: 12.0,
        }
    }

    /// Reject geometries that would never place a line or never overflow.
    pub fn validate(&self) -> Result<(), Ocr2PdfError> {
        let fields = [
            ("page width", self.page_width),
            ("page height", self.page_height),
            ("margin", self.margin),
            ("font size", self.font_size),
            ("line pitch", self.line_pitch),
        ];
        if let Some((name, v)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Ocr2PdfError::InvalidConfig(format!(
                "{name} must be a finite number, got {v}"
            )));
        }
        if self.line_pitch <= 0.0 {
            return Err(Ocr2PdfError::InvalidConfig(format!(
                "line pitch must be > 0, got {}",
                self.line_pitch
            )));
        }
        if self.margin < 0.0 {
            return Err(Ocr2PdfError::InvalidConfig(format!(
                "margin must be ≥ 0, got {}",
                self.margin
            )));
        }
        if self.page_height <= 2.0 * self.margin {
            return Err(Ocr2PdfError::InvalidConfig(format!(
                "page height {} leaves no room inside a {} pt margin",
                self.page_height, self.margin
            )));
        }
        if self.page_width <= 0.0 || self.font_size <= 0.0 {
            return Err(Ocr2PdfError::InvalidConfig(format!(
                "page width and font size must be > 0, got {} and {}",
                self.page_width, self.font_size
            )));
        }
        Ok(())
    }

    /// Cursor position of the first line on every page.
    pub fn top(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Number of lines a full page receives.
    pub fn lines_per_page(&self) -> usize {
        ((self.page_height - 2.0 * self.margin) / self.line_pitch).ceil() as usize
    }
}

/// A line of text placed at a vertical position on its page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedLine {
    pub y: f32,
    pub text: String,
}

/// Lines assigned to one output page, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageBuffer {
    lines: Vec<PlacedLine>,
}

impl PageBuffer {
    pub fn lines(&self) -> &[PlacedLine] {
        &self.lines
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Sealed page buffers of one output file, in page order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pages: Vec<PageBuffer>,
}

impl Document {
    pub fn pages(&self) -> &[PageBuffer] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(PageBuffer::len).sum()
    }
}

/// Incremental paginator: feed lines one at a time, then [`finish`](Self::finish).
#[derive(Debug, Clone)]
pub struct Paginator {
    geometry: PageGeometry,
    sealed: Vec<PageBuffer>,
    open: PageBuffer,
}

impl Paginator {
    pub fn new(geometry: PageGeometry) -> Result<Self, Ocr2PdfError> {
        geometry.validate()?;
        Ok(Self {
            geometry,
            sealed: Vec::new(),
            open: PageBuffer::default(),
        })
    }

    /// Where the next line would go on the open page.
    ///
    /// Derived from the line count rather than accumulated, so positions do
    /// not drift over long pages.
    pub fn cursor(&self) -> f32 {
        self.geometry.top() - self.open.len() as f32 * self.geometry.line_pitch
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        if self.cursor() <= self.geometry.margin {
            let full = std::mem::take(&mut self.open);
            self.sealed.push(full);
        }
        let y = self.cursor();
        self.open.lines.push(PlacedLine {
            y,
            text: line.into(),
        });
    }

    pub fn push_text(&mut self, text: &str) {
        for line in split_lines(text) {
            self.push_line(line);
        }
    }

    /// Seal the open page buffer and return the finished document.
    pub fn finish(mut self) -> Document {
        self.sealed.push(self.open);
        Document { pages: self.sealed }
    }
}

/// Lay `text` out onto pages of the given geometry.
///
/// Every line-separated segment of `text` lands on exactly one page, blank
/// lines included; an empty `text` yields one page holding one empty line.
///
/// # Errors
/// [`Ocr2PdfError::InvalidConfig`] when `geometry` is degenerate.
pub fn paginate(text: &str, geometry: &PageGeometry) -> Result<Document, Ocr2PdfError> {
    let mut paginator = Paginator::new(*geometry)?;
    paginator.push_text(text);
    Ok(paginator.finish())
}

/// Split into lines, keeping empty segments.
///
/// Breaks are `\n`, `\r\n`, a lone `\r`, vertical tab, form feed, the
/// file/group/record separators (`\x1c`–`\x1e`), NEL, and the Unicode line
/// and paragraph separators. A trailing break yields a trailing empty line:
/// `"a\n"` is two lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                start = j + 1;
            }
        }
    }
    lines.push(&text[start..]);
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{001C}'
            | '\u{001D}'
            | '\u{001E}'
            | '\u{0085}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_sizes(doc: &Document) -> Vec<usize> {
        doc.pages().iter().map(PageBuffer::len).collect()
    }

    fn geometries() -> Vec<PageGeometry> {
        vec![
            PageGeometry::letter(),
            PageGeometry::a4(),
            PageGeometry {
                page_height: 100.0,
                margin: 10.0,
                line_pitch: 10.0,
                ..PageGeometry::letter()
            },
            PageGeometry {
                page_height: 50.0,
                margin: 20.0,
                line_pitch: 7.5,
                ..PageGeometry::letter()
            },
        ]
    }

    fn sample_texts() -> Vec<String> {
        vec![
            String::new(),
            "\n".to_string(),
            "one line".to_string(),
            "a\n\nb\n".to_string(),
            "x\r\ny\rz".to_string(),
            vec!["row"; 500].join("\n"),
            "\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n".to_string(),
        ]
    }

    #[test]
    fn letter_page_holds_sixty_lines() {
        let g = PageGeometry::letter();
        assert_eq!(g.lines_per_page(), 60);
        let text = vec!["X"; 150].join("\n");
        let doc = paginate(&text, &g).unwrap();
        assert_eq!(page_sizes(&doc), vec![60, 60, 30]);
    }

    #[test]
    fn page_header_and_blank_line_kept_in_order() {
        let doc = paginate("--- Page 1 ---\nHello\n\nWorld", &PageGeometry::letter()).unwrap();
        assert_eq!(doc.page_count(), 1);
        let lines: Vec<&str> = doc.pages()[0].texts().collect();
        assert_eq!(lines, vec!["--- Page 1 ---", "Hello", "", "World"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        let doc = paginate("", &PageGeometry::letter()).unwrap();
        assert_eq!(page_sizes(&doc), vec![1]);
        assert_eq!(doc.pages()[0].lines()[0].text, "");
    }

    #[test]
    fn line_count_preserved() {
        for g in geometries() {
            for t in sample_texts() {
                let doc = paginate(&t, &g).unwrap();
                assert_eq!(doc.line_count(), split_lines(&t).len(), "text {t:?}");
            }
        }
    }

    #[test]
    fn full_pages_respect_capacity() {
        for g in geometries() {
            for t in sample_texts() {
                let doc = paginate(&t, &g).unwrap();
                let limit = g.page_height - 2.0 * g.margin + g.line_pitch;
                let (_last, full) = doc.pages().split_last().unwrap();
                for page in full {
                    assert!(page.len() as f32 * g.line_pitch <= limit);
                    assert_eq!(page.len(), g.lines_per_page());
                }
            }
        }
    }

    #[test]
    fn placed_lines_stay_inside_margins() {
        for g in geometries() {
            let doc = paginate(&vec!["row"; 321].join("\n"), &g).unwrap();
            for line in doc.pages().iter().flat_map(|p| p.lines()) {
                assert!(line.y > g.margin, "y={} margin={}", line.y, g.margin);
                assert!(line.y <= g.top());
            }
        }
    }

    #[test]
    fn no_sealed_page_is_empty() {
        for g in geometries() {
            for t in sample_texts() {
                let doc = paginate(&t, &g).unwrap();
                assert!(doc.pages().iter().all(|p| !p.is_empty()));
            }
        }
    }

    #[test]
    fn deterministic() {
        let g = PageGeometry::a4();
        let t = "alpha\nbeta\n\ngamma\r\ndelta".repeat(40);
        assert_eq!(paginate(&t, &g).unwrap(), paginate(&t, &g).unwrap());
    }

    #[test]
    fn overflow_check_is_inclusive_at_margin() {
        // top = 90; after 8 lines the cursor is exactly 10 = margin.
        let g = PageGeometry {
            page_height: 100.0,
            margin: 10.0,
            line_pitch: 10.0,
            ..PageGeometry::letter()
        };
        let doc = paginate(&vec!["l"; 9].join("\n"), &g).unwrap();
        assert_eq!(page_sizes(&doc), vec![8, 1]);
        let ys: Vec<f32> = doc.pages()[0].lines().iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 30.0, 20.0]);
        assert_eq!(doc.pages()[1].lines()[0].y, 90.0);
    }

    #[test]
    fn degenerate_height_rejected() {
        for t in sample_texts() {
            let g = PageGeometry {
                page_height: 80.0,
                margin: 40.0,
                ..PageGeometry::letter()
            };
            assert!(matches!(
                paginate(&t, &g),
                Err(Ocr2PdfError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn non_positive_pitch_rejected() {
        for pitch in [0.0, -12.0, f32::NAN] {
            let g = PageGeometry {
                line_pitch: pitch,
                ..PageGeometry::letter()
            };
            assert!(paginate("text", &g).is_err(), "pitch {pitch}");
        }
    }

    #[test]
    fn incremental_matches_batch() {
        let g = PageGeometry::letter();
        let text = vec!["abc"; 75].join("\n");
        let mut p = Paginator::new(g).unwrap();
        for line in split_lines(&text) {
            p.push_line(line);
        }
        assert_eq!(p.finish(), paginate(&text, &g).unwrap());
    }

    #[test]
    fn split_lines_handles_all_breaks() {
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(split_lines("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("\n\n"), vec!["", "", ""]);
        assert_eq!(split_lines("é\r\nü"), vec!["é", "ü"]);
    }

    #[test]
    fn form_feed_and_unicode_separators_break_lines() {
        // Raw tesseract output ends every page with a form feed.
        assert_eq!(split_lines("Answer 1\n\u{000C}"), vec!["Answer 1", "", ""]);
        assert_eq!(split_lines("a\u{000B}b\u{000C}c"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\u{2028}b\u{2029}c\u{0085}d"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\u{001C}b\u{001D}c\u{001E}d"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\r\u{000C}b"), vec!["a", "", "b"]);

        let doc = paginate("x\u{000C}y", &PageGeometry::letter()).unwrap();
        let lines: Vec<&str> = doc.pages()[0].texts().collect();
        assert_eq!(lines, vec!["x", "y"]);
    }
}
