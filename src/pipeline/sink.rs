//! PDF output: replay a paginated [`Document`] onto a PDF sink.
//!
//! [`PdfSink`] is the drawing surface the layout stage talks to: one
//! `begin_page … end_page` cycle per sealed page buffer, one `draw_line` per
//! placed line, and a single `save` at the end. [`PrintPdfSink`] builds the
//! whole document in memory with `printpdf` and writes it with one atomic
//! rename, so a batch interrupted mid-file never leaves a truncated PDF behind.

use crate::layout::{Document, PageGeometry};
use printpdf::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Misuse of the sink protocol, or a failed write.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("draw_line or end_page called with no open page")]
    PageNotOpen,

    #[error("begin_page or save called while a page is still open")]
    PageStillOpen,

    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Drawing surface for laid-out text.
pub trait PdfSink {
    fn begin_page(&mut self) -> Result<(), SinkError>;

    /// Draw `text` with its baseline starting at (`x`, `y`) in points from the
    /// bottom-left corner.
    fn draw_line(&mut self, x: f32, y: f32, text: &str) -> Result<(), SinkError>;

    fn end_page(&mut self) -> Result<(), SinkError>;

    fn save(&mut self, path: &Path) -> Result<(), SinkError>;
}

/// Replay every sealed page buffer of `document` onto `sink`.
///
/// Lines are drawn at the left margin. Does not call [`PdfSink::save`].
pub fn emit_document(
    document: &Document,
    geometry: &PageGeometry,
    sink: &mut dyn PdfSink,
) -> Result<(), SinkError> {
    for page in document.pages() {
        sink.begin_page()?;
        for line in page.lines() {
            sink.draw_line(geometry.margin, line.y, &line.text)?;
        }
        sink.end_page()?;
    }
    Ok(())
}

/// Emit `document` into a fresh [`PrintPdfSink`] and save it to `path`.
///
/// Returns the number of pages written.
pub fn write_document(
    document: &Document,
    geometry: &PageGeometry,
    title: &str,
    path: &Path,
) -> Result<usize, SinkError> {
    let mut sink = PrintPdfSink::new(title, *geometry);
    emit_document(document, geometry, &mut sink)?;
    sink.save(path)?;
    Ok(sink.page_count())
}

/// [`PdfSink`] backed by `printpdf`, drawing in builtin Helvetica.
pub struct PrintPdfSink {
    doc: PdfDocument,
    geometry: PageGeometry,
    open: Option<Vec<Op>>,
}

impl PrintPdfSink {
    pub fn new(title: &str, geometry: PageGeometry) -> Self {
        Self {
            doc: PdfDocument::new(title),
            geometry,
            open: None,
        }
    }

    /// Pages finished so far.
    pub fn page_count(&self) -> usize {
        self.doc.pages.len()
    }

    /// Serialise the finished pages.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SinkError> {
        if self.open.is_some() {
            return Err(SinkError::PageStillOpen);
        }
        let mut warnings = Vec::new();
        let bytes = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!("printpdf reported {} warning(s)", warnings.len());
        }
        Ok(bytes)
    }
}

impl PdfSink for PrintPdfSink {
    fn begin_page(&mut self) -> Result<(), SinkError> {
        if self.open.is_some() {
            return Err(SinkError::PageStillOpen);
        }
        self.open = Some(Vec::new());
        Ok(())
    }

    fn draw_line(&mut self, x: f32, y: f32, text: &str) -> Result<(), SinkError> {
        let font_size = self.geometry.font_size;
        let ops = self.open.as_mut().ok_or(SinkError::PageNotOpen)?;
        if text.is_empty() {
            return Ok(());
        }
        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point { x: Pt(x), y: Pt(y) },
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            font: BuiltinFont::Helvetica,
            size: Pt(font_size),
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(text.to_string())],
            font: BuiltinFont::Helvetica,
        });
        ops.push(Op::EndTextSection);
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), SinkError> {
        let ops = self.open.take().ok_or(SinkError::PageNotOpen)?;
        self.doc.pages.push(PdfPage::new(
            Mm::from(Pt(self.geometry.page_width)),
            Mm::from(Pt(self.geometry.page_height)),
            ops,
        ));
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), SinkError> {
        let bytes = self.to_bytes()?;
        let io_err = |source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        };

        // Atomic write: temp file next to the target, then rename.
        let tmp_path = path.with_extension("pdf.tmp");
        if let Err(e) =
            std::fs::write(&tmp_path, &bytes).and_then(|()| std::fs::rename(&tmp_path, path))
        {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(io_err(e));
        }

        debug!(
            "Saved {} page(s), {} bytes → {}",
            self.page_count(),
            bytes.len(),
            path.display()
        );
        Ok(())
    }
}
