//! Input discovery: list the PDFs of a directory and name their outputs.
//!
//! Files are returned in directory-listing order, which is platform
//! dependent; nothing downstream relies on a particular order. The `%PDF`
//! magic check runs per file at conversion time so that one mislabelled file
//! fails on its own instead of aborting discovery.

use crate::error::{ConversionError, Ocr2PdfError};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// `true` when the file name ends in `.pdf`, any case.
pub fn is_pdf_name(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// List regular files with a `.pdf` extension directly inside `dir`.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>, Ocr2PdfError> {
    let entries = std::fs::read_dir(dir).map_err(|e| Ocr2PdfError::InputDirUnreadable {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if is_pdf_name(&path) && path.is_file() {
            found.push(path);
        }
    }

    debug!("Discovered {} PDF(s) in {}", found.len(), dir.display());
    Ok(found)
}

/// `<output_dir>/<stem><suffix>.pdf` for an input `<stem>.pdf`.
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{stem}{suffix}.pdf"))
}

/// Create `dir` and its parents if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), Ocr2PdfError> {
    std::fs::create_dir_all(dir).map_err(|e| Ocr2PdfError::OutputDirFailed {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Verify the file starts with the `%PDF` magic bytes.
pub fn check_pdf_magic(path: &Path) -> Result<(), ConversionError> {
    let mut f = std::fs::File::open(path).map_err(|e| ConversionError::Unreadable {
        detail: e.to_string(),
    })?;
    let mut magic = [0u8; 4];
    let mut filled = 0;
    while filled < magic.len() {
        match f.read(&mut magic[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) => {
                return Err(ConversionError::Unreadable {
                    detail: e.to_string(),
                })
            }
        }
    }
    if &magic != b"%PDF" {
        return Err(ConversionError::NotAPdf { magic });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(is_pdf_name(Path::new("a.pdf")));
        assert!(is_pdf_name(Path::new("B.PDF")));
        assert!(is_pdf_name(Path::new("dir/c.Pdf")));
        assert!(!is_pdf_name(Path::new("notes.txt")));
        assert!(!is_pdf_name(Path::new("pdf")));
        assert!(!is_pdf_name(Path::new("archive.pdf.zip")));
    }

    #[test]
    fn discover_filters_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("one.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("TWO.PDF"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let mut names: Vec<String> = discover_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["TWO.PDF", "one.pdf"]);
    }

    #[test]
    fn discover_missing_dir_is_fatal() {
        let err = discover_pdfs(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Ocr2PdfError::InputDirUnreadable { .. }));
    }

    #[test]
    fn output_name_appends_suffix() {
        let out = output_path_for(Path::new("in/Exam 1.PDF"), Path::new("out"), "_ocr");
        assert_eq!(out, PathBuf::from("out/Exam 1_ocr.pdf"));
        let out = output_path_for(Path::new("in/report.final.pdf"), Path::new("o"), "_ocr");
        assert_eq!(out, PathBuf::from("o/report.final_ocr.pdf"));
    }

    #[test]
    fn ensure_output_dir_creates_parents() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a/b/c");
        ensure_output_dir(&target).unwrap();
        assert!(target.is_dir());
        // idempotent
        ensure_output_dir(&target).unwrap();
    }

    #[test]
    fn magic_check() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.pdf");
        let bad = dir.path().join("bad.pdf");
        let short = dir.path().join("short.pdf");
        std::fs::write(&good, b"%PDF-1.7\n").unwrap();
        std::fs::write(&bad, b"PK\x03\x04zip").unwrap();
        std::fs::write(&short, b"%P").unwrap();

        assert!(check_pdf_magic(&good).is_ok());
        assert!(matches!(
            check_pdf_magic(&bad),
            Err(ConversionError::NotAPdf { .. })
        ));
        assert!(check_pdf_magic(&short).is_err());
        assert!(matches!(
            check_pdf_magic(&dir.path().join("missing.pdf")),
            Err(ConversionError::Unreadable { .. })
        ));
    }
}
