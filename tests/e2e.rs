//! End-to-end tests against real pdfium and tesseract.
//!
//! A text PDF is generated with the crate's own writer, scanned back with
//! pdfium, and recognised with tesseract. Gated behind `E2E_ENABLED` because
//! both native dependencies must be installed.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/lib cargo test --test e2e -- --nocapture

use edgequake_ocr2pdf::{
    convert_batch, paginate, write_document, BatchConfig, PageGeometry, PageHeader,
};
use std::path::PathBuf;
use tempfile::TempDir;

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let _ = tracing_subscriber::fmt()
            .with_env_filter("edgequake_ocr2pdf=debug")
            .with_test_writer()
            .try_init();
    }};
}

fn pdfium_dir() -> Option<PathBuf> {
    std::env::var("PDFIUM_LIB_PATH").ok().map(PathBuf::from)
}

/// Write a text-only "scan" with large type so tesseract reads it reliably.
fn write_sample(dir: &std::path::Path, name: &str, lines: &[&str]) {
    let geometry = PageGeometry {
        font_size: 24.0,
        line_pitch: 32.0,
        ..PageGeometry::letter()
    };
    let doc = paginate(&lines.join("\n"), &geometry).unwrap();
    write_document(&doc, &geometry, name, &dir.join(format!("{name}.pdf"))).unwrap();
}

fn base_config(input: &std::path::Path, output: &std::path::Path) -> BatchConfig {
    let mut builder = BatchConfig::builder()
        .input_dir(input)
        .output_dir(output)
        .dpi(300);
    if let Some(dir) = pdfium_dir() {
        builder = builder.pdfium_lib_path(dir);
    }
    builder.build().unwrap()
}

#[tokio::test]
async fn test_tesseract_round_trip() {
    e2e_skip_unless_enabled!();

    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_sample(
        input.path(),
        "answers",
        &["Name Ada Lovelace", "", "Question one forty two"],
    );

    let report = convert_batch(&base_config(input.path(), output.path()))
        .await
        .expect("batch should run");
    println!("{}", serde_json::to_string_pretty(&report).unwrap());

    assert!(report.is_success(), "failures: {:?}", report.failures);
    let out = output.path().join("answers_ocr.pdf");
    assert!(out.is_file());
    assert_eq!(&std::fs::read(&out).unwrap()[..4], b"%PDF");
    assert_eq!(report.files[0].source_pages, 1);
    assert!(report.files[0].lines >= 4, "header plus recognised lines");
}

#[tokio::test]
async fn test_ocr_document_reads_text() {
    e2e_skip_unless_enabled!();

    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_sample(input.path(), "sheet", &["HELLO WORLD"]);

    let mut config = base_config(input.path(), output.path());
    config.page_header = PageHeader::None;
    let converter = edgequake_ocr2pdf::Converter::new(&config)
        .await
        .expect("tesseract and pdfium must be installed");
    let ocr = converter
        .ocr_document(&input.path().join("sheet.pdf"))
        .await
        .unwrap();

    println!("{:?}", ocr.text);
    assert!(ocr.text.to_uppercase().contains("HELLO"), "got {:?}", ocr.text);
}

#[tokio::test]
async fn test_multi_page_source_keeps_page_headers() {
    e2e_skip_unless_enabled!();

    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    // 40 lines at a 32 pt pitch span two source pages.
    let lines: Vec<String> = (1..=40).map(|i| format!("Line {i}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_sample(input.path(), "long", &refs);

    let config = base_config(input.path(), output.path());
    let converter = edgequake_ocr2pdf::Converter::new(&config).await.unwrap();
    let ocr = converter
        .ocr_document(&input.path().join("long.pdf"))
        .await
        .unwrap();

    assert_eq!(ocr.source_pages, 2);
    assert!(ocr.text.contains("--- Page 1 ---"));
    assert!(ocr.text.contains("--- Page 2 ---"));
}
