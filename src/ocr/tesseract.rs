//! Local OCR via the `tesseract` command-line tool.
//!
//! Each page is written to a temporary PNG and recognised with
//! `tesseract <image> stdout -l <lang> --psm <mode>`. The temp file is removed
//! when the call returns, success or not.

use super::OcrEngine;
use crate::config::TesseractOptions;
use crate::error::OcrError;
use crate::pipeline::encode::encode_png;
use async_trait::async_trait;
use image::DynamicImage;
use std::ffi::OsString;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// [`OcrEngine`] backed by a local tesseract install.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    options: TesseractOptions,
}

impl TesseractEngine {
    pub fn new(options: TesseractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TesseractOptions {
        &self.options
    }

    /// First line of `tesseract --version`, e.g. `tesseract 5.3.4`.
    pub async fn version(&self) -> Result<String, OcrError> {
        let output = self.run(vec!["--version".into()]).await?;
        // Older releases print the version banner on stderr.
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        Ok(text.lines().next().unwrap_or("tesseract").trim().to_string())
    }

    fn recognise_args(&self, image_path: &Path) -> Vec<OsString> {
        vec![
            image_path.as_os_str().to_owned(),
            "stdout".into(),
            "-l".into(),
            self.options.language.clone().into(),
            "--psm".into(),
            self.options.psm.to_string().into(),
        ]
    }

    async fn run(&self, args: Vec<OsString>) -> Result<Output, OcrError> {
        let output = Command::new(&self.options.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    OcrError::EngineUnavailable {
                        engine: self.options.binary.display().to_string(),
                        detail: e.to_string(),
                    }
                }
                _ => OcrError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessFailed {
                engine: "tesseract".to_string(),
                detail: format!("{} ({})", stderr.trim(), output.status),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let png = encode_png(image)?;
        let tmp = tempfile::Builder::new()
            .prefix("ocr2pdf-page-")
            .suffix(".png")
            .tempfile()?;
        tokio::fs::write(tmp.path(), &png).await?;

        let output = self.run(self.recognise_args(tmp.path())).await?;
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            "tesseract: {}x{} px → {} chars",
            image.width(),
            image.height(),
            text.len()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn white_page() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255; 4])))
    }

    fn engine_with(binary: &str) -> TesseractEngine {
        TesseractEngine::new(TesseractOptions {
            binary: binary.into(),
            language: "eng+deu".into(),
            psm: 6,
        })
    }

    #[test]
    fn args_follow_options() {
        let e = engine_with("tesseract");
        let args = e.recognise_args(Path::new("/tmp/p.png"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["/tmp/p.png", "stdout", "-l", "eng+deu", "--psm", "6"]);
    }

    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let e = engine_with("definitely-not-a-real-tesseract-binary");
        let err = e.extract_text(&white_page()).await.unwrap_err();
        assert!(matches!(err, OcrError::EngineUnavailable { .. }), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_is_returned() {
        // `echo` stands in for tesseract and prints the arguments it received.
        let e = engine_with("echo");
        let text = e.extract_text(&white_page()).await.unwrap();
        assert!(text.contains("ocr2pdf-page-"), "{text}");
        assert!(text.trim_end().ends_with("stdout -l eng+deu --psm 6"), "{text}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_process_failure() {
        let e = engine_with("false");
        let err = e.extract_text(&white_page()).await.unwrap_err();
        assert!(matches!(err, OcrError::ProcessFailed { .. }), "{err}");
    }
}
