//! Image encoding: `DynamicImage` → PNG bytes, or base64 PNG wrapped in `ImageData`.
//!
//! PNG is lossless; JPEG artefacts around thin pen strokes cost more OCR
//! accuracy than the extra bytes are worth. The same PNG bytes feed the
//! tesseract temp file and the vision-API request body.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as PNG bytes.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

/// Encode a rasterised page as a base64 PNG ready for a vision API.
///
/// `detail: "high"` lets GPT-4-class models tile the full page; the low-detail
/// single tile cannot resolve handwriting.
pub fn encode_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let b64 = STANDARD.encode(encode_png(img)?);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
