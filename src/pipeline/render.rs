//! PDF rasterisation: render pages to `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! [`spawn_render`] runs the rasteriser on the blocking pool and hands pages
//! back one at a time over a bounded channel, so at most two page bitmaps are
//! alive at once even for long scans rendered at 300 DPI.
//!
//! ## Why a trait?
//!
//! [`Rasterizer`] is the seam between the batch driver and pdfium. Tests and
//! callers with their own renderer plug in through
//! [`crate::config::BatchConfig::rasterizer`].

use crate::config::BatchConfig;
use crate::error::{ConversionError, Ocr2PdfError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Rendering parameters for one document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub dpi: u32,
    pub max_pixels: u32,
    pub password: Option<String>,
}

impl RenderOptions {
    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            dpi: config.dpi,
            max_pixels: config.max_rendered_pixels,
            password: config.password.clone(),
        }
    }
}

/// One rasterised source page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 1-indexed.
    pub page_num: usize,
    pub total_pages: usize,
    pub image: DynamicImage,
}

/// Turns a PDF file into page images, in page order.
pub trait Rasterizer: Send + Sync {
    /// Render every page of `pdf_path`, passing each to `emit`.
    ///
    /// Stops early, without error, as soon as `emit` returns `false`.
    fn rasterize(
        &self,
        pdf_path: &Path,
        options: &RenderOptions,
        emit: &mut dyn FnMut(RenderedPage) -> bool,
    ) -> Result<(), ConversionError>;
}

/// Bind to pdfium from `lib_dir`, or from the system library path when `None`.
pub fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, Ocr2PdfError> {
    let bindings = match lib_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| Ocr2PdfError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// pdfium-backed [`Rasterizer`].
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    lib_dir: Option<PathBuf>,
}

impl PdfiumRasterizer {
    /// Probe the pdfium library once so a missing library fails the batch
    /// up front instead of failing every file.
    pub fn new(lib_dir: Option<PathBuf>) -> Result<Self, Ocr2PdfError> {
        bind_pdfium(lib_dir.as_deref())?;
        Ok(Self { lib_dir })
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(
        &self,
        pdf_path: &Path,
        options: &RenderOptions,
        emit: &mut dyn FnMut(RenderedPage) -> bool,
    ) -> Result<(), ConversionError> {
        let pdfium = bind_pdfium(self.lib_dir.as_deref())
            .map_err(|e| ConversionError::Internal(e.to_string()))?;

        let document = pdfium
            .load_pdf_from_file(pdf_path, options.password.as_deref())
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    ConversionError::PasswordRequired
                } else {
                    ConversionError::CorruptPdf { detail: err_str }
                }
            })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(options.dpi as f32 / 72.0)
            .set_maximum_width(options.max_pixels as i32)
            .set_maximum_height(options.max_pixels as i32);

        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ConversionError::RenderFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            let keep_going = emit(RenderedPage {
                page_num: idx + 1,
                total_pages,
                image,
            });
            if !keep_going {
                debug!("Consumer dropped; stopping after page {}", idx + 1);
                break;
            }
        }

        Ok(())
    }
}

/// Receiving end of [`spawn_render`].
pub type PageReceiver = mpsc::Receiver<Result<RenderedPage, ConversionError>>;

/// Run `rasterizer` on the blocking pool and stream its pages back.
///
/// A render error arrives as the last item on the channel. Await the
/// returned handle after draining to surface a panicked render task.
pub fn spawn_render(
    rasterizer: Arc<dyn Rasterizer>,
    pdf_path: PathBuf,
    options: RenderOptions,
) -> (PageReceiver, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(1);
    let handle = tokio::task::spawn_blocking(move || {
        let result = rasterizer.rasterize(&pdf_path, &options, &mut |page| {
            tx.blocking_send(Ok(page)).is_ok()
        });
        if let Err(e) = result {
            let _ = tx.blocking_send(Err(e));
        }
    });
    (rx, handle)
}
