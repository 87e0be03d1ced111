//! Optional image cleanup before OCR.
//!
//! Scanned answer sheets are often faint pencil on tinted paper. Dropping
//! colour and raising contrast is enough for both tesseract and vision models
//! to pick the strokes out; anything heavier (deskew, binarisation) belongs to
//! the OCR engine itself.

use image::DynamicImage;

/// Contrast boost in percent, as taken by [`DynamicImage::adjust_contrast`].
pub const CONTRAST_BOOST: f32 = 30.0;

/// Grayscale the page and boost its contrast.
pub fn preprocess_page(img: &DynamicImage) -> DynamicImage {
    img.grayscale().adjust_contrast(CONTRAST_BOOST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    #[test]
    fn output_is_gray_and_same_size() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 5, Rgba([200, 30, 90, 255])));
        let out = preprocess_page(&img);
        assert_eq!(out.dimensions(), (8, 5));
        let px = out.to_rgb8().get_pixel(3, 2).0;
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn contrast_pushes_light_pixels_lighter() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([200, 200, 200, 255])));
        let out = preprocess_page(&img).to_luma8();
        assert!(out.get_pixel(0, 0).0[0] > 200);
    }
}
