//! Image decoding and luminance conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP, GIF) and produces an
//! RGB frame, and converts frames to single-channel intensity for the
//! shape classifier.

use image::{GrayImage, Luma, RgbImage};

use crate::types::VisionError;

/// Fixed-point BT.601 weights scaled by `2^14`: 0.299, 0.587, 0.114.
const LUMA_WEIGHTS: [u32; 3] = [4899, 9617, 1868];
const LUMA_SHIFT: u32 = 14;

/// Decode raw image bytes into an RGB frame.
///
/// Alpha, if present, is discarded.
///
/// # Errors
///
/// Returns [`VisionError::EmptyInput`] if `bytes` is empty.
/// Returns [`VisionError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, VisionError> {
    if bytes.is_empty() {
        return Err(VisionError::EmptyInput);
    }

    let img = image::load_from_memory(bytes).map_err(VisionError::ImageDecode)?;
    Ok(img.to_rgb8())
}

/// Convert an RGB frame to luminance using the BT.601 weights
/// `0.299*R + 0.587*G + 0.114*B`, rounded to nearest.
#[must_use = "returns the grayscale image"]
pub fn to_luma(frame: &RgbImage) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b] = frame.get_pixel(x, y).0;
        let weighted = LUMA_WEIGHTS[0] * u32::from(r)
            + LUMA_WEIGHTS[1] * u32::from(g)
            + LUMA_WEIGHTS[2] * u32::from(b);
        let rounded = (weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT;
        Luma([u8::try_from(rounded).unwrap_or(u8::MAX)])
    })
}
