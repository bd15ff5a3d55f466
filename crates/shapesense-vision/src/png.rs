//! PNG encoding of frames and overlays.

use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::types::VisionError;

/// Encode an RGB image as PNG bytes.
///
/// # Errors
///
/// Returns [`VisionError::PngEncode`] if the encoder rejects the image.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, VisionError> {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(VisionError::PngEncode)?;
    Ok(buf)
}
