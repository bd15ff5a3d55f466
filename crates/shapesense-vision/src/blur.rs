//! Gaussian blur for noise reduction before edge detection.
//!
//! Wraps [`imageproc::filter::gaussian_blur_f32`]. The classifier
//! specifies its blur by kernel size (5×5); [`sigma_for_kernel`] maps a
//! kernel size to the sigma that a kernel of that size is built from.

use image::GrayImage;

/// Sigma implied by a square Gaussian kernel of side `kernel_size`.
///
/// Uses `0.3 * ((k - 1) * 0.5 - 1) + 0.8`, which gives 1.1 for a 5×5
/// kernel. Kernel sizes below 3 yield 0.0 (no smoothing).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    if kernel_size < 3 {
        return 0.0;
    }
    let k = kernel_size as f32;
    0.3f32.mul_add((k - 1.0).mul_add(0.5, -1.0), 0.8)
}

/// Apply Gaussian blur to a grayscale image.
///
/// Higher `sigma` values produce more smoothing. Non-positive sigma values
/// (zero or negative) return the image unchanged, since `imageproc`'s
/// underlying function panics on `sigma <= 0.0`.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return image.clone();
    }

    imageproc::filter::gaussian_blur_f32(image, sigma)
}
