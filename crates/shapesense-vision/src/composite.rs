//! Overlay strokes and frame compositing.

use image::{Rgb, RgbImage};
use imageproc::drawing::{BresenhamLineIter, draw_filled_circle_mut};

use crate::types::Point;

/// Draw a line of the given thickness from `from` to `to` onto `canvas`.
///
/// A disc of diameter `thickness` is stamped at every pixel of the
/// Bresenham line between the endpoints, giving round caps. Parts outside
/// the canvas are clipped.
pub fn draw_thick_line(canvas: &mut RgbImage, from: Point, to: Point, thickness: u32, color: Rgb<u8>) {
    let radius = i32::try_from(thickness / 2).unwrap_or(i32::MAX);
    #[allow(clippy::cast_precision_loss)]
    let line = BresenhamLineIter::new(
        (from.x as f32, from.y as f32),
        (to.x as f32, to.y as f32),
    );
    for center in line {
        draw_filled_circle_mut(canvas, center, radius, color);
    }
}

/// Per-channel saturating sum of `frame` and `overlay`.
///
/// Black overlay pixels leave the frame untouched. The result has the
/// frame's dimensions; frame pixels outside the overlay are copied as-is.
#[must_use = "returns the composite frame"]
pub fn saturating_add(frame: &RgbImage, overlay: &RgbImage) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let base = *frame.get_pixel(x, y);
        overlay.get_pixel_checked(x, y).map_or(base, |top| {
            Rgb([
                base.0[0].saturating_add(top.0[0]),
                base.0[1].saturating_add(top.0[1]),
                base.0[2].saturating_add(top.0[2]),
            ])
        })
    })
}
