//! Rasterisation of sketches.

use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use tiny_skia::{FillRule, LineJoin, Paint, Pixmap, Stroke};
use tracing::trace;

use crate::SketchError;
use crate::sketch::Sketch;

/// Draw every shape, in insertion order, over the sketch background.
///
/// Each shape is filled first (when it has a fill) and then outlined with
/// its border color, anti-aliased.
#[must_use = "returns the rendered image"]
pub fn render(sketch: &Sketch) -> RgbaImage {
    let (width, height) = (sketch.width(), sketch.height());
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    };
    pixmap.fill(sketch.background().to_skia());

    for shape in sketch.shapes() {
        let Some(path) = shape.path() else {
            trace!(kind = %shape.kind, "degenerate shape skipped");
            continue;
        };
        let transform = shape.transform();

        if let Some(fill) = shape.params.fill {
            let mut paint = Paint::default();
            paint.set_color(fill.to_skia());
            paint.anti_alias = true;
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }

        if shape.params.thickness > 0.0 {
            let stroke = Stroke {
                width: shape.params.thickness,
                line_join: LineJoin::Miter,
                ..Stroke::default()
            };
            let mut paint = Paint::default();
            paint.set_color(shape.params.border.to_skia());
            paint.anti_alias = true;
            pixmap.stroke_path(&path, &paint, &stroke, transform, None);
        }
    }

    unpremultiply(&pixmap)
}

/// Render and encode as PNG.
///
/// # Errors
///
/// Returns [`SketchError::PngEncode`] if the encoder fails.
pub fn to_png(sketch: &Sketch) -> Result<Vec<u8>, SketchError> {
    let img = render(sketch);
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(SketchError::PngEncode)?;
    Ok(buf)
}

/// Convert a premultiplied pixmap to a straight-alpha `RgbaImage`.
#[allow(clippy::cast_possible_truncation)]
fn unpremultiply(pixmap: &Pixmap) -> RgbaImage {
    let data = pixmap.data();
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (pixel, src) in img.pixels_mut().zip(data.chunks_exact(4)) {
        let a = src[3];
        *pixel = if a == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            let channel = |c: u8| (u16::from(c) * 255 / u16::from(a)) as u8;
            Rgba([channel(src[0]), channel(src[1]), channel(src[2]), a])
        };
    }
    img
}
