//! Drawing detected shape outlines onto a frame.

use image::{Rgb, RgbImage};
use shapesense_vision::ShapeAnnotation;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Outline color for detected shapes.
pub const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline width in pixels.
pub const OUTLINE_WIDTH: f32 = 3.0;

/// Copy of `frame` with each annotation's polygon stroked on top.
#[must_use]
pub fn draw_outlines(frame: &RgbImage, annotations: &[ShapeAnnotation]) -> RgbImage {
    let (width, height) = frame.dimensions();
    let Some(coverage) = outline_coverage(annotations, width, height) else {
        return frame.clone();
    };

    let mut out = frame.clone();
    for (pixel, alpha) in out.pixels_mut().zip(coverage.data().chunks_exact(4).map(|px| px[3])) {
        if alpha > 0 {
            *pixel = blend(*pixel, OUTLINE_COLOR, alpha);
        }
    }
    out
}

/// Alpha mask of all outlines, or `None` when there is nothing to draw.
#[allow(clippy::cast_precision_loss)]
fn outline_coverage(annotations: &[ShapeAnnotation], width: u32, height: u32) -> Option<Pixmap> {
    let mut pb = PathBuilder::new();
    for annotation in annotations {
        let vertices = annotation.polygon.vertices();
        let Some(first) = vertices.first() else {
            continue;
        };
        pb.move_to(first.x as f32, first.y as f32);
        for v in &vertices[1..] {
            pb.line_to(v.x as f32, v.y as f32);
        }
        pb.close();
    }
    let path = pb.finish()?;

    let stroke = Stroke {
        width: OUTLINE_WIDTH,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, 255);
    paint.anti_alias = true;

    let mut pixmap = Pixmap::new(width, height)?;
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    Some(pixmap)
}

/// Straight alpha blend of `top` over `base`.
#[allow(clippy::cast_possible_truncation)]
fn blend(base: Rgb<u8>, top: Rgb<u8>, alpha: u8) -> Rgb<u8> {
    let a = u16::from(alpha);
    let mix = |b: u8, t: u8| ((u16::from(b) * (255 - a) + u16::from(t) * a + 127) / 255) as u8;
    Rgb([
        mix(base.0[0], top.0[0]),
        mix(base.0[1], top.0[1]),
        mix(base.0[2], top.0[2]),
    ])
}
