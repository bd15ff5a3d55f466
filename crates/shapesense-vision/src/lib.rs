//! shapesense-vision: shape classification and color tracking (sans-IO).
//!
//! Two pipelines operate on in-memory RGB frames:
//!
//! - the **shape classifier** ([`detect_shapes`]): grayscale -> blur ->
//!   edge detection -> external contours -> polygon approximation ->
//!   vertex-count classification;
//! - the **color tracker** ([`TrackerSession`]): HSV mask -> opening ->
//!   largest region -> centroid -> stroke on a persistent overlay ->
//!   composite.
//!
//! This crate does no file or device I/O; frame sources and output files
//! live in the `shapesense` binary.

pub mod blur;
pub mod classify;
pub mod composite;
pub mod config;
pub mod contour;
pub mod diagnostics;
pub mod edge;
pub mod grayscale;
pub mod hsv;
pub mod morphology;
pub mod png;
pub mod simplify;
pub mod tracker;
pub mod types;

use tracing::{debug, trace};

pub use classify::{ShapeAnnotation, ShapeKind};
pub use config::{DetectorConfig, TrackerConfig};
pub use hsv::{Hsv, HsvRange};
pub use png::encode_png;
pub use tracker::{Detection, DriveEnd, DriveSummary, TrackedFrame, TrackerSession};
pub use types::{BoundingBox, Contour, GrayImage, Point, Polygon, RgbImage, VisionError};

/// Find and label the polygon shapes in a frame.
///
/// # Steps
///
/// 1. Luminance conversion
/// 2. Gaussian blur with a kernel of `config.blur_kernel`
/// 3. Canny edge detection
/// 4. External contour tracing
/// 5. Polygon approximation with tolerance proportional to perimeter
/// 6. Classification by vertex count and aspect ratio
///
/// Annotations come out in contour discovery order. Blank frames, and
/// frames too small for edge detection, yield an empty list.
#[must_use]
pub fn detect_shapes(frame: &RgbImage, config: &DetectorConfig) -> Vec<ShapeAnnotation> {
    if frame.width() < edge::MIN_SIDE || frame.height() < edge::MIN_SIDE {
        debug!(
            width = frame.width(),
            height = frame.height(),
            "frame too small for edge detection"
        );
        return Vec::new();
    }
    let gray = grayscale::to_luma(frame);
    let blurred = blur::gaussian_blur(&gray, blur::sigma_for_kernel(config.blur_kernel));
    let edges = edge::canny(&blurred, config.canny_low, config.canny_high);
    let contours = contour::external_contours(&edges);
    let annotations = annotate(&contours, config);
    debug!(
        contours = contours.len(),
        shapes = annotations.len(),
        "shape detection finished"
    );
    annotations
}

/// Decode image bytes (PNG, JPEG, BMP, WebP, GIF) and run
/// [`detect_shapes`] on the result.
///
/// # Errors
///
/// Returns [`VisionError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`VisionError::ImageDecode`] if the image format is unrecognized.
pub fn detect_shapes_in_bytes(
    image_bytes: &[u8],
    config: &DetectorConfig,
) -> Result<Vec<ShapeAnnotation>, VisionError> {
    let frame = grayscale::decode(image_bytes)?;
    Ok(detect_shapes(&frame, config))
}

/// Approximate and classify each contour, skipping those below the area
/// threshold, that reduce to fewer than three vertices, or whose polygon
/// is a sliver (too little area or too thin a bounding box).
pub(crate) fn annotate(contours: &[Contour], config: &DetectorConfig) -> Vec<ShapeAnnotation> {
    contours
        .iter()
        .filter_map(|contour| {
            if config.min_area > 0.0 && contour.area() < config.min_area {
                trace!(area = contour.area(), "contour below minimum area");
                return None;
            }
            let polygon = simplify::approximate_by_perimeter(contour, config.epsilon_fraction);
            if polygon.len() < 3 {
                trace!(vertices = polygon.len(), "degenerate polygon skipped");
                return None;
            }
            if config.min_area > 0.0 && polygon.area() < config.min_area {
                trace!(area = polygon.area(), "polygon below minimum area");
                return None;
            }
            let bounding_box = polygon.bounding_box()?;
            if bounding_box.width.min(bounding_box.height) < config.min_extent {
                trace!(?bounding_box, "polygon thinner than minimum extent");
                return None;
            }
            let kind = classify::classify(polygon.len(), &bounding_box, config.square_tolerance);
            trace!(%kind, vertices = polygon.len(), "contour classified");
            Some(ShapeAnnotation {
                kind,
                bounding_box,
                polygon,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square_contour(x: i32, y: i32, side: i32) -> Contour {
        Contour::new(vec![
            Point::new(x, y),
            Point::new(x + side, y),
            Point::new(x + side, y + side),
            Point::new(x, y + side),
        ])
    }

    #[test]
    fn empty_bytes_are_rejected() {
        let result = detect_shapes_in_bytes(&[], &DetectorConfig::default());
        assert!(matches!(result, Err(VisionError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_are_rejected() {
        let result = detect_shapes_in_bytes(&[0xFF, 0x00], &DetectorConfig::default());
        assert!(matches!(result, Err(VisionError::ImageDecode(_))));
    }

    #[test]
    fn uniform_frame_has_no_shapes() {
        let frame = RgbImage::from_pixel(40, 40, image::Rgb([128, 128, 128]));
        assert!(detect_shapes(&frame, &DetectorConfig::default()).is_empty());
    }

    #[test]
    fn tiny_frames_have_no_shapes() {
        for (w, h) in [(0, 0), (1, 1), (2, 5), (5, 2)] {
            let frame = RgbImage::from_pixel(w, h, image::Rgb([255, 255, 255]));
            assert!(detect_shapes(&frame, &DetectorConfig::default()).is_empty());
        }
    }

    #[test]
    fn annotate_filters_small_contours() {
        let contours = [square_contour(0, 0, 5), square_contour(20, 20, 30)];
        let annotations = annotate(&contours, &DetectorConfig::default());
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].kind, ShapeKind::Square);
        assert_eq!(annotations[0].bounding_box.x, 20);
    }

    #[test]
    fn zero_min_area_disables_filter() {
        let config = DetectorConfig {
            min_area: 0.0,
            ..DetectorConfig::default()
        };
        let annotations = annotate(&[square_contour(0, 0, 5)], &config);
        assert_eq!(annotations.len(), 1);
    }

    #[test]
    fn thin_slivers_are_skipped() {
        // Traced along the clipped edge of a shape touching the frame border.
        let sliver = Contour::new(vec![
            Point::new(1, 97),
            Point::new(41, 97),
            Point::new(41, 100),
            Point::new(1, 100),
        ]);
        assert!(sliver.area() >= DetectorConfig::DEFAULT_MIN_AREA);
        assert!(annotate(std::slice::from_ref(&sliver), &DetectorConfig::default()).is_empty());

        let config = DetectorConfig {
            min_extent: 0,
            ..DetectorConfig::default()
        };
        let kept = annotate(&[sliver], &config);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].bounding_box.height, 4);
    }

    #[test]
    fn degenerate_contours_are_skipped() {
        let config = DetectorConfig {
            min_area: 0.0,
            min_extent: 0,
            ..DetectorConfig::default()
        };
        let line = Contour::new(vec![Point::new(0, 0), Point::new(10, 0)]);
        assert!(annotate(&[line], &config).is_empty());
    }
}
