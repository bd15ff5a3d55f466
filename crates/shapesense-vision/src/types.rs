//! Shared types for the shapesense vision pipelines.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage`, the frame type consumed by both pipelines.
pub use image::RgbImage;

/// A 2D point in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: i32,
    /// Vertical position (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Axis-aligned bounding box with inclusive pixel extents.
///
/// A box around a single point has `width == height == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BoundingBox {
    /// Bounding box enclosing `points`, or `None` when `points` is empty.
    #[must_use]
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x.abs_diff(min_x) + 1,
            height: max_y.abs_diff(min_y) + 1,
        })
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Midpoint of the box, rounded toward the top-left.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn center(&self) -> Point {
        Point::new(
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }
}

/// A closed boundary traced around a connected foreground region.
///
/// The last point implicitly connects back to the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour(Vec<Point>);

impl Contour {
    /// Create a new contour from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the contour.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Closed arc length, including the segment from the last point back
    /// to the first.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        closed_length(&self.0)
    }

    /// Enclosed area by the shoelace formula.
    #[must_use]
    pub fn area(&self) -> f64 {
        shoelace_area(&self.0)
    }

    /// Bounding box of the contour points.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(&self.0)
    }
}

/// A simplified closed polygon approximating a [`Contour`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon(Vec<Point>);

impl Polygon {
    /// Create a new polygon from its vertices.
    #[must_use]
    pub const fn new(vertices: Vec<Point>) -> Self {
        Self(vertices)
    }

    /// Number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the polygon has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a slice of all vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.0
    }

    /// Enclosed area by the shoelace formula.
    #[must_use]
    pub fn area(&self) -> f64 {
        shoelace_area(&self.0)
    }

    /// Bounding box of the vertices.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(&self.0)
    }
}

fn closed_length(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let open: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    open + points[points.len() - 1].distance(points[0])
}

fn shoelace_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice += i64::from(p.x) * i64::from(q.y) - i64::from(q.x) * i64::from(p.y);
    }
    #[allow(clippy::cast_precision_loss)]
    let area = twice.unsigned_abs() as f64 / 2.0;
    area
}

/// Errors that can occur in the vision pipelines.
///
/// Per-frame processing never fails; these cover decoding, encoding and
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[source] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(#[source] image::ImageError),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square(side: i32) -> Vec<Point> {
        vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ]
    }

    #[test]
    fn point_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bounding_box_is_inclusive() {
        let bbox = BoundingBox::enclosing(&[Point::new(5, 7)]).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x: 5,
                y: 7,
                width: 1,
                height: 1
            }
        );

        let bbox = BoundingBox::enclosing(&square(10)).unwrap();
        assert_eq!(bbox.width, 11);
        assert_eq!(bbox.height, 11);
        assert!((bbox.aspect_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bounding_box_of_nothing_is_none() {
        assert!(BoundingBox::enclosing(&[]).is_none());
    }

    #[test]
    fn bounding_box_center_rounds_down() {
        let bbox = BoundingBox {
            x: 10,
            y: 20,
            width: 5,
            height: 4,
        };
        assert_eq!(bbox.center(), Point::new(12, 22));
    }

    #[test]
    fn contour_perimeter_closes_the_loop() {
        let contour = Contour::new(square(10));
        assert!((contour.perimeter() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn contour_area_is_orientation_independent() {
        let mut points = square(10);
        assert!((Contour::new(points.clone()).area() - 100.0).abs() < 1e-9);
        points.reverse();
        assert!((Contour::new(points).area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_contours_have_no_area() {
        assert!(Contour::new(vec![]).area().abs() < f64::EPSILON);
        assert!(
            Contour::new(vec![Point::new(0, 0), Point::new(5, 5)])
                .area()
                .abs()
                < f64::EPSILON
        );
        assert!(Contour::new(vec![Point::new(3, 3)]).perimeter().abs() < f64::EPSILON);
    }

    #[test]
    fn polygon_accessors() {
        let polygon = Polygon::new(square(4));
        assert_eq!(polygon.len(), 4);
        assert!(!polygon.is_empty());
        assert!((polygon.area() - 16.0).abs() < 1e-9);
        assert_eq!(polygon.bounding_box().unwrap().width, 5);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            VisionError::EmptyInput.to_string(),
            "input image data is empty"
        );
        assert_eq!(
            VisionError::InvalidConfig("canny_low > canny_high".to_string()).to_string(),
            "invalid configuration: canny_low > canny_high",
        );
    }

    #[test]
    fn polygon_serde_round_trip() {
        let polygon = Polygon::new(square(3));
        let json = serde_json::to_string(&polygon).unwrap();
        let back: Polygon = serde_json::from_str(&json).unwrap();
        assert_eq!(polygon, back);
    }
}
