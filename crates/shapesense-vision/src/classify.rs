//! Shape labels from polygon vertex counts.
//!
//! Classification looks only at how many vertices the approximation kept
//! and, for quadrilaterals, at the bounding-box aspect ratio. Anything
//! that is not a triangle, quadrilateral or pentagon is labelled
//! [`ShapeKind::Circle`]; smooth curves approximate to many vertices, but
//! so do irregular outlines, so the label means "circle or other".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, Polygon};

/// Aspect ratios within `1.0 ± DEFAULT_SQUARE_TOLERANCE` make a quadrilateral a
/// square.
pub const DEFAULT_SQUARE_TOLERANCE: f64 = 0.05;

/// The label assigned to a detected shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Three vertices.
    Triangle,
    /// Four vertices with a near-unit aspect ratio.
    Square,
    /// Four vertices otherwise.
    Rectangle,
    /// Five vertices.
    Pentagon,
    /// Any other vertex count.
    Circle,
}

impl ShapeKind {
    /// Every label, in classification order.
    pub const ALL: [Self; 5] = [
        Self::Triangle,
        Self::Square,
        Self::Rectangle,
        Self::Pentagon,
        Self::Circle,
    ];

    /// Display name of the label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Triangle => "Triangle",
            Self::Square => "Square",
            Self::Rectangle => "Rectangle",
            Self::Pentagon => "Pentagon",
            Self::Circle => "Circle",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Label a shape from its vertex count and bounding box.
///
/// The square test is inclusive on both ends:
/// `1 - square_tolerance <= width / height <= 1 + square_tolerance`.
#[must_use]
pub fn classify(vertex_count: usize, bounding_box: &BoundingBox, square_tolerance: f64) -> ShapeKind {
    match vertex_count {
        3 => ShapeKind::Triangle,
        4 => {
            let ratio = bounding_box.aspect_ratio();
            if (1.0 - square_tolerance..=1.0 + square_tolerance).contains(&ratio) {
                ShapeKind::Square
            } else {
                ShapeKind::Rectangle
            }
        }
        5 => ShapeKind::Pentagon,
        _ => ShapeKind::Circle,
    }
}

/// A labelled shape found in a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeAnnotation {
    /// Assigned label.
    pub kind: ShapeKind,
    /// Bounding box of the approximated polygon.
    pub bounding_box: BoundingBox,
    /// The approximated polygon.
    pub polygon: Polygon,
}
