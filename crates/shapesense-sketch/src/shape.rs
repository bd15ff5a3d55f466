//! Parametrized sketch shapes and their outlines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tiny_skia::{Path, PathBuilder, Rect, Transform};

use crate::SketchError;
use crate::color::Color;

/// Kinds of shape a sketch can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SketchKind {
    /// Axis-aligned (before rotation) rectangle of `width` × `height`.
    Rectangle,
    /// Square of side `width`.
    Square,
    /// Circle of diameter `width`.
    Circle,
    /// Ellipse inscribed in the `width` × `height` box.
    Oval,
    /// Isosceles triangle with its apex at the top-center of the box.
    Triangle,
}

impl SketchKind {
    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Square => "square",
            Self::Circle => "circle",
            Self::Oval => "oval",
            Self::Triangle => "triangle",
        }
    }

    /// Whether the shape uses `width` for both axes.
    #[must_use]
    pub const fn is_uniform(self) -> bool {
        matches!(self, Self::Square | Self::Circle)
    }
}

impl fmt::Display for SketchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SketchKind {
    type Err = SketchError;

    /// Case-insensitive; `ellipse` is accepted for [`SketchKind::Oval`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangle" => Ok(Self::Rectangle),
            "square" => Ok(Self::Square),
            "circle" => Ok(Self::Circle),
            "oval" | "ellipse" => Ok(Self::Oval),
            "triangle" => Ok(Self::Triangle),
            _ => Err(SketchError::UnknownShape(s.to_string())),
        }
    }
}

/// Placement and style shared by every shape kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    /// Center of the shape's box, `[x, y]` in pixels.
    pub center: [f32; 2],
    /// Box width in pixels.
    pub width: f32,
    /// Box height in pixels; ignored by squares and circles.
    pub height: f32,
    /// Clockwise rotation about the center, in degrees.
    pub rotation_degrees: f32,
    /// Interior color; `None` leaves the interior transparent.
    pub fill: Option<Color>,
    /// Outline color.
    pub border: Color,
    /// Outline width in pixels; zero draws no outline.
    pub thickness: f32,
}

impl ShapeParams {
    /// Default center, `[100, 100]`.
    pub const DEFAULT_CENTER: [f32; 2] = [100.0, 100.0];
    /// Default box width.
    pub const DEFAULT_WIDTH: f32 = 100.0;
    /// Default box height.
    pub const DEFAULT_HEIGHT: f32 = 60.0;
    /// Default outline width.
    pub const DEFAULT_THICKNESS: f32 = 2.0;
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            center: Self::DEFAULT_CENTER,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            rotation_degrees: 0.0,
            fill: None,
            border: Color::BLACK,
            thickness: Self::DEFAULT_THICKNESS,
        }
    }
}

/// A shape placed on a sketch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SketchShape {
    /// What to draw.
    pub kind: SketchKind,
    /// Where and how to draw it.
    #[serde(flatten)]
    pub params: ShapeParams,
}

impl SketchShape {
    /// Create a shape.
    #[must_use]
    pub const fn new(kind: SketchKind, params: ShapeParams) -> Self {
        Self { kind, params }
    }

    /// Width and height actually drawn.
    #[must_use]
    pub const fn size(&self) -> (f32, f32) {
        if self.kind.is_uniform() {
            (self.params.width, self.params.width)
        } else {
            (self.params.width, self.params.height)
        }
    }

    /// Check that the geometry can be drawn.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidDimensions`] for a non-positive or
    /// non-finite size, a negative or non-finite thickness, or a
    /// non-finite center or rotation.
    pub fn validate(&self) -> Result<(), SketchError> {
        let (w, h) = self.size();
        let p = &self.params;
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(SketchError::InvalidDimensions(format!(
                "{} size must be positive, got {w}x{h}",
                self.kind
            )));
        }
        if !p.thickness.is_finite() || p.thickness < 0.0 {
            return Err(SketchError::InvalidDimensions(format!(
                "thickness must be non-negative, got {}",
                p.thickness
            )));
        }
        if !(p.center.iter().all(|c| c.is_finite()) && p.rotation_degrees.is_finite()) {
            return Err(SketchError::InvalidDimensions(
                "center and rotation must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Outline in unrotated canvas coordinates.
    pub(crate) fn path(&self) -> Option<Path> {
        let (w, h) = self.size();
        let [cx, cy] = self.params.center;
        let (left, top) = (cx - w / 2.0, cy - h / 2.0);
        match self.kind {
            SketchKind::Rectangle | SketchKind::Square => {
                Some(PathBuilder::from_rect(Rect::from_xywh(left, top, w, h)?))
            }
            SketchKind::Circle => PathBuilder::from_circle(cx, cy, w / 2.0),
            SketchKind::Oval => PathBuilder::from_oval(Rect::from_xywh(left, top, w, h)?),
            SketchKind::Triangle => {
                let mut pb = PathBuilder::new();
                pb.move_to(cx, top);
                pb.line_to(left + w, top + h);
                pb.line_to(left, top + h);
                pb.close();
                pb.finish()
            }
        }
    }

    /// Rotation about the shape's center.
    pub(crate) fn transform(&self) -> Transform {
        let [cx, cy] = self.params.center;
        Transform::from_rotate_at(self.params.rotation_degrees, cx, cy)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("Rectangle".parse::<SketchKind>().unwrap(), SketchKind::Rectangle);
        assert_eq!("SQUARE".parse::<SketchKind>().unwrap(), SketchKind::Square);
        assert_eq!(" circle ".parse::<SketchKind>().unwrap(), SketchKind::Circle);
        assert_eq!("oval".parse::<SketchKind>().unwrap(), SketchKind::Oval);
        assert_eq!("Ellipse".parse::<SketchKind>().unwrap(), SketchKind::Oval);
        assert_eq!("triangle".parse::<SketchKind>().unwrap(), SketchKind::Triangle);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = "hexagon".parse::<SketchKind>().unwrap_err();
        assert!(matches!(err, SketchError::UnknownShape(ref name) if name == "hexagon"));
    }

    #[test]
    fn uniform_kinds_ignore_height() {
        let params = ShapeParams {
            width: 40.0,
            height: 10.0,
            ..ShapeParams::default()
        };
        assert_eq!(SketchShape::new(SketchKind::Square, params).size(), (40.0, 40.0));
        assert_eq!(SketchShape::new(SketchKind::Circle, params).size(), (40.0, 40.0));
        assert_eq!(SketchShape::new(SketchKind::Oval, params).size(), (40.0, 10.0));
    }

    #[test]
    fn validation() {
        let ok = SketchShape::new(SketchKind::Triangle, ShapeParams::default());
        assert!(ok.validate().is_ok());

        let flat = SketchShape::new(
            SketchKind::Rectangle,
            ShapeParams {
                height: 0.0,
                ..ShapeParams::default()
            },
        );
        assert!(matches!(flat.validate(), Err(SketchError::InvalidDimensions(_))));

        // Height is irrelevant for a circle.
        let circle = SketchShape::new(SketchKind::Circle, flat.params);
        assert!(circle.validate().is_ok());

        let negative = SketchShape::new(
            SketchKind::Oval,
            ShapeParams {
                thickness: -1.0,
                ..ShapeParams::default()
            },
        );
        assert!(negative.validate().is_err());
    }

    #[test]
    fn every_kind_has_a_path() {
        for kind in [
            SketchKind::Rectangle,
            SketchKind::Square,
            SketchKind::Circle,
            SketchKind::Oval,
            SketchKind::Triangle,
        ] {
            let shape = SketchShape::new(kind, ShapeParams::default());
            let bounds = shape.path().unwrap().bounds();
            let (w, h) = shape.size();
            assert!((bounds.width() - w).abs() < 0.5, "{kind}");
            assert!((bounds.height() - h).abs() < 0.5, "{kind}");
        }
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let shape: SketchShape =
            serde_json::from_str(r##"{"kind": "oval", "width": 30, "fill": "#00ff00"}"##).unwrap();
        assert_eq!(shape.kind, SketchKind::Oval);
        assert!((shape.params.width - 30.0).abs() < f32::EPSILON);
        assert!((shape.params.height - ShapeParams::DEFAULT_HEIGHT).abs() < f32::EPSILON);
        assert_eq!(shape.params.fill, Some(Color::new(0, 255, 0)));
    }
}
