//! A canvas description with an undo-able shape history.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::SketchError;
use crate::color::Color;
use crate::shape::{ShapeParams, SketchKind, SketchShape};

/// Canvas size, background, and the shapes placed on it in order.
///
/// Deserialization goes through [`Sketch::new`] and [`Sketch::add`], so a
/// loaded sketch obeys the same limits as one built in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSketch")]
pub struct Sketch {
    width: u32,
    height: u32,
    background: Color,
    shapes: Vec<SketchShape>,
}

/// Unchecked wire form of a [`Sketch`].
#[derive(Deserialize)]
struct RawSketch {
    width: u32,
    height: u32,
    background: Color,
    #[serde(default)]
    shapes: Vec<SketchShape>,
}

impl TryFrom<RawSketch> for Sketch {
    type Error = SketchError;

    fn try_from(raw: RawSketch) -> Result<Self, Self::Error> {
        let mut sketch = Self::new(raw.width, raw.height, raw.background)?;
        for shape in raw.shapes {
            sketch.add(shape)?;
        }
        Ok(sketch)
    }
}

impl Sketch {
    /// Largest accepted canvas side in pixels.
    pub const MAX_SIDE: u32 = 8192;

    /// Create an empty sketch.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidDimensions`] if either side is zero or
    /// larger than [`Sketch::MAX_SIDE`].
    pub fn new(width: u32, height: u32, background: Color) -> Result<Self, SketchError> {
        if width == 0 || height == 0 {
            return Err(SketchError::InvalidDimensions(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        if width > Self::MAX_SIDE || height > Self::MAX_SIDE {
            return Err(SketchError::InvalidDimensions(format!(
                "canvas sides are limited to {}, got {width}x{height}",
                Self::MAX_SIDE
            )));
        }
        Ok(Self {
            width,
            height,
            background,
            shapes: Vec::new(),
        })
    }

    /// Canvas width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Background color.
    #[must_use]
    pub const fn background(&self) -> Color {
        self.background
    }

    /// Shapes in the order they were added.
    #[must_use]
    pub fn shapes(&self) -> &[SketchShape] {
        &self.shapes
    }

    /// Number of shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether no shapes have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Append a shape.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidDimensions`] if the shape fails
    /// [`SketchShape::validate`]; the sketch is left unchanged.
    pub fn add(&mut self, shape: SketchShape) -> Result<(), SketchError> {
        shape.validate()?;
        debug!(kind = %shape.kind, count = self.shapes.len() + 1, "shape added");
        self.shapes.push(shape);
        Ok(())
    }

    /// Append a shape given its kind by name.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::UnknownShape`] for an unrecognized name, or
    /// [`SketchError::InvalidDimensions`] for bad geometry. Either way the
    /// sketch is left unchanged.
    pub fn add_named(&mut self, name: &str, params: ShapeParams) -> Result<(), SketchError> {
        let kind: SketchKind = name.parse()?;
        self.add(SketchShape::new(kind, params))
    }

    /// Remove and return the most recently added shape.
    pub fn undo(&mut self) -> Option<SketchShape> {
        let popped = self.shapes.pop();
        debug!(removed = popped.is_some(), remaining = self.shapes.len(), "undo");
        popped
    }

    /// Remove every shape.
    pub fn clear(&mut self) {
        debug!(removed = self.shapes.len(), "sketch cleared");
        self.shapes.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sketch() -> Sketch {
        Sketch::new(200, 100, Color::WHITE).unwrap()
    }

    #[test]
    fn empty_canvas_rejected() {
        assert!(matches!(
            Sketch::new(0, 10, Color::WHITE),
            Err(SketchError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn oversized_canvas_rejected() {
        assert!(Sketch::new(Sketch::MAX_SIDE, Sketch::MAX_SIDE, Color::WHITE).is_ok());
        for (w, h) in [(100_000, 100_000), (Sketch::MAX_SIDE + 1, 1), (1, Sketch::MAX_SIDE + 1)] {
            assert!(matches!(
                Sketch::new(w, h, Color::WHITE),
                Err(SketchError::InvalidDimensions(_))
            ));
        }
    }

    #[test]
    fn deserialization_is_validated() {
        let ok: Sketch = serde_json::from_str(
            r##"{"width": 20, "height": 10, "background": "#ffffff",
                "shapes": [{"kind": "circle", "center": [5, 5], "width": 4}]}"##,
        )
        .unwrap();
        assert_eq!(ok.len(), 1);

        for bad in [
            r##"{"width": 0, "height": 0, "background": "#ffffff", "shapes": []}"##,
            r##"{"width": 100000, "height": 100000, "background": "#ffffff"}"##,
            r##"{"width": 20, "height": 10, "background": "#ffffff",
                "shapes": [{"kind": "rectangle", "width": -5}]}"##,
        ] {
            let err = serde_json::from_str::<Sketch>(bad).unwrap_err().to_string();
            assert!(err.contains("invalid dimensions"), "{err}");
        }
    }

    #[test]
    fn undo_pops_in_reverse_order() {
        let mut s = sketch();
        s.add_named("circle", ShapeParams::default()).unwrap();
        s.add_named("triangle", ShapeParams::default()).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.undo().unwrap().kind, SketchKind::Triangle);
        assert_eq!(s.undo().unwrap().kind, SketchKind::Circle);
        assert!(s.undo().is_none());
        assert!(s.is_empty());
    }

    #[test]
    fn unknown_name_leaves_history_alone() {
        let mut s = sketch();
        s.add_named("square", ShapeParams::default()).unwrap();
        let err = s.add_named("star", ShapeParams::default()).unwrap_err();
        assert!(matches!(err, SketchError::UnknownShape(_)));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn invalid_shape_is_not_added() {
        let mut s = sketch();
        let params = ShapeParams {
            width: -5.0,
            ..ShapeParams::default()
        };
        assert!(s.add_named("rectangle", params).is_err());
        assert!(s.is_empty());
    }

    #[test]
    fn clear_empties_history() {
        let mut s = sketch();
        for name in ["oval", "rectangle", "square"] {
            s.add_named(name, ShapeParams::default()).unwrap();
        }
        s.clear();
        assert!(s.shapes().is_empty());
        assert_eq!((s.width(), s.height()), (200, 100));
    }
}
