//! shapesense-sketch: parametrized shape sketching (sans-IO).
//!
//! A [`Sketch`] holds a canvas size, a background color and an ordered
//! history of [`SketchShape`]s that can be appended to, undone or
//! cleared. [`render`] rasterises the history with anti-aliasing and
//! [`to_png`] encodes the result.

pub mod color;
pub mod render;
pub mod shape;
pub mod sketch;

pub use color::Color;
pub use render::{render, to_png};
pub use shape::{ShapeParams, SketchKind, SketchShape};
pub use sketch::Sketch;

/// Errors from building or exporting a sketch.
#[derive(Debug, thiserror::Error)]
pub enum SketchError {
    /// The shape name is not one of the supported kinds.
    #[error("unknown shape '{0}' (expected rectangle, square, circle, oval or triangle)")]
    UnknownShape(String),

    /// The color string is not `#RRGGBB`.
    #[error("invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),

    /// Canvas or shape geometry cannot be drawn.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(#[source] image::ImageError),
}
