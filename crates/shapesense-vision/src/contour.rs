//! Contour extraction from binary images.
//!
//! Suzuki-Abe border following via [`imageproc::contours::find_contours`],
//! keeping only external borders: outer borders that have no enclosing
//! parent. Hole borders and anything nested inside another region are
//! dropped, so a thick ring yields one contour, not two.

use image::GrayImage;
use imageproc::contours::BorderType;

use crate::types::{Contour, Point};

/// Trace the external contours of a binary image.
///
/// Any non-zero pixel counts as foreground. Contours are returned in the
/// order the raster scan discovers them (top-to-bottom, left-to-right by
/// starting pixel), which is deterministic for a given image.
#[must_use = "returns the traced contours"]
pub fn external_contours(binary: &GrayImage) -> Vec<Contour> {
    imageproc::contours::find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            Contour::new(
                c.points
                    .into_iter()
                    .map(|p| Point::new(p.x, p.y))
                    .collect(),
            )
        })
        .collect()
}

/// The contour with the largest enclosed area, with that area.
///
/// Ties keep the earliest contour.
#[must_use]
pub fn largest_by_area(contours: &[Contour]) -> Option<(&Contour, f64)> {
    contours
        .iter()
        .map(|c| (c, c.area()))
        .fold(None, |best, (c, area)| match best {
            Some((_, best_area)) if best_area >= area => best,
            _ => Some((c, area)),
        })
}
