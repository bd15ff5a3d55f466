//! Hue/saturation/value conversion and color-range segmentation.
//!
//! Values follow the common 8-bit convention: hue is degrees halved so it
//! fits a byte (`0..180`), saturation and value span `0..=255`.

use std::fmt;
use std::str::FromStr;

use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::types::VisionError;

/// Largest representable hue.
pub const MAX_HUE: u8 = 179;

/// An 8-bit HSV triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsv {
    /// Hue, `0..=179` (degrees / 2).
    pub h: u8,
    /// Saturation, `0..=255`.
    pub s: u8,
    /// Value, `0..=255`.
    pub v: u8,
}

impl Hsv {
    /// Create a new HSV triple.
    #[must_use]
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    /// Convert an RGB pixel.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::float_cmp
    )]
    pub fn from_rgb(pixel: Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0.map(f32::from);
        let v = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = v - min;

        let s = if v > 0.0 { 255.0 * delta / v } else { 0.0 };

        let degrees = if delta == 0.0 {
            0.0
        } else if v == r {
            60.0 * (g - b) / delta
        } else if v == g {
            60.0f32.mul_add((b - r) / delta, 120.0)
        } else {
            60.0f32.mul_add((r - g) / delta, 240.0)
        };
        let degrees = if degrees < 0.0 { degrees + 360.0 } else { degrees };
        let h = (degrees / 2.0).round() as u16 % 180;

        Self {
            h: h as u8,
            s: s.round() as u8,
            v: v as u8,
        }
    }
}

impl fmt::Display for Hsv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.h, self.s, self.v)
    }
}

impl FromStr for Hsv {
    type Err = VisionError;

    /// Parse `"H,S,V"`, e.g. `"100,150,50"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let &[h, sat, v] = parts.as_slice() else {
            return Err(VisionError::InvalidConfig(format!(
                "HSV triple must be 'H,S,V', got: '{s}'"
            )));
        };
        let component = |name: &str, text: &str| {
            text.parse::<u8>().map_err(|e| {
                VisionError::InvalidConfig(format!("invalid HSV {name} '{text}': {e}"))
            })
        };
        let hsv = Self::new(
            component("hue", h)?,
            component("saturation", sat)?,
            component("value", v)?,
        );
        if hsv.h > MAX_HUE {
            return Err(VisionError::InvalidConfig(format!(
                "hue must be at most {MAX_HUE}, got {}",
                hsv.h
            )));
        }
        Ok(hsv)
    }
}

/// An inclusive per-channel HSV window.
///
/// The default selects saturated blue objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    /// Lower bound (inclusive).
    pub lower: Hsv,
    /// Upper bound (inclusive).
    pub upper: Hsv,
}

impl HsvRange {
    /// Default lower bound: H 100, S 150, V 50.
    pub const DEFAULT_LOWER: Hsv = Hsv::new(100, 150, 50);
    /// Default upper bound: H 140, S 255, V 255.
    pub const DEFAULT_UPPER: Hsv = Hsv::new(140, 255, 255);

    /// Whether `hsv` falls inside the window on every channel.
    #[must_use]
    pub const fn contains(&self, hsv: Hsv) -> bool {
        hsv.h >= self.lower.h
            && hsv.h <= self.upper.h
            && hsv.s >= self.lower.s
            && hsv.s <= self.upper.s
            && hsv.v >= self.lower.v
            && hsv.v <= self.upper.v
    }

    /// Check that each lower bound is at most its upper bound and that
    /// hues are representable.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::InvalidConfig`] describing the first
    /// violated bound.
    pub fn validate(&self) -> Result<(), VisionError> {
        if self.upper.h > MAX_HUE {
            return Err(VisionError::InvalidConfig(format!(
                "upper hue must be at most {MAX_HUE}, got {}",
                self.upper.h
            )));
        }
        for (name, lo, hi) in [
            ("hue", self.lower.h, self.upper.h),
            ("saturation", self.lower.s, self.upper.s),
            ("value", self.lower.v, self.upper.v),
        ] {
            if lo > hi {
                return Err(VisionError::InvalidConfig(format!(
                    "lower {name} {lo} exceeds upper {name} {hi}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for HsvRange {
    fn default() -> Self {
        Self {
            lower: Self::DEFAULT_LOWER,
            upper: Self::DEFAULT_UPPER,
        }
    }
}

/// Binary mask of the pixels whose HSV value lies inside `range`:
/// 255 inside, 0 outside.
#[must_use = "returns the color mask"]
pub fn in_range_mask(frame: &RgbImage, range: &HsvRange) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let hsv = Hsv::from_rgb(*frame.get_pixel(x, y));
        Luma([if range.contains(hsv) { 255 } else { 0 }])
    })
}
