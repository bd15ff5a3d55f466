//! Tunable parameters for the shape classifier and the color tracker.

use serde::{Deserialize, Serialize};

use crate::classify::DEFAULT_SQUARE_TOLERANCE;
use crate::edge::MIN_THRESHOLD;
use crate::hsv::HsvRange;
use crate::morphology::DEFAULT_ITERATIONS;
use crate::simplify::DEFAULT_EPSILON_FRACTION;
use crate::types::VisionError;

/// Parameters for [`detect_shapes`](crate::detect_shapes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Side length of the square Gaussian kernel. The blur sigma is
    /// derived from it; values below 3 disable blurring.
    pub blur_kernel: u32,

    /// Canny low (hysteresis) threshold.
    ///
    /// Must be at least [`MIN_THRESHOLD`] and at most `canny_high`.
    pub canny_low: f32,

    /// Canny high threshold.
    pub canny_high: f32,

    /// Polygon approximation tolerance as a fraction of the contour
    /// perimeter.
    pub epsilon_fraction: f64,

    /// Allowed deviation of a quadrilateral's aspect ratio from 1.0 for
    /// it to count as a square.
    pub square_tolerance: f64,

    /// Contours, and approximated polygons, enclosing less than this many
    /// square pixels are ignored. Zero disables the filter.
    pub min_area: f64,

    /// Polygons whose bounding box is thinner than this many pixels are
    /// ignored. Zero disables the filter.
    pub min_extent: u32,
}

impl DetectorConfig {
    /// Default Gaussian kernel size.
    pub const DEFAULT_BLUR_KERNEL: u32 = 5;
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 50.0;
    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 150.0;
    /// Default approximation tolerance fraction.
    pub const DEFAULT_EPSILON_FRACTION: f64 = DEFAULT_EPSILON_FRACTION;
    /// Default square tolerance.
    pub const DEFAULT_SQUARE_TOLERANCE: f64 = DEFAULT_SQUARE_TOLERANCE;
    /// Default minimum contour area in square pixels.
    pub const DEFAULT_MIN_AREA: f64 = 100.0;
    /// Default minimum bounding-box short side in pixels.
    pub const DEFAULT_MIN_EXTENT: u32 = 5;

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::InvalidConfig`] when a threshold is below
    /// [`MIN_THRESHOLD`], the thresholds are out of order, or a fraction,
    /// tolerance or area is negative or not finite.
    pub fn validate(&self) -> Result<(), VisionError> {
        if self.canny_low.is_nan() || self.canny_low < MIN_THRESHOLD {
            return Err(VisionError::InvalidConfig(format!(
                "canny_low must be at least {MIN_THRESHOLD}, got {}",
                self.canny_low
            )));
        }
        if self.canny_high.is_nan() || self.canny_high < self.canny_low {
            return Err(VisionError::InvalidConfig(format!(
                "canny_low ({}) must not exceed canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        for (name, value) in [
            ("epsilon_fraction", self.epsilon_fraction),
            ("square_tolerance", self.square_tolerance),
            ("min_area", self.min_area),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(VisionError::InvalidConfig(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            blur_kernel: Self::DEFAULT_BLUR_KERNEL,
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            epsilon_fraction: Self::DEFAULT_EPSILON_FRACTION,
            square_tolerance: Self::DEFAULT_SQUARE_TOLERANCE,
            min_area: Self::DEFAULT_MIN_AREA,
            min_extent: Self::DEFAULT_MIN_EXTENT,
        }
    }
}

/// Parameters for a [`TrackerSession`](crate::tracker::TrackerSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// HSV window selecting the tracked object.
    pub range: HsvRange,

    /// Erode/dilate passes applied to the color mask.
    pub morph_iterations: u8,

    /// The largest region must enclose at least this many square pixels
    /// to count as a detection.
    pub min_area: f64,

    /// Stroke width in pixels.
    pub stroke_thickness: u32,

    /// Stroke color as `[r, g, b]`.
    pub stroke_color: [u8; 3],

    /// Flip each frame horizontally before processing (selfie view).
    pub mirror: bool,
}

impl TrackerConfig {
    /// Default erode/dilate passes.
    pub const DEFAULT_MORPH_ITERATIONS: u8 = DEFAULT_ITERATIONS;
    /// Default minimum region area in square pixels.
    pub const DEFAULT_MIN_AREA: f64 = 500.0;
    /// Default stroke width in pixels.
    pub const DEFAULT_STROKE_THICKNESS: u32 = 5;
    /// Default stroke color (red).
    pub const DEFAULT_STROKE_COLOR: [u8; 3] = [255, 0, 0];

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::InvalidConfig`] for an invalid HSV window,
    /// a zero stroke thickness or a negative minimum area.
    pub fn validate(&self) -> Result<(), VisionError> {
        self.range.validate()?;
        if self.stroke_thickness == 0 {
            return Err(VisionError::InvalidConfig(
                "stroke_thickness must be at least 1".to_string(),
            ));
        }
        if !self.min_area.is_finite() || self.min_area < 0.0 {
            return Err(VisionError::InvalidConfig(format!(
                "min_area must be a finite non-negative number, got {}",
                self.min_area
            )));
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            range: HsvRange::default(),
            morph_iterations: Self::DEFAULT_MORPH_ITERATIONS,
            min_area: Self::DEFAULT_MIN_AREA,
            stroke_thickness: Self::DEFAULT_STROKE_THICKNESS,
            stroke_color: Self::DEFAULT_STROKE_COLOR,
            mirror: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::hsv::Hsv;

    #[test]
    fn defaults_are_valid() {
        DetectorConfig::default().validate().unwrap();
        TrackerConfig::default().validate().unwrap();
    }

    #[test]
    fn detector_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.blur_kernel, 5);
        assert!((config.canny_low - 50.0).abs() < f32::EPSILON);
        assert!((config.canny_high - 150.0).abs() < f32::EPSILON);
        assert!((config.epsilon_fraction - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let config = DetectorConfig {
            canny_low: 200.0,
            canny_high: 100.0,
            ..DetectorConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("must not exceed"), "{err}");
    }

    #[test]
    fn nan_threshold_rejected() {
        let config = DetectorConfig {
            canny_low: f32::NAN,
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_min_area_rejected() {
        let config = DetectorConfig {
            min_area: -1.0,
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn tracker_rejects_zero_thickness_and_bad_range() {
        let thin = TrackerConfig {
            stroke_thickness: 0,
            ..TrackerConfig::default()
        };
        assert!(thin.validate().is_err());

        let inverted = TrackerConfig {
            range: HsvRange {
                lower: Hsv::new(150, 0, 0),
                upper: Hsv::new(100, 255, 255),
            },
            ..TrackerConfig::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: DetectorConfig = serde_json::from_str(r#"{"canny_low": 20.0}"#).unwrap();
        assert!((config.canny_low - 20.0).abs() < f32::EPSILON);
        assert_eq!(config.blur_kernel, DetectorConfig::DEFAULT_BLUR_KERNEL);

        let tracker: TrackerConfig = serde_json::from_str(r#"{"mirror": true}"#).unwrap();
        assert!(tracker.mirror);
        assert_eq!(tracker.range, HsvRange::default());
    }
}
