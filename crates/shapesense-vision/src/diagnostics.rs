//! Shape classifier diagnostics: timing and counts for each stage.
//!
//! Intended for threshold tuning. Time is read through the [`Clock`]
//! trait so the crate stays free of platform timing APIs; the binary
//! supplies an implementation backed by `std::time::Instant`.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::collections::BTreeMap;
use std::time::Duration;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::classify::ShapeAnnotation;
use crate::config::DetectorConfig;
use crate::types::Contour;
use crate::{blur, contour, edge, grayscale};

/// Source of monotonic timestamps.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single classifier run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionDiagnostics {
    /// Luminance conversion.
    pub grayscale: StageDiagnostics,
    /// Gaussian blur.
    pub blur: StageDiagnostics,
    /// Canny edge detection.
    pub edge_detection: StageDiagnostics,
    /// External contour tracing.
    pub contour_tracing: StageDiagnostics,
    /// Polygon approximation and classification.
    pub approximation: StageDiagnostics,
    /// Wall-clock duration of the whole run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Number of shapes per label.
    pub label_counts: BTreeMap<String, usize>,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Luminance conversion.
    Grayscale {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
    },
    /// Gaussian blur.
    Blur {
        /// Kernel side length.
        kernel: u32,
        /// Sigma derived from the kernel size.
        sigma: f32,
    },
    /// Canny edge detection.
    EdgeDetection {
        /// Low threshold as configured.
        low_threshold: f32,
        /// High threshold as configured.
        high_threshold: f32,
        /// Number of edge pixels in the output.
        edge_pixel_count: u64,
        /// Total pixel count for computing edge density.
        total_pixel_count: u64,
    },
    /// Contour tracing.
    ContourTracing {
        /// Number of external contours.
        contour_count: usize,
        /// Total points across all contours.
        total_point_count: usize,
        /// Fewest points in a single contour.
        min_contour_points: usize,
        /// Most points in a single contour.
        max_contour_points: usize,
        /// Mean points per contour.
        mean_contour_points: f64,
    },
    /// Polygon approximation and classification.
    Approximation {
        /// Tolerance as a fraction of each contour's perimeter.
        epsilon_fraction: f64,
        /// Shapes emitted.
        shape_count: usize,
        /// Contour points before approximation.
        points_before: usize,
        /// Polygon vertices after approximation, over emitted shapes.
        points_after: usize,
    },
}

impl DetectionDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Shape Detection Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration)
        ));
        lines.push(String::new());
        lines.push(format!(
            "{:<20} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for (name, diag) in [
            ("Grayscale", &self.grayscale),
            ("Blur", &self.blur),
            ("Edge Detection", &self.edge_detection),
            ("Contour Tracing", &self.contour_tracing),
            ("Approximation", &self.approximation),
        ] {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<20} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        if self.label_counts.is_empty() {
            lines.push("Shapes: none".to_string());
        } else {
            let labels: Vec<String> = self
                .label_counts
                .iter()
                .map(|(label, n)| format!("{label}={n}"))
                .collect();
            lines.push(format!("Shapes: {}", labels.join("  ")));
        }

        lines.join("\n")
    }
}

fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Grayscale { width, height } => format!("{width}x{height}"),
        StageMetrics::Blur { kernel, sigma } => format!("{kernel}x{kernel} sigma={sigma:.2}"),
        StageMetrics::EdgeDetection {
            low_threshold,
            high_threshold,
            edge_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *edge_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!(
                "low={low_threshold:.1} high={high_threshold:.1} edges={edge_pixel_count} ({density:.1}%)"
            )
        }
        StageMetrics::ContourTracing {
            contour_count,
            total_point_count,
            min_contour_points,
            max_contour_points,
            mean_contour_points,
        } => format!(
            "{contour_count} contours, {total_point_count} pts (min={min_contour_points} max={max_contour_points} mean={mean_contour_points:.1})"
        ),
        StageMetrics::Approximation {
            epsilon_fraction,
            shape_count,
            points_before,
            points_after,
        } => format!(
            "eps={:.1}% {points_before}->{points_after} pts, {shape_count} shapes",
            epsilon_fraction * 100.0
        ),
    }
}

fn contour_metrics(contours: &[Contour]) -> StageMetrics {
    let total: usize = contours.iter().map(Contour::len).sum();
    let min = contours.iter().map(Contour::len).min().unwrap_or(0);
    let max = contours.iter().map(Contour::len).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let mean = if contours.is_empty() {
        0.0
    } else {
        total as f64 / contours.len() as f64
    };
    StageMetrics::ContourTracing {
        contour_count: contours.len(),
        total_point_count: total,
        min_contour_points: min,
        max_contour_points: max,
        mean_contour_points: mean,
    }
}

/// Run [`detect_shapes`](crate::detect_shapes) while timing each stage.
///
/// Returns the same annotations `detect_shapes` would, plus the
/// diagnostics. Frames smaller than the edge detector's minimum size are
/// still timed; every stage after grayscale reports empty results.
pub fn detect_shapes_with_diagnostics<C: Clock>(
    frame: &RgbImage,
    config: &DetectorConfig,
    clock: &C,
) -> (Vec<ShapeAnnotation>, DetectionDiagnostics) {
    let start = clock.now();

    let t = clock.now();
    let gray = grayscale::to_luma(frame);
    let grayscale = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Grayscale {
            width: gray.width(),
            height: gray.height(),
        },
    };

    let tiny = frame.width() < edge::MIN_SIDE || frame.height() < edge::MIN_SIDE;

    let t = clock.now();
    let sigma = blur::sigma_for_kernel(config.blur_kernel);
    let blurred = if tiny {
        gray
    } else {
        blur::gaussian_blur(&gray, sigma)
    };
    let blur = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Blur {
            kernel: config.blur_kernel,
            sigma,
        },
    };

    let t = clock.now();
    let edges = edge::canny(&blurred, config.canny_low, config.canny_high);
    let edge_detection = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::EdgeDetection {
            low_threshold: config.canny_low,
            high_threshold: config.canny_high,
            edge_pixel_count: edge::count_edge_pixels(&edges),
            total_pixel_count: u64::from(edges.width()) * u64::from(edges.height()),
        },
    };

    let t = clock.now();
    let contours = contour::external_contours(&edges);
    let contour_tracing = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: contour_metrics(&contours),
    };

    let t = clock.now();
    let annotations = crate::annotate(&contours, config);
    let approximation = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Approximation {
            epsilon_fraction: config.epsilon_fraction,
            shape_count: annotations.len(),
            points_before: contours.iter().map(Contour::len).sum(),
            points_after: annotations.iter().map(|a| a.polygon.len()).sum(),
        },
    };

    let mut label_counts = BTreeMap::new();
    for annotation in &annotations {
        *label_counts.entry(annotation.kind.to_string()).or_insert(0) += 1;
    }

    let diagnostics = DetectionDiagnostics {
        grayscale,
        blur,
        edge_detection,
        contour_tracing,
        approximation,
        total_duration: clock.elapsed(&start),
        label_counts,
    };
    (annotations, diagnostics)
}
