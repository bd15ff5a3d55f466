//! Color tracking and stroke accumulation ("air drawing").
//!
//! A [`TrackerSession`] follows the largest region of a configured HSV
//! color from frame to frame and joins successive centroids with strokes
//! on a persistent overlay. Each processed frame yields the overlay
//! composited onto the (optionally mirrored) input.
//!
//! Losing the object, or seeing only a small region, breaks the stroke:
//! the next detection starts a new one instead of connecting to the old
//! position.

use std::sync::atomic::{AtomicBool, Ordering};

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::composite::{draw_thick_line, saturating_add};
use crate::config::TrackerConfig;
use crate::contour::{external_contours, largest_by_area};
use crate::hsv::in_range_mask;
use crate::morphology::open;
use crate::types::{Point, VisionError};

/// What the tracker saw in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Detection {
    /// No region of the tracked color.
    Lost,
    /// The largest region was below the minimum area.
    TooSmall {
        /// Enclosed area of the largest region in square pixels.
        area: f64,
    },
    /// First detection after a gap; nothing was drawn.
    Started {
        /// Bounding-box midpoint of the tracked region.
        centroid: Point,
    },
    /// A stroke segment was drawn.
    Stroke {
        /// Previous centroid.
        from: Point,
        /// Current centroid.
        to: Point,
    },
}

impl Detection {
    /// Centroid of the tracked region, if one qualified.
    #[must_use]
    pub const fn centroid(&self) -> Option<Point> {
        match self {
            Self::Lost | Self::TooSmall { .. } => None,
            Self::Started { centroid } => Some(*centroid),
            Self::Stroke { to, .. } => Some(*to),
        }
    }
}

/// Output of [`TrackerSession::process_frame`].
#[derive(Debug, Clone)]
pub struct TrackedFrame {
    /// Input frame with the overlay added on top.
    pub composite: RgbImage,
    /// What was detected in this frame.
    pub detection: Detection,
}

/// Tracking state carried across frames.
#[derive(Debug, Clone)]
pub struct TrackerSession {
    config: TrackerConfig,
    overlay: Option<RgbImage>,
    previous: Option<Point>,
}

impl TrackerSession {
    /// Start a session with an empty overlay.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::InvalidConfig`] if `config` fails
    /// [`TrackerConfig::validate`].
    pub fn new(config: TrackerConfig) -> Result<Self, VisionError> {
        config.validate()?;
        Ok(Self {
            config,
            overlay: None,
            previous: None,
        })
    }

    /// The session's configuration.
    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The accumulated strokes, or `None` before the first frame.
    #[must_use]
    pub const fn overlay(&self) -> Option<&RgbImage> {
        self.overlay.as_ref()
    }

    /// Centroid from the most recent qualifying detection, if the stroke
    /// is still connected.
    #[must_use]
    pub const fn previous_centroid(&self) -> Option<Point> {
        self.previous
    }

    /// Erase every stroke and break the current one.
    ///
    /// The overlay keeps its dimensions; the next detection is treated as
    /// a first detection.
    pub fn clear(&mut self) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.pixels_mut().for_each(|p| *p = Rgb([0, 0, 0]));
        }
        self.previous = None;
        debug!("tracker overlay cleared");
    }

    /// Track the configured color in `frame` and extend the drawing.
    pub fn process_frame(&mut self, frame: &RgbImage) -> TrackedFrame {
        let mirrored;
        let frame = if self.config.mirror {
            mirrored = image::imageops::flip_horizontal(frame);
            &mirrored
        } else {
            frame
        };

        let (width, height) = frame.dimensions();
        let mut overlay = match self.overlay.take() {
            Some(existing) if existing.dimensions() == (width, height) => existing,
            stale => {
                if stale.is_some() {
                    debug!(width, height, "frame size changed, overlay reset");
                    self.previous = None;
                }
                RgbImage::new(width, height)
            }
        };

        let detection = self.detect(frame);
        if let Detection::Stroke { from, to } = detection {
            let [r, g, b] = self.config.stroke_color;
            draw_thick_line(&mut overlay, from, to, self.config.stroke_thickness, Rgb([r, g, b]));
        }
        self.previous = detection.centroid();
        debug!(?detection, "frame tracked");

        let composite = saturating_add(frame, &overlay);
        self.overlay = Some(overlay);
        TrackedFrame {
            composite,
            detection,
        }
    }

    fn detect(&self, frame: &RgbImage) -> Detection {
        let mask = in_range_mask(frame, &self.config.range);
        let mask = open(&mask, self.config.morph_iterations);
        let contours = external_contours(&mask);
        trace!(contours = contours.len(), "color mask traced");

        let Some((largest, area)) = largest_by_area(&contours) else {
            return Detection::Lost;
        };
        if area < self.config.min_area {
            return Detection::TooSmall { area };
        }
        let Some(bbox) = largest.bounding_box() else {
            return Detection::Lost;
        };
        let centroid = bbox.center();
        self.previous.map_or(Detection::Started { centroid }, |from| {
            Detection::Stroke { from, to: centroid }
        })
    }
}

/// Why [`drive`] returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveEnd {
    /// The frame source ran out.
    Exhausted,
    /// The stop flag was raised.
    Stopped,
    /// Reading a frame failed; the message describes why.
    SourceFailed(String),
}

/// Summary of a [`drive`] run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveSummary {
    /// Frames passed through the session.
    pub frames_processed: usize,
    /// Why the loop ended.
    pub end: DriveEnd,
}

/// Pull frames from `frames` through `session` until the source ends,
/// a frame fails to read, or `stop` is raised.
///
/// `stop` is checked between frames only; a frame already being
/// processed always completes. `on_frame` receives each frame's index
/// and result, and may call [`TrackerSession::clear`] through the
/// session reference it is given.
pub fn drive<I, E, F>(
    session: &mut TrackerSession,
    frames: I,
    stop: &AtomicBool,
    mut on_frame: F,
) -> DriveSummary
where
    I: IntoIterator<Item = Result<RgbImage, E>>,
    E: std::fmt::Display,
    F: FnMut(usize, &mut TrackerSession, TrackedFrame),
{
    let mut frames_processed = 0;
    let mut frames = frames.into_iter();
    let end = loop {
        if stop.load(Ordering::Relaxed) {
            debug!(frames_processed, "stop requested");
            break DriveEnd::Stopped;
        }
        match frames.next() {
            None => break DriveEnd::Exhausted,
            Some(Err(e)) => {
                warn!(frames_processed, error = %e, "frame source failed, ending loop");
                break DriveEnd::SourceFailed(e.to_string());
            }
            Some(Ok(frame)) => {
                let tracked = session.process_frame(&frame);
                on_frame(frames_processed, session, tracked);
                frames_processed += 1;
            }
        }
    };
    DriveSummary {
        frames_processed,
        end,
    }
}
