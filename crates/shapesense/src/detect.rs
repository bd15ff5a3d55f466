//! `shapesense detect`: label the shapes in an image or in each frame of
//! a frame sequence.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use image::RgbImage;
use serde::Serialize;
use shapesense_vision::diagnostics::{Clock, detect_shapes_with_diagnostics};
use shapesense_vision::{DetectorConfig, ShapeAnnotation, detect_shapes, encode_png};
use tracing::{debug, info, warn};

use crate::annotate::draw_outlines;
use crate::source;

#[derive(Args)]
pub struct DetectArgs {
    /// Input image (PNG, JPEG, BMP, WebP), directory of frames (played in
    /// file-name order), or animated GIF.
    source: PathBuf,

    /// Write the image with shape outlines drawn on it. Single images only.
    #[arg(short, long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Write each annotated frame as `frame_NNNNN.png` and its shapes as
    /// `frame_NNNNN.json`.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print annotations as JSON instead of one line per shape.
    ///
    /// Frame sequences print one JSON object per frame and line.
    #[arg(long)]
    json: bool,

    /// Print per-stage timing and counts to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Gaussian kernel size.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_BLUR_KERNEL)]
    blur_kernel: u32,

    /// Canny low threshold.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Minimum contour area in square pixels (0 disables the filter).
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_MIN_AREA)]
    min_area: f64,

    /// Full detector config as a JSON string.
    ///
    /// When provided, the individual parameter flags are ignored.
    #[arg(long)]
    config_json: Option<String>,
}

/// Shapes found in one frame of a sequence.
#[derive(Serialize)]
struct FrameShapes<'a> {
    frame: usize,
    shapes: &'a [ShapeAnnotation],
}

fn config_from_args(args: &DetectArgs) -> Result<DetectorConfig, String> {
    let config = if let Some(ref json) = args.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        DetectorConfig {
            blur_kernel: args.blur_kernel,
            canny_low: args.canny_low,
            canny_high: args.canny_high,
            min_area: args.min_area,
            ..DetectorConfig::default()
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

pub fn run(args: &DetectArgs) -> Result<(), String> {
    let config = config_from_args(args)?;
    let sequence = source::is_sequence(&args.source);
    if sequence && args.output.is_some() {
        return Err("-o takes a single image; use --output-dir for frame sequences".to_string());
    }
    if let Some(ref dir) = args.output_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Error creating {}: {e}", dir.display()))?;
    }

    let frames = source::open(&args.source)?;
    let processed = detect_frames(frames, &config, args.diagnostics, |index, frame, annotations| {
        print_shapes(args.json, sequence.then_some(index), annotations)?;
        if let Some(ref out) = args.output {
            write_annotated(out, frame, annotations)?;
        }
        if let Some(ref dir) = args.output_dir {
            write_annotated(&dir.join(format!("frame_{index:05}.png")), frame, annotations)?;
            let json = serde_json::to_string_pretty(&FrameShapes {
                frame: index,
                shapes: annotations,
            })
            .map_err(|e| format!("Error serializing annotations: {e}"))?;
            let path = dir.join(format!("frame_{index:05}.json"));
            std::fs::write(&path, json)
                .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
        }
        Ok(())
    })?;
    info!(
        path = %args.source.display(),
        frames = processed,
        "detection finished"
    );
    Ok(())
}

/// Classify every frame, handing each result to `on_frame`.
///
/// A frame that fails to read ends the loop with a warning; only a failure
/// on the very first frame is an error, since nothing was classified.
/// Errors from `on_frame` abort the loop. Returns the number of frames
/// classified.
fn detect_frames<I, F>(
    frames: I,
    config: &DetectorConfig,
    diagnostics: bool,
    mut on_frame: F,
) -> Result<usize, String>
where
    I: IntoIterator<Item = Result<RgbImage, String>>,
    F: FnMut(usize, &RgbImage, &[ShapeAnnotation]) -> Result<(), String>,
{
    let mut processed = 0;
    for (index, frame) in frames.into_iter().enumerate() {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) if index == 0 => return Err(e),
            Err(e) => {
                warn!(frames = processed, error = %e, "frame source failed, ending loop");
                break;
            }
        };
        let annotations = if diagnostics {
            let (annotations, stages) = detect_shapes_with_diagnostics(&frame, config, &StdClock);
            eprintln!("{}", stages.report());
            annotations
        } else {
            detect_shapes(&frame, config)
        };
        debug!(
            index,
            width = frame.width(),
            height = frame.height(),
            shapes = annotations.len(),
            "frame classified"
        );
        on_frame(index, &frame, &annotations)?;
        processed += 1;
    }
    Ok(processed)
}

/// Print one frame's shapes. `frame` is `Some` for frame sequences, which
/// prefixes text lines and prints compact JSON per line.
fn print_shapes(
    json: bool,
    frame: Option<usize>,
    annotations: &[ShapeAnnotation],
) -> Result<(), String> {
    if json {
        let text = match frame {
            Some(frame) => serde_json::to_string(&FrameShapes {
                frame,
                shapes: annotations,
            }),
            None => serde_json::to_string_pretty(annotations),
        }
        .map_err(|e| format!("Error serializing annotations: {e}"))?;
        println!("{text}");
    } else {
        for annotation in annotations {
            match frame {
                Some(frame) => println!("frame {frame:05}: {}", describe(annotation)),
                None => println!("{}", describe(annotation)),
            }
        }
    }
    Ok(())
}

fn write_annotated(
    path: &Path,
    frame: &RgbImage,
    annotations: &[ShapeAnnotation],
) -> Result<(), String> {
    let png = encode_png(&draw_outlines(frame, annotations)).map_err(|e| e.to_string())?;
    std::fs::write(path, &png).map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    debug!(path = %path.display(), bytes = png.len(), "annotated image written");
    Ok(())
}

/// One-line summary: label, box and vertex count.
fn describe(annotation: &ShapeAnnotation) -> String {
    let b = annotation.bounding_box;
    format!(
        "{:<10} x={} y={} w={} h={} vertices={}",
        annotation.kind,
        b.x,
        b.y,
        b.width,
        b.height,
        annotation.polygon.len()
    )
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
