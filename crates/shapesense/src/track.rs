//! `shapesense track`: air drawing over a frame sequence.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Args;
use shapesense_vision::tracker::drive;
use shapesense_vision::{DriveEnd, Hsv, HsvRange, TrackerConfig, TrackerSession, encode_png};
use tracing::{debug, info, warn};

use crate::source;

#[derive(Args)]
pub struct TrackArgs {
    /// Directory of frames (played in file-name order), animated GIF, or
    /// single image.
    source: PathBuf,

    /// Write each composited frame here as `frame_NNNNN.png`.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write the final drawing (overlay only) to this PNG.
    #[arg(long)]
    canvas: Option<PathBuf>,

    /// Lower HSV bound as "H,S,V" (H in 0..=179).
    #[arg(long, value_name = "H,S,V", default_value_t = HsvRange::DEFAULT_LOWER)]
    lower: Hsv,

    /// Upper HSV bound as "H,S,V".
    #[arg(long, value_name = "H,S,V", default_value_t = HsvRange::DEFAULT_UPPER)]
    upper: Hsv,

    /// Flip frames horizontally before tracking.
    #[arg(long)]
    mirror: bool,

    /// Erase the drawing after this frame index (0-based). Repeatable.
    #[arg(long, value_name = "N")]
    clear_at: Vec<usize>,

    /// Stop after this many frames.
    #[arg(long, value_name = "N")]
    max_frames: Option<usize>,

    /// Full tracker config as a JSON string.
    ///
    /// When provided, `--lower`, `--upper` and `--mirror` are ignored.
    #[arg(long)]
    config_json: Option<String>,
}

fn config_from_args(args: &TrackArgs) -> Result<TrackerConfig, String> {
    if let Some(ref json) = args.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }
    Ok(TrackerConfig {
        range: HsvRange {
            lower: args.lower,
            upper: args.upper,
        },
        mirror: args.mirror,
        ..TrackerConfig::default()
    })
}

pub fn run(args: &TrackArgs) -> Result<(), String> {
    let config = config_from_args(args)?;
    let mut session = TrackerSession::new(config).map_err(|e| e.to_string())?;
    let frames = source::open(&args.source)?;

    if let Some(ref dir) = args.output_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Error creating {}: {e}", dir.display()))?;
    }

    let stop = AtomicBool::new(false);
    let mut write_error = None;
    let summary = drive(&mut session, frames, &stop, |index, session, tracked| {
        debug!(index, detection = ?tracked.detection, "frame");

        if let Some(ref dir) = args.output_dir {
            let path = dir.join(format!("frame_{index:05}.png"));
            if let Err(e) = write_png(&path, &tracked.composite) {
                write_error = Some(e);
                stop.store(true, Ordering::Relaxed);
                return;
            }
        }
        if args.clear_at.contains(&index) {
            info!(index, "clearing drawing");
            session.clear();
        }
        if args.max_frames.is_some_and(|max| index + 1 >= max) {
            stop.store(true, Ordering::Relaxed);
        }
    });

    if let Some(e) = write_error {
        return Err(e);
    }
    match summary.end {
        DriveEnd::Exhausted => info!(frames = summary.frames_processed, "source exhausted"),
        DriveEnd::Stopped => info!(frames = summary.frames_processed, "stopped"),
        DriveEnd::SourceFailed(ref msg) => {
            warn!(frames = summary.frames_processed, error = %msg, "frame source ended early");
        }
    }

    if let Some(ref path) = args.canvas {
        match session.overlay() {
            Some(overlay) => write_png(path, overlay)?,
            None => warn!("no frames processed, canvas not written"),
        }
    }

    println!("processed {} frames", summary.frames_processed);
    Ok(())
}

fn write_png(path: &Path, image: &image::RgbImage) -> Result<(), String> {
    let png = encode_png(image).map_err(|e| e.to_string())?;
    std::fs::write(path, png).map_err(|e| format!("Error writing {}: {e}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: TrackArgs,
    }

    fn parse(argv: &[&str]) -> Result<TrackArgs, clap::Error> {
        Harness::try_parse_from(std::iter::once("track").chain(argv.iter().copied())).map(|h| h.args)
    }

    #[test]
    fn defaults_select_blue() {
        let args = parse(&["frames"]).unwrap();
        let config = config_from_args(&args).unwrap();
        assert_eq!(config.range, HsvRange::default());
        assert!(!config.mirror);
        assert!(args.clear_at.is_empty());
    }

    #[test]
    fn hsv_bounds_and_repeated_clears() {
        let args = parse(&[
            "frames",
            "--lower",
            "0,100,100",
            "--upper",
            "10,255,255",
            "--mirror",
            "--clear-at",
            "3",
            "--clear-at",
            "7",
        ])
        .unwrap();
        let config = config_from_args(&args).unwrap();
        assert_eq!(config.range.lower, Hsv::new(0, 100, 100));
        assert_eq!(config.range.upper, Hsv::new(10, 255, 255));
        assert!(config.mirror);
        assert_eq!(args.clear_at, [3, 7]);
    }

    #[test]
    fn malformed_hsv_is_rejected_by_the_parser() {
        assert!(parse(&["frames", "--lower", "1,2"]).is_err());
        assert!(parse(&["frames", "--upper", "200,0,0"]).is_err());
    }

    #[test]
    fn config_json_overrides_flags() {
        let args = parse(&["frames", "--mirror", "--config-json", r#"{"stroke_thickness": 9}"#]).unwrap();
        let config = config_from_args(&args).unwrap();
        assert_eq!(config.stroke_thickness, 9);
        assert!(!config.mirror);
    }
}
