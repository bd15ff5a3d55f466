//! shapesense: detect shapes, air-draw with a tracked color, and sketch
//! parametrized shapes from the command line.
//!
//! # Usage
//!
//! ```text
//! shapesense detect photo.png -o annotated.png
//! shapesense detect clip.gif --json --output-dir shapes/
//! shapesense track frames/ --output-dir out/ --canvas drawing.png
//! shapesense sketch script.json -o sketch.png
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default `shapesense=info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod annotate;
mod detect;
mod script;
mod source;
mod track;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Shape detection, color-tracked air drawing and shape sketching.
#[derive(Parser)]
#[command(name = "shapesense", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find and label polygon shapes in an image.
    Detect(detect::DetectArgs),
    /// Follow a colored object through a frame sequence and draw its path.
    Track(track::TrackArgs),
    /// Replay a JSON sketch script and export the result as PNG.
    Sketch(script::SketchArgs),
}

const DEFAULT_LOG_FILTER: &str = "shapesense=info,shapesense_vision=warn,shapesense_sketch=warn";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match &cli.command {
        Command::Detect(args) => detect::run(args),
        Command::Track(args) => track::run(args),
        Command::Sketch(args) => script::run(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::FAILURE
        }
    }
}
