//! `shapesense sketch`: replay a JSON script of sketch operations.
//!
//! ```json
//! {
//!   "width": 400,
//!   "height": 300,
//!   "background": "#ffffff",
//!   "ops": [
//!     {"op": "add", "shape": "circle", "params": {"center": [200, 150], "width": 80, "fill": "#ff0000"}},
//!     {"op": "add", "shape": "triangle"},
//!     {"op": "undo"},
//!     {"op": "clear"}
//!   ]
//! }
//! ```

use std::path::PathBuf;

use clap::Args;
use serde::Deserialize;
use shapesense_sketch::{Color, ShapeParams, Sketch, SketchError, to_png};
use tracing::{debug, info, warn};

#[derive(Args)]
pub struct SketchArgs {
    /// JSON script describing the canvas and the operations to apply.
    script: PathBuf,

    /// Output PNG path.
    #[arg(short, long)]
    output: PathBuf,
}

/// Canvas settings plus the operations to replay.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct Script {
    width: u32,
    height: u32,
    background: Color,
    ops: Vec<Op>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            background: Color::WHITE,
            ops: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Op {
    Add {
        shape: String,
        #[serde(default)]
        params: ShapeParams,
    },
    Undo,
    Clear,
}

/// Apply `script` to a fresh sketch. Unknown shape names and invalid
/// geometry are logged and skipped.
fn replay(script: &Script) -> Result<Sketch, SketchError> {
    let mut sketch = Sketch::new(script.width, script.height, script.background)?;
    for (index, op) in script.ops.iter().enumerate() {
        match op {
            Op::Add { shape, params } => {
                if let Err(e) = sketch.add_named(shape, *params) {
                    warn!(index, error = %e, "operation skipped");
                }
            }
            Op::Undo => {
                if sketch.undo().is_none() {
                    debug!(index, "undo with empty history");
                }
            }
            Op::Clear => sketch.clear(),
        }
    }
    Ok(sketch)
}

pub fn run(args: &SketchArgs) -> Result<(), String> {
    let text = std::fs::read_to_string(&args.script)
        .map_err(|e| format!("Error reading {}: {e}", args.script.display()))?;
    let script: Script = serde_json::from_str(&text)
        .map_err(|e| format!("Error parsing {}: {e}", args.script.display()))?;

    let sketch = replay(&script).map_err(|e| e.to_string())?;
    let png = to_png(&sketch).map_err(|e| e.to_string())?;
    std::fs::write(&args.output, &png)
        .map_err(|e| format!("Error writing {}: {e}", args.output.display()))?;
    info!(
        shapes = sketch.len(),
        path = %args.output.display(),
        "sketch exported"
    );
    Ok(())
}
