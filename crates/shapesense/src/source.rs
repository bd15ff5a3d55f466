//! Frame sources for `shapesense track`.
//!
//! A source is a directory of still images (played in file-name order),
//! an animated GIF, or a single image treated as a one-frame sequence.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, RgbImage};
use tracing::debug;

/// Frames yielded one at a time; a failed read ends the sequence.
pub type Frames = Box<dyn Iterator<Item = Result<RgbImage, String>>>;

const FRAME_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "webp", "gif"];

/// Open `path` as a frame sequence.
///
/// # Errors
///
/// Returns a message if the directory cannot be listed or contains no
/// images, or the GIF cannot be opened.
pub fn open(path: &Path) -> Result<Frames, String> {
    if path.is_dir() {
        let files = frame_files(path)?;
        debug!(dir = %path.display(), frames = files.len(), "frame directory listed");
        Ok(Box::new(files.into_iter().map(|p| read_still(&p))))
    } else if has_extension(path, "gif") {
        gif_frames(path)
    } else {
        Ok(Box::new(std::iter::once(read_still(path))))
    }
}

/// Whether `path` is opened as a multi-frame source (a directory or an
/// animated GIF) rather than a single still.
pub fn is_sequence(path: &Path) -> bool {
    path.is_dir() || has_extension(path, "gif")
}

/// Image files directly inside `dir`, sorted by file name.
fn frame_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| format!("Error listing {}: {e}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && FRAME_EXTENSIONS.iter().any(|ext| has_extension(p, ext)))
        .collect();
    if files.is_empty() {
        return Err(format!("no image frames found in {}", dir.display()));
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn read_still(path: &Path) -> Result<RgbImage, String> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|e| format!("{}: {e}", path.display()))
}

fn gif_frames(path: &Path) -> Result<Frames, String> {
    let file = File::open(path).map_err(|e| format!("Error opening {}: {e}", path.display()))?;
    let decoder = GifDecoder::new(BufReader::new(file))
        .map_err(|e| format!("{}: {e}", path.display()))?;
    let shown = path.display().to_string();
    Ok(Box::new(decoder.into_frames().map(move |frame| {
        frame
            .map(|f| DynamicImage::ImageRgba8(f.into_buffer()).to_rgb8())
            .map_err(|e| format!("{shown}: {e}"))
    })))
}
