//! Air-drawing scenarios across frame sequences.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::AtomicBool;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use shapesense_vision::tracker::drive;
use shapesense_vision::{Detection, DriveEnd, Point, TrackerConfig, TrackerSession};

const BLUE: Rgb<u8> = Rgb([20, 40, 230]);
const STROKE: [u8; 3] = [255, 0, 0];

fn frame(blob: Option<(i32, i32, u32)>) -> RgbImage {
    let mut frame = RgbImage::from_pixel(240, 180, Rgb([30, 30, 30]));
    if let Some((x, y, side)) = blob {
        draw_filled_rect_mut(&mut frame, Rect::at(x, y).of_size(side, side), BLUE);
    }
    frame
}

fn is_stroke(overlay: &RgbImage, x: u32, y: u32) -> bool {
    overlay.get_pixel(x, y).0 == STROKE
}

fn session() -> TrackerSession {
    TrackerSession::new(TrackerConfig::default()).unwrap()
}

#[test]
fn moving_blob_draws_a_connected_line() {
    let mut s = session();
    // Centroids (50, 50) -> (110, 50) -> (110, 110).
    for blob in [(30, 30, 40), (90, 30, 40), (90, 90, 40)] {
        s.process_frame(&frame(Some(blob)));
    }
    let overlay = s.overlay().unwrap();
    for x in 50..=110 {
        assert!(is_stroke(overlay, x, 50), "gap at ({x}, 50)");
    }
    for y in 50..=110 {
        assert!(is_stroke(overlay, 110, y), "gap at (110, {y})");
    }
    assert!(!is_stroke(overlay, 80, 80));
}

#[test]
fn gap_frame_breaks_the_stroke() {
    let mut s = session();
    s.process_frame(&frame(Some((30, 30, 40))));
    let lost = s.process_frame(&frame(None));
    assert_eq!(lost.detection, Detection::Lost);
    let resumed = s.process_frame(&frame(Some((150, 110, 40))));
    assert_eq!(
        resumed.detection,
        Detection::Started {
            centroid: Point::new(170, 130)
        }
    );
    let overlay = s.overlay().unwrap();
    assert!(overlay.pixels().all(|p| p.0 == [0, 0, 0]));
}

#[test]
fn small_blob_does_not_draw_or_connect() {
    let mut s = session();
    s.process_frame(&frame(Some((30, 30, 40))));
    let small = s.process_frame(&frame(Some((100, 100, 15))));
    assert!(matches!(small.detection, Detection::TooSmall { area } if area < 500.0));
    let overlay = s.overlay().unwrap();
    assert!(overlay.pixels().all(|p| p.0 == [0, 0, 0]));
    assert_eq!(s.previous_centroid(), None);
}

#[test]
fn composite_shows_frame_where_overlay_is_empty() {
    let mut s = session();
    s.process_frame(&frame(Some((30, 30, 40))));
    let out = s.process_frame(&frame(Some((90, 30, 40))));
    assert_eq!(out.composite.get_pixel(200, 160).0, [30, 30, 30]);
    // Background (30, 30, 30) plus red stroke.
    assert_eq!(out.composite.get_pixel(80, 50).0, [255, 30, 30]);
}

#[test]
fn clear_mid_sequence_starts_over() {
    let mut s = session();
    let frames: Vec<Result<RgbImage, String>> = [(30, 30), (90, 30), (90, 90), (30, 90)]
        .into_iter()
        .map(|(x, y)| Ok(frame(Some((x, y, 40)))))
        .collect();
    let mut detections = Vec::new();
    let summary = drive(&mut s, frames, &AtomicBool::new(false), |i, session, tracked| {
        detections.push(tracked.detection);
        if i == 1 {
            session.clear();
        }
    });
    assert_eq!(summary.end, DriveEnd::Exhausted);
    assert_eq!(summary.frames_processed, 4);
    assert!(matches!(detections[2], Detection::Started { .. }));
    assert!(matches!(detections[3], Detection::Stroke { .. }));

    let overlay = s.overlay().unwrap();
    // First segment (50,50)->(110,50) was erased; last one (110,110)->(50,110) remains.
    assert!(!is_stroke(overlay, 80, 50));
    assert!(is_stroke(overlay, 80, 110));
}

#[test]
fn noise_specks_are_ignored() {
    let mut s = session();
    let mut noisy = frame(Some((30, 30, 40)));
    for (x, y) in [(150, 20), (200, 150), (10, 170)] {
        noisy.put_pixel(x, y, BLUE);
    }
    let out = s.process_frame(&noisy);
    assert_eq!(
        out.detection,
        Detection::Started {
            centroid: Point::new(50, 50)
        }
    );
}
