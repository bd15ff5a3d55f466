//! Building, editing and exporting a sketch through the public API.

#![allow(clippy::unwrap_used)]

use shapesense_sketch::{Color, ShapeParams, Sketch, SketchError, SketchKind, render, to_png};

fn at(x: f32, y: f32, fill: Color) -> ShapeParams {
    ShapeParams {
        center: [x, y],
        width: 30.0,
        height: 20.0,
        fill: Some(fill),
        ..ShapeParams::default()
    }
}

#[test]
fn undo_restores_the_previous_rendering() {
    let mut sketch = Sketch::new(120, 60, Color::WHITE).unwrap();
    sketch.add_named("square", at(30.0, 30.0, Color::new(255, 0, 0))).unwrap();
    let before = render(&sketch);

    sketch.add_named("Ellipse", at(90.0, 30.0, Color::new(0, 0, 255))).unwrap();
    assert_eq!(sketch.shapes()[1].kind, SketchKind::Oval);
    assert_ne!(render(&sketch), before);

    sketch.undo();
    assert_eq!(render(&sketch), before);
}

#[test]
fn unknown_shapes_do_not_change_the_output() {
    let mut sketch = Sketch::new(50, 50, Color::BLACK).unwrap();
    let blank = to_png(&sketch).unwrap();
    let err = sketch.add_named("dodecahedron", ShapeParams::default()).unwrap_err();
    assert!(matches!(err, SketchError::UnknownShape(_)));
    assert!(err.to_string().contains("dodecahedron"));
    assert_eq!(to_png(&sketch).unwrap(), blank);
}

#[test]
fn clear_then_redraw() {
    let mut sketch = Sketch::new(80, 80, Color::WHITE).unwrap();
    let green = Color::new(0, 200, 0);
    sketch.add_named("circle", at(40.0, 40.0, green)).unwrap();
    sketch.clear();
    assert!(render(&sketch).pixels().all(|p| p.0 == [255, 255, 255, 255]));

    sketch.add_named("triangle", at(40.0, 40.0, green)).unwrap();
    let img = render(&sketch);
    let [r, g, b, _] = img.get_pixel(40, 45).0;
    assert_eq!([r, g, b], green.to_array());
}

#[test]
fn sketch_round_trips_through_json() {
    let mut sketch = Sketch::new(64, 64, Color::new(1, 2, 3)).unwrap();
    sketch.add_named("rectangle", at(20.0, 20.0, Color::WHITE)).unwrap();
    let json = serde_json::to_string(&sketch).unwrap();
    assert!(json.contains("\"#010203\""), "{json}");
    let back: Sketch = serde_json::from_str(&json).unwrap();
    assert_eq!(back, sketch);
}
