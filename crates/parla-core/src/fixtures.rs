//! Synthetic face fixtures for tests and benches

use kurbo::{Point, Rect};

use crate::{FaceGeometry, LANDMARK_COUNT};

/// A plausible 68-point face centered near (200, 200), 160 px wide
pub fn sample_points68() -> Vec<Point> {
    use std::f64::consts::{PI, TAU};

    let mut points = Vec::with_capacity(LANDMARK_COUNT);
    // Jaw
    for i in 0..17 {
        let t = i as f64 / 16.0 * PI;
        points.push(Point::new(200.0 - 80.0 * t.cos(), 200.0 + 80.0 * t.sin()));
    }
    // Brows
    for i in 0..5 {
        points.push(Point::new(140.0 + i as f64 * 10.0, 150.0 - (i as f64 - 2.0).abs()));
    }
    for i in 0..5 {
        points.push(Point::new(220.0 + i as f64 * 10.0, 150.0 - (i as f64 - 2.0).abs()));
    }
    // Nose
    for i in 0..9 {
        points.push(Point::new(195.0 + (i % 3) as f64 * 5.0, 170.0 + i as f64 * 3.0));
    }
    // Eyes
    for center in [160.0, 240.0] {
        for i in 0..6 {
            let a = i as f64 / 6.0 * TAU;
            points.push(Point::new(center + 12.0 * a.cos(), 165.0 + 5.0 * a.sin()));
        }
    }
    // Mouth: 12 outer, 8 inner
    for i in 0..12 {
        let a = PI + i as f64 / 12.0 * TAU;
        points.push(Point::new(200.0 + 30.0 * a.cos(), 240.0 + 10.0 * a.sin()));
    }
    for i in 0..8 {
        let a = PI + i as f64 / 8.0 * TAU;
        points.push(Point::new(200.0 + 20.0 * a.cos(), 240.0 + 4.0 * a.sin()));
    }
    points
}

/// Bounding box matching `sample_points68`
pub fn sample_face_box() -> Rect {
    Rect::new(120.0, 120.0, 280.0, 290.0)
}

/// Validated geometry built from `sample_points68`
pub fn sample_geometry() -> FaceGeometry {
    match FaceGeometry::from_points68(sample_face_box(), &sample_points68()) {
        Ok(geometry) => geometry,
        Err(e) => panic!("sample geometry must validate: {e}"),
    }
}
