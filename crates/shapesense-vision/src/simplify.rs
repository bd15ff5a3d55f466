//! Closed-polygon approximation using the Ramer-Douglas-Peucker algorithm.
//!
//! A contour is a closed loop, so plain RDP (which pins both endpoints)
//! would keep an arbitrary starting pixel as a vertex. Instead the loop
//! is split at two far-apart anchors, each half is simplified, and a
//! final pass drops any vertex that lies within tolerance of the line
//! through its two neighbours.

use crate::types::{Contour, Point, Polygon};

/// Fraction of the contour perimeter used as the approximation tolerance.
pub const DEFAULT_EPSILON_FRACTION: f64 = 0.02;

/// Approximate a closed contour by a polygon.
///
/// Every contour point lies within roughly `epsilon` pixels of the
/// resulting polygon. Contours with fewer than 3 points are returned
/// unchanged. A contour whose points all coincide collapses to a single
/// vertex.
#[must_use = "returns the approximated polygon"]
pub fn approximate_polygon(contour: &Contour, epsilon: f64) -> Polygon {
    let points = contour.points();
    let n = points.len();
    if n < 3 {
        return Polygon::new(points.to_vec());
    }

    let a = farthest_from(points, points[0]);
    let b = farthest_from(points, points[a]);
    if points[a] == points[b] {
        return Polygon::new(vec![points[0]]);
    }

    // Rotate so the first anchor sits at index 0 and close the loop by
    // repeating it at index n.
    let ring: Vec<Point> = points[a..]
        .iter()
        .chain(&points[..a])
        .chain(std::iter::once(&points[a]))
        .copied()
        .collect();
    let split = (b + n - a) % n;

    let mut kept = vec![false; n + 1];
    kept[0] = true;
    kept[split] = true;
    rdp_recurse(&ring, 0, split, epsilon, &mut kept);
    rdp_recurse(&ring, split, n, epsilon, &mut kept);

    let mut vertices: Vec<Point> = ring[..n]
        .iter()
        .zip(&kept[..n])
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    drop_flat_vertices(&mut vertices, epsilon);
    Polygon::new(vertices)
}

/// Approximate a contour with a tolerance proportional to its perimeter.
#[must_use = "returns the approximated polygon"]
pub fn approximate_by_perimeter(contour: &Contour, fraction: f64) -> Polygon {
    approximate_polygon(contour, fraction * contour.perimeter())
}

/// Index of the point farthest from `origin`; the first one on ties.
fn farthest_from(points: &[Point], origin: Point) -> usize {
    let mut best = 0;
    let mut best_dist = -1.0;
    for (i, p) in points.iter().enumerate() {
        let d = p.distance_squared(origin);
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// line through them. If that distance exceeds `tolerance`, the point is
/// kept and both sub-ranges are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Remove vertices within `tolerance` of the line through their
/// neighbours, treating the vertex list as a closed loop. Never reduces
/// below three vertices.
fn drop_flat_vertices(vertices: &mut Vec<Point>, tolerance: f64) {
    let mut changed = true;
    while changed && vertices.len() > 3 {
        changed = false;
        let mut i = 0;
        while i < vertices.len() && vertices.len() > 3 {
            let len = vertices.len();
            let prev = vertices[(i + len - 1) % len];
            let next = vertices[(i + 1) % len];
            if perpendicular_distance(vertices[i], prev, next) <= tolerance {
                vertices.remove(i);
                changed = true;
            } else {
                i += 1;
            }
        }
    }
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// Uses the formula: |cross(b-a, p-a)| / |b-a|.
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = f64::from(b.x) - f64::from(a.x);
    let dy = f64::from(b.y) - f64::from(a.y);
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(
        f64::from(a.y) - f64::from(p.y),
        -(dy * (f64::from(a.x) - f64::from(p.x))),
    );
    cross.abs() / length_sq.sqrt()
}
