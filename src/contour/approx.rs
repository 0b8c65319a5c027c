//! Polygonal approximation of closed contours.
//!
//! Douglas-Peucker on a closed ring: the ring is split at two anchor points
//! (the first boundary point and the point farthest from it) and each open
//! chain is simplified independently. Tolerance is usually tied to the
//! contour perimeter by the caller.

use crate::contour::{Contour, Point};
use crate::util::math;

fn simplify_chain(points: &[Point], epsilon: f64, out: &mut Vec<Point>) {
    let n = points.len();
    if n < 2 {
        out.extend_from_slice(points);
        return;
    }

    let first = points[0];
    let last = points[n - 1];
    let mut max_dist = 0.0f64;
    let mut max_idx = 0usize;
    for (idx, &p) in points.iter().enumerate().take(n - 1).skip(1) {
        let d = math::line_distance(p, first, last);
        if d > max_dist {
            max_dist = d;
            max_idx = idx;
        }
    }

    if max_dist > epsilon {
        simplify_chain(&points[..=max_idx], epsilon, out);
        out.pop();
        simplify_chain(&points[max_idx..], epsilon, out);
    } else {
        out.push(first);
        out.push(last);
    }
}

/// Approximates a closed boundary ring with a simpler polygon.
///
/// Returns at least two points for non-trivial input; the closing edge from
/// last back to first is implicit.
pub fn approx_polygon(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    // Anchor at the first point and the point farthest from it.
    let anchor = points[0];
    let mut far_idx = 1usize;
    let mut far_dist = 0.0f64;
    for (idx, &p) in points.iter().enumerate().skip(1) {
        let d = math::point_distance(anchor, p);
        if d > far_dist {
            far_dist = d;
            far_idx = idx;
        }
    }

    let mut ring: Vec<Point> = Vec::new();
    simplify_chain(&points[..=far_idx], epsilon, &mut ring);
    ring.pop();
    let mut back: Vec<Point> = points[far_idx..].to_vec();
    back.push(anchor);
    simplify_chain(&back, epsilon, &mut ring);
    ring.pop();

    ring.dedup();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Approximates a contour with tolerance proportional to its perimeter.
pub fn approx_contour(contour: &Contour, epsilon_factor: f64) -> Vec<Point> {
    approx_polygon(contour.points(), epsilon_factor * contour.perimeter())
}

/// Reduces a polygon to its four dominant corners.
///
/// Progressively coarsens the tolerance until exactly four vertices remain.
/// Returns `None` when the polygon collapses below four vertices first, which
/// marks the shape as degenerate rather than card-like.
pub fn dominant_quad(points: &[Point], perimeter: f64) -> Option<[Point; 4]> {
    if points.len() < 4 {
        return None;
    }
    if points.len() == 4 {
        return Some([points[0], points[1], points[2], points[3]]);
    }

    let mut epsilon = 0.01 * perimeter;
    for _ in 0..12 {
        let ring = approx_polygon(points, epsilon);
        match ring.len() {
            4 => return Some([ring[0], ring[1], ring[2], ring[3]]),
            0..=3 => return None,
            _ => epsilon *= 1.5,
        }
    }
    None
}
