//! Geometric helpers for contour analysis and normalization.

use crate::contour::Point;

/// Twice the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise winding in a y-down image coordinate
/// system the sign is flipped, so callers should take `abs` unless they
/// care about orientation.
pub(crate) fn polygon_area_doubled(points: &[Point]) -> i64 {
    let n = points.len();
    if n < 3 {
        return 0;
    }
    let mut acc = 0i64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc += i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y);
    }
    acc
}

/// Absolute polygon area in pixels.
pub(crate) fn polygon_area(points: &[Point]) -> f64 {
    polygon_area_doubled(points).unsigned_abs() as f64 / 2.0
}

/// Length of the closed polyline through `points`.
pub(crate) fn polygon_perimeter(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    let mut acc = 0.0f64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc += point_distance(a, b);
    }
    acc
}

/// Euclidean distance between two points.
pub(crate) fn point_distance(a: Point, b: Point) -> f64 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    (dx * dx + dy * dy).sqrt()
}

/// Cross product of `oa` x `ob`.
pub(crate) fn cross(o: Point, a: Point, b: Point) -> i64 {
    i64::from(a.x - o.x) * i64::from(b.y - o.y) - i64::from(a.y - o.y) * i64::from(b.x - o.x)
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
///
/// Falls back to the point distance when `a == b`.
pub(crate) fn line_distance(p: Point, a: Point, b: Point) -> f64 {
    let len = point_distance(a, b);
    if len == 0.0 {
        return point_distance(p, a);
    }
    (cross(a, b, p).abs() as f64) / len
}

/// True when segments `p1p2` and `q1q2` properly cross.
///
/// Touching at an endpoint or collinear overlap does not count; only strict
/// interior crossings do.
pub(crate) fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1).signum();
    let d2 = cross(q1, q2, p2).signum();
    let d3 = cross(p1, p2, q1).signum();
    let d4 = cross(p1, p2, q2).signum();
    d1 != 0 && d2 != 0 && d3 != 0 && d4 != 0 && d1 != d2 && d3 != d4
}

/// Even-odd ray-casting point-in-polygon test.
pub(crate) fn point_in_polygon(p: Point, poly: &[Point]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = poly[i];
        let b = poly[j];
        if (a.y > p.y) != (b.y > p.y) {
            let t = f64::from(p.y - a.y) / f64::from(b.y - a.y);
            let x_cross = f64::from(a.x) + t * f64::from(b.x - a.x);
            if f64::from(p.x) < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Arithmetic centroid of a point set.
pub(crate) fn centroid(points: &[Point]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mut sx = 0i64;
    let mut sy = 0i64;
    for p in points {
        sx += i64::from(p.x);
        sy += i64::from(p.y);
    }
    let n = points.len() as f64;
    (sx as f64 / n, sy as f64 / n)
}

/// Convex hull of a point set via Andrew's monotone chain.
///
/// Returns the hull in counter-clockwise order without the closing point.
/// Collinear points on the hull boundary are dropped.
pub(crate) fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| a.x.cmp(&b.x).then_with(|| a.y.cmp(&b.y)));
    pts.dedup();
    let n = pts.len();
    if n < 3 {
        return pts;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(2 * n);
    for &p in pts.iter() {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev() {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

#[cfg(test)]
mod tests {
    use super::{convex_hull, line_distance, point_in_polygon, polygon_area, polygon_perimeter};
    use crate::contour::Point;

    fn square(side: i32) -> Vec<Point> {
        vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ]
    }

    #[test]
    fn area_and_perimeter_of_square() {
        let sq = square(10);
        assert_eq!(polygon_area(&sq), 100.0);
        assert_eq!(polygon_perimeter(&sq), 40.0);
    }

    #[test]
    fn line_distance_from_axis() {
        let d = line_distance(Point::new(5, 3), Point::new(0, 0), Point::new(10, 0));
        assert!((d - 3.0).abs() < 1e-9);
    }

    #[test]
    fn point_in_polygon_detects_interior_and_exterior() {
        let sq = square(10);
        assert!(point_in_polygon(Point::new(5, 5), &sq));
        assert!(!point_in_polygon(Point::new(15, 5), &sq));
        assert!(!point_in_polygon(Point::new(-1, -1), &sq));
    }

    #[test]
    fn convex_hull_drops_interior_points() {
        let mut pts = square(10);
        pts.push(Point::new(5, 5));
        pts.push(Point::new(2, 3));
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!((polygon_area(&hull) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn segments_cross_detects_proper_crossings_only() {
        use super::segments_cross;
        let a = Point::new(0, 0);
        let b = Point::new(10, 10);
        assert!(segments_cross(a, b, Point::new(0, 10), Point::new(10, 0)));
        // Shared endpoint is not a proper crossing.
        assert!(!segments_cross(a, b, b, Point::new(20, 0)));
        // Disjoint segments do not cross.
        assert!(!segments_cross(a, b, Point::new(11, 0), Point::new(20, 5)));
    }

    #[test]
    fn convex_hull_of_concave_union_exceeds_polygon_area() {
        // L-shaped union of two rectangles.
        let l_shape = vec![
            Point::new(0, 0),
            Point::new(20, 0),
            Point::new(20, 10),
            Point::new(10, 10),
            Point::new(10, 20),
            Point::new(0, 20),
        ];
        let hull = convex_hull(&l_shape);
        assert!(polygon_area(&hull) > polygon_area(&l_shape));
    }
}
