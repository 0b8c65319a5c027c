//! Contour extraction from binary frames.
//!
//! `find_contours` labels 8-connected foreground components and traces the
//! outer boundary of each with Moore neighbor tracing. Only external
//! boundaries are reported; hole boundaries inside a component are not.
//! Discovery order follows the row-major scan, so output is deterministic
//! for a given frame.

use crate::image::ImageView;
use crate::trace::trace_event;
use crate::util::math;

pub mod approx;
pub mod classify;

/// Integer pixel coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Creates a point from its coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Closed boundary polygon of a connected foreground region.
#[derive(Clone, Debug)]
pub struct Contour {
    points: Vec<Point>,
    area: f64,
    perimeter: f64,
}

impl Contour {
    /// Creates a contour from an ordered boundary ring, caching its derived
    /// area and perimeter.
    pub fn new(points: Vec<Point>) -> Self {
        let area = math::polygon_area(&points);
        let perimeter = math::polygon_perimeter(&points);
        Self {
            points,
            area,
            perimeter,
        }
    }

    /// Returns the ordered boundary points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the enclosed area in pixels.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Returns the boundary length in pixels.
    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    /// Returns the arithmetic centroid of the boundary points.
    pub fn centroid(&self) -> Point {
        let (cx, cy) = math::centroid(&self.points);
        Point::new(cx.round() as i32, cy.round() as i32)
    }
}

/// Clockwise 8-neighborhood starting west, as traversed by the tracer.
const DIRS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

fn dir_index(dx: i32, dy: i32) -> usize {
    DIRS.iter()
        .position(|&d| d == (dx, dy))
        .expect("delta between consecutive ring neighbors is a unit step")
}

struct Bitmap<'a> {
    view: ImageView<'a, u8>,
}

impl Bitmap<'_> {
    fn foreground(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        matches!(self.view.get(x as usize, y as usize), Some(&v) if v > 0)
    }
}

/// Traces the outer boundary of the component containing `start`.
///
/// `start` must be the topmost-leftmost pixel of its component so the west
/// neighbor is guaranteed background.
fn trace_boundary(map: &Bitmap<'_>, start: Point) -> Vec<Point> {
    let mut boundary = vec![start];
    let mut pos = start;
    // Direction from the current pixel to its background backtrack neighbor.
    let mut backtrack = 0usize;

    let cap = 4 * map.view.width() * map.view.height() + 8;
    for _ in 0..cap {
        let mut moved = false;
        for step in 1..=8usize {
            let dir = (backtrack + step) % 8;
            let (dx, dy) = DIRS[dir];
            let next = Point::new(pos.x + dx, pos.y + dy);
            if map.foreground(next.x, next.y) {
                let (bx, by) = DIRS[(dir + 7) % 8];
                let bg = Point::new(pos.x + bx, pos.y + by);
                backtrack = dir_index(bg.x - next.x, bg.y - next.y);
                pos = next;
                moved = true;
                break;
            }
        }
        if !moved {
            // Isolated pixel.
            return boundary;
        }
        if pos == start && backtrack == 0 {
            return boundary;
        }
        boundary.push(pos);
    }
    boundary
}

/// Finds the external contours of all 8-connected foreground components,
/// sorted descending by enclosed area (ties keep discovery order).
pub fn find_contours(binary: ImageView<'_, u8>) -> Vec<Contour> {
    let width = binary.width();
    let height = binary.height();
    let map = Bitmap { view: binary };

    let mut labeled = vec![false; width * height];
    let mut contours = Vec::new();
    let mut stack = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if labeled[y * width + x] || !map.foreground(x as i32, y as i32) {
                continue;
            }

            // Row-major discovery makes this the topmost-leftmost pixel.
            let start = Point::new(x as i32, y as i32);
            contours.push(Contour::new(trace_boundary(&map, start)));

            // Flood-fill the component so it is discovered exactly once.
            stack.push((x, y));
            labeled[y * width + x] = true;
            while let Some((px, py)) = stack.pop() {
                for (dx, dy) in DIRS {
                    let nx = px as i32 + dx;
                    let ny = py as i32 + dy;
                    if !map.foreground(nx, ny) {
                        continue;
                    }
                    let idx = ny as usize * width + nx as usize;
                    if !labeled[idx] {
                        labeled[idx] = true;
                        stack.push((nx as usize, ny as usize));
                    }
                }
            }
        }
    }

    contours.sort_by(|a, b| b.area().total_cmp(&a.area()));
    trace_event!("contours_found", count = contours.len());
    contours
}
