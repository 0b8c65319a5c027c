//! Stacked-cluster decomposition into individual cards.
//!
//! A stacked silhouette is concave, so its approximation polygon carries
//! reflex vertices where card edges meet. The splitter cuts the polygon at a
//! reflex vertex along a chord to the nearest visible non-adjacent vertex and
//! recurses on both pieces until each is quad-like. Segmentation is
//! best-effort: whenever a cut or a rectification fails, the cluster falls
//! back to a single dominant-quad card, so an accepted contour never yields
//! zero cards.

use crate::card::flatten::{flatten_quad, FlattenConfig};
use crate::card::Card;
use crate::contour::approx::dominant_quad;
use crate::contour::{Contour, Point};
use crate::image::ImageView;
use crate::template::GlyphGeometry;
use crate::trace::{trace_event, trace_span};
use crate::util::math;

/// Configuration for stacked-cluster segmentation.
#[derive(Clone, Debug)]
pub struct SplitConfig {
    /// Maximum number of cuts applied to one cluster.
    pub max_cuts: usize,
    /// Fragments below this area are treated as cut residue and dropped.
    pub min_fragment_area: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_cuts: 3,
            min_fragment_area: 10_000.0,
        }
    }
}

fn reflex_vertices(ring: &[Point]) -> Vec<usize> {
    let n = ring.len();
    if n < 4 {
        return Vec::new();
    }
    let winding = math::polygon_area_doubled(ring).signum();
    if winding == 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    for i in 0..n {
        let prev = ring[(i + n - 1) % n];
        let next = ring[(i + 1) % n];
        let turn = math::cross(prev, ring[i], next).signum();
        if turn != 0 && turn != winding {
            out.push(i);
        }
    }
    out
}

/// True when the chord between ring vertices `i` and `j` stays inside the
/// polygon.
fn chord_is_clear(ring: &[Point], i: usize, j: usize) -> bool {
    let n = ring.len();
    let a = ring[i];
    let b = ring[j];
    for e in 0..n {
        if math::segments_cross(a, b, ring[e], ring[(e + 1) % n]) {
            return false;
        }
    }
    let mid = Point::new((a.x + b.x) / 2, (a.y + b.y) / 2);
    math::point_in_polygon(mid, ring)
}

/// Splits the ring at a reflex vertex, returning the two pieces.
fn cut_at_reflex(ring: &[Point], reflex: usize) -> Option<(Vec<Point>, Vec<Point>)> {
    let n = ring.len();
    let mut partners: Vec<usize> = (0..n)
        .filter(|&j| j != reflex && j != (reflex + 1) % n && j != (reflex + n - 1) % n)
        .collect();
    partners.sort_by(|&a, &b| {
        math::point_distance(ring[reflex], ring[a])
            .total_cmp(&math::point_distance(ring[reflex], ring[b]))
            .then(a.cmp(&b))
    });

    for j in partners {
        if !chord_is_clear(ring, reflex, j) {
            continue;
        }
        let (lo, hi) = if reflex < j { (reflex, j) } else { (j, reflex) };
        let first: Vec<Point> = ring[lo..=hi].to_vec();
        let mut second: Vec<Point> = ring[hi..].to_vec();
        second.extend_from_slice(&ring[..=lo]);
        if first.len() >= 3 && second.len() >= 3 {
            return Some((first, second));
        }
    }
    None
}

fn decompose(ring: Vec<Point>, cuts_left: usize, cfg: &SplitConfig, out: &mut Vec<[Point; 4]>) {
    if ring.len() < 4 {
        return;
    }
    let reflex = reflex_vertices(&ring);
    if reflex.is_empty() || cuts_left == 0 {
        if let Some(quad) = dominant_quad(&ring, math::polygon_perimeter(&ring)) {
            out.push(quad);
        }
        return;
    }

    if let Some((first, second)) = cut_at_reflex(&ring, reflex[0]) {
        let before = out.len();
        for piece in [first, second] {
            if math::polygon_area(&piece) >= cfg.min_fragment_area {
                decompose(piece, cuts_left - 1, cfg, out);
            }
        }
        if out.len() > before {
            return;
        }
    }

    // Every cut failed or produced only residue; keep the cluster whole.
    if let Some(quad) = dominant_quad(&ring, math::polygon_perimeter(&ring)) {
        out.push(quad);
    }
}

fn bounding_box_quad(points: &[Point]) -> [Point; 4] {
    let min_x = points.iter().map(|p| p.x).min().unwrap_or(0);
    let max_x = points.iter().map(|p| p.x).max().unwrap_or(1);
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(1);
    [
        Point::new(min_x, min_y),
        Point::new(max_x, min_y),
        Point::new(max_x, max_y),
        Point::new(min_x, max_y),
    ]
}

/// Decomposes a stacked cluster into normalized cards.
///
/// Always returns at least one card: if segmentation or rectification fails
/// at every level, the cluster's bounding box is normalized as a single
/// best-effort card.
pub fn split_cluster(
    gray_frame: ImageView<'_, u8>,
    contour: &Contour,
    approx: &[Point],
    split_cfg: &SplitConfig,
    flatten_cfg: &FlattenConfig,
    glyphs: &GlyphGeometry,
) -> Vec<Card> {
    let _span = trace_span!("split_cluster", corners = approx.len()).entered();

    let mut quads = Vec::new();
    decompose(approx.to_vec(), split_cfg.max_cuts, split_cfg, &mut quads);

    let mut cards: Vec<Card> = quads
        .into_iter()
        .filter_map(|quad| flatten_quad(gray_frame, contour, quad, flatten_cfg, glyphs))
        .collect();

    if cards.is_empty() {
        let fallback = bounding_box_quad(contour.points());
        cards.extend(flatten_quad(gray_frame, contour, fallback, flatten_cfg, glyphs));
    }

    trace_event!("cluster_split", cards = cards.len());
    cards
}
