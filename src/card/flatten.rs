//! Single-card normalization: corner ordering, rectification, glyph crops.
//!
//! The corner ordering is consistent for any in-frame rotation of the card.
//! Because playing cards carry the same index glyphs in both opposite
//! corners, rectifying a card "upside down" still lands a readable rank and
//! suit in the cropped corner, so final labels are rotation invariant.

use crate::card::warp::warp_quad;
use crate::card::Card;
use crate::contour::approx::dominant_quad;
use crate::contour::{Contour, Point};
use crate::image::{GrayImage, ImageView};
use crate::matcher::Identification;
use crate::template::GlyphGeometry;
use crate::trace::trace_span;
use crate::util::math;

/// Configuration for card rectification and glyph extraction.
#[derive(Clone, Debug)]
pub struct FlattenConfig {
    /// Width of the rectified canonical card.
    pub card_width: usize,
    /// Height of the rectified canonical card.
    pub card_height: usize,
    /// Width of the corner crop holding rank and suit glyphs.
    pub corner_width: usize,
    /// Height of the corner crop holding rank and suit glyphs.
    pub corner_height: usize,
    /// Integer zoom factor applied to the corner crop before thresholding.
    pub corner_zoom: usize,
    /// Sample point for the card-face white level, in zoomed corner
    /// coordinates.
    pub white_sample: (usize, usize),
    /// Offset subtracted from the white level to form the glyph threshold.
    pub white_offset: u8,
    /// Row span of the rank glyph in the zoomed corner.
    pub rank_rows: (usize, usize),
    /// Row span of the suit glyph in the zoomed corner.
    pub suit_rows: (usize, usize),
    /// Aspect band treated as portrait: `width <= portrait_ratio * height`.
    pub portrait_ratio: f64,
    /// Aspect band treated as landscape: `width >= landscape_ratio * height`.
    pub landscape_ratio: f64,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            card_width: 200,
            card_height: 300,
            corner_width: 32,
            corner_height: 84,
            corner_zoom: 4,
            white_sample: (84, 15),
            white_offset: 30,
            rank_rows: (20, 185),
            suit_rows: (186, 336),
            portrait_ratio: 0.8,
            landscape_ratio: 1.2,
        }
    }
}

fn bounding_rect(quad: &[Point; 4]) -> (usize, usize) {
    let min_x = quad.iter().map(|p| p.x).min().unwrap_or(0);
    let max_x = quad.iter().map(|p| p.x).max().unwrap_or(0);
    let min_y = quad.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = quad.iter().map(|p| p.y).max().unwrap_or(0);
    ((max_x - min_x).max(0) as usize, (max_y - min_y).max(0) as usize)
}

/// Orders quad corners as top-left, top-right, bottom-right, bottom-left of
/// the card regardless of its rotation in the frame.
///
/// Portrait and landscape orientations are resolved through coordinate sums
/// and differences; near-45-degree "diamond" orientations use the relative
/// height of the leftmost and rightmost corners to tell a left tilt from a
/// right tilt.
pub(crate) fn order_corners(quad: [Point; 4], cfg: &FlattenConfig) -> [Point; 4] {
    let (w, h) = bounding_rect(&quad);

    let sum = |p: &Point| i64::from(p.x) + i64::from(p.y);
    let diff = |p: &Point| i64::from(p.y) - i64::from(p.x);
    let min_sum = *quad.iter().min_by_key(|p| sum(p)).expect("four corners");
    let max_sum = *quad.iter().max_by_key(|p| sum(p)).expect("four corners");
    let min_diff = *quad.iter().min_by_key(|p| diff(p)).expect("four corners");
    let max_diff = *quad.iter().max_by_key(|p| diff(p)).expect("four corners");

    let w = w as f64;
    let h = h as f64;
    if w <= cfg.portrait_ratio * h {
        return [min_sum, min_diff, max_sum, max_diff];
    }
    if w >= cfg.landscape_ratio * h {
        // Card lies on its side; the long edge becomes vertical after
        // rectification.
        return [max_diff, min_sum, min_diff, max_sum];
    }

    // Diamond orientation: classify the tilt by extreme corners.
    let top = *quad.iter().min_by_key(|p| p.y).expect("four corners");
    let bottom = *quad.iter().max_by_key(|p| p.y).expect("four corners");
    let left = *quad.iter().min_by_key(|p| p.x).expect("four corners");
    let right = *quad.iter().max_by_key(|p| p.x).expect("four corners");
    if left.y <= right.y {
        // Tilted left: the topmost corner is the card's physical top-right.
        [left, top, right, bottom]
    } else {
        // Tilted right: the topmost corner is the card's physical top-left.
        [top, right, bottom, left]
    }
}

/// Crops the glyph to the bounding box of its largest connected component
/// and scales it to the canonical size.
///
/// Using the largest component keeps thin residue along the crop border
/// (warp spill from the card edge) out of the glyph. A region with no
/// foreground yields a blank canonical image, which scores poorly against
/// every template and falls out as "Unknown" downstream.
fn isolate_glyph(region: &GrayImage, width: usize, height: usize) -> GrayImage {
    let blank = || GrayImage::zeroed(width, height).expect("glyph dimensions are non-zero");
    let contours = crate::contour::find_contours(region.view());
    let Some(largest) = contours.first() else {
        return blank();
    };
    let min_x = largest.points().iter().map(|p| p.x).min().unwrap_or(0).max(0) as usize;
    let max_x = largest.points().iter().map(|p| p.x).max().unwrap_or(0).max(0) as usize;
    let min_y = largest.points().iter().map(|p| p.y).min().unwrap_or(0).max(0) as usize;
    let max_y = largest.points().iter().map(|p| p.y).max().unwrap_or(0).max(0) as usize;
    let Ok(cropped) = region.crop(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1) else {
        return blank();
    };
    cropped.resize_bilinear(width, height).unwrap_or_else(|_| blank())
}

/// Normalizes a card contour into a [`Card`] with canonical glyph crops.
///
/// Returns `None` when the corner approximation or the warp degenerates; the
/// contour is then treated as noise and silently discarded.
pub fn flatten_card(
    gray_frame: ImageView<'_, u8>,
    contour: &Contour,
    approx: &[Point],
    cfg: &FlattenConfig,
    glyphs: &GlyphGeometry,
) -> Option<Card> {
    let _span = trace_span!("flatten", corners = approx.len()).entered();

    let quad = dominant_quad(approx, contour.perimeter())?;
    flatten_quad(gray_frame, contour, quad, cfg, glyphs)
}

/// Normalizes an explicit corner quad; shared by the single-card path and the
/// stacked-cluster splitter.
pub(crate) fn flatten_quad(
    gray_frame: ImageView<'_, u8>,
    contour: &Contour,
    quad: [Point; 4],
    cfg: &FlattenConfig,
    glyphs: &GlyphGeometry,
) -> Option<Card> {
    let corners = order_corners(quad, cfg);
    let (width, height) = bounding_rect(&corners);
    let (cx, cy) = math::centroid(&corners);

    let flattened = warp_quad(gray_frame, corners, cfg.card_width, cfg.card_height)?;

    // Corner crop, zoomed so thin glyph strokes survive thresholding.
    let corner = flattened
        .crop(0, 0, cfg.corner_width.min(cfg.card_width), cfg.corner_height.min(cfg.card_height))
        .ok()?;
    let zoom = cfg.corner_zoom.max(1);
    let zoomed = corner
        .resize_bilinear(corner.width() * zoom, corner.height() * zoom)
        .ok()?;

    // Threshold relative to the card-face white level, inverted so ink
    // becomes foreground.
    let (sx, sy) = cfg.white_sample;
    let white = zoomed
        .get(sx.min(zoomed.width() - 1), sy.min(zoomed.height() - 1))
        .unwrap_or(255);
    let threshold = white.saturating_sub(cfg.white_offset).max(1);
    let mut binary = zoomed;
    for v in binary.data_mut() {
        *v = if *v < threshold { 255 } else { 0 };
    }

    let rank_region = row_span(&binary, cfg.rank_rows)?;
    let suit_region = row_span(&binary, cfg.suit_rows)?;
    let rank_image = isolate_glyph(&rank_region, glyphs.rank_width, glyphs.rank_height);
    let suit_image = isolate_glyph(&suit_region, glyphs.suit_width, glyphs.suit_height);

    Some(Card {
        contour: contour.clone(),
        corners,
        center: Point::new(cx.round() as i32, cy.round() as i32),
        width,
        height,
        rank_image,
        suit_image,
        ident: Identification::unknown(),
    })
}

fn row_span(img: &GrayImage, (top, bottom): (usize, usize)) -> Option<GrayImage> {
    let top = top.min(img.height().saturating_sub(1));
    let bottom = bottom.min(img.height());
    if bottom <= top {
        return None;
    }
    img.crop(0, top, img.width(), bottom - top).ok()
}

#[cfg(test)]
mod tests {
    use super::{order_corners, FlattenConfig};
    use crate::contour::Point;

    fn cfg() -> FlattenConfig {
        FlattenConfig::default()
    }

    #[test]
    fn upright_portrait_order_is_identity() {
        let quad = [
            Point::new(10, 10),
            Point::new(70, 10),
            Point::new(70, 100),
            Point::new(10, 100),
        ];
        let ordered = order_corners(quad, &cfg());
        assert_eq!(ordered[0], Point::new(10, 10));
        assert_eq!(ordered[1], Point::new(70, 10));
        assert_eq!(ordered[2], Point::new(70, 100));
        assert_eq!(ordered[3], Point::new(10, 100));
    }

    #[test]
    fn landscape_card_maps_long_edge_vertical() {
        // The same card lying on its side.
        let quad = [
            Point::new(10, 10),
            Point::new(100, 10),
            Point::new(100, 70),
            Point::new(10, 70),
        ];
        let ordered = order_corners(quad, &cfg());
        // Canonical top-left comes from the frame's bottom-left corner.
        assert_eq!(ordered[0], Point::new(10, 70));
        assert_eq!(ordered[1], Point::new(10, 10));
        assert_eq!(ordered[2], Point::new(100, 10));
        assert_eq!(ordered[3], Point::new(100, 70));
    }

    #[test]
    fn diamond_tilted_left_and_right_disambiguate() {
        // Tilted left (counter-clockwise): leftmost corner above rightmost.
        let left_tilt = [
            Point::new(50, 10),
            Point::new(80, 50),
            Point::new(40, 90),
            Point::new(10, 45),
        ];
        let ordered = order_corners(left_tilt, &cfg());
        assert_eq!(ordered[0], Point::new(10, 45));
        assert_eq!(ordered[1], Point::new(50, 10));

        // Tilted right (clockwise): leftmost corner below rightmost.
        let right_tilt = [
            Point::new(40, 10),
            Point::new(80, 45),
            Point::new(50, 90),
            Point::new(10, 50),
        ];
        let ordered = order_corners(right_tilt, &cfg());
        assert_eq!(ordered[0], Point::new(40, 10));
        assert_eq!(ordered[1], Point::new(80, 45));
    }

    #[test]
    fn ordering_is_invariant_under_input_permutation() {
        let quad = [
            Point::new(10, 10),
            Point::new(70, 10),
            Point::new(70, 100),
            Point::new(10, 100),
        ];
        let shuffled = [quad[2], quad[0], quad[3], quad[1]];
        assert_eq!(order_corners(quad, &cfg()), order_corners(shuffled, &cfg()));
    }
}
