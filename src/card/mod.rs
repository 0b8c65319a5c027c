//! Card entities and normalization into canonical rank/suit crops.

use crate::contour::{Contour, Point};
use crate::image::GrayImage;
use crate::matcher::Identification;

pub mod flatten;
pub mod split;
pub(crate) mod warp;

pub use flatten::{flatten_card, FlattenConfig};
pub use split::split_cluster;

/// One detected card in a frame.
///
/// Created per frame and dropped at the end of it; there is no cross-frame
/// identity tracking. `ident` starts as [`Identification::unknown`] and is
/// filled in by the matcher stage.
#[derive(Clone, Debug)]
pub struct Card {
    /// Boundary contour in frame coordinates. For a card recovered from a
    /// stacked cluster this is the cluster contour shared by its siblings.
    pub contour: Contour,
    /// The four geometric corners, ordered top-left, top-right,
    /// bottom-right, bottom-left of the rectified card.
    pub corners: [Point; 4],
    /// Center of the corner quadrilateral in frame coordinates.
    pub center: Point,
    /// Axis-aligned bounding width of the corner quadrilateral.
    pub width: usize,
    /// Axis-aligned bounding height of the corner quadrilateral.
    pub height: usize,
    /// Canonical rank glyph crop, sized to the template bank geometry.
    pub rank_image: GrayImage,
    /// Canonical suit glyph crop, sized to the template bank geometry.
    pub suit_image: GrayImage,
    /// Rank/suit identification, unknown until matched.
    pub ident: Identification,
}
