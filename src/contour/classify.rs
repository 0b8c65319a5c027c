//! Contour classification: background noise, single card, or stacked cluster.
//!
//! A contour is accepted as a card when its area falls inside the configured
//! band, its polygonal approximation is quad-like, and it is not nested
//! inside an already-accepted card (a card's printed inner border must not
//! count as a second card). An accepted contour is flagged stacked when its
//! convex hull area notably exceeds the raw area (concave multi-card
//! silhouette) or the approximation has more corners than a single card
//! would. Ambiguous shapes default to single.

use crate::contour::approx::approx_contour;
use crate::contour::{Contour, Point};
use crate::trace::{trace_event, trace_span};
use crate::util::math;

/// Shape of an accepted card contour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardShape {
    /// One card, four clean corners.
    Single,
    /// Concave union of two or more overlapping cards.
    Stacked,
}

/// Classification outcome for one contour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContourClass {
    /// Noise speck, background blob, or nested inner border.
    Rejected,
    /// Card candidate with its shape.
    Card(CardShape),
}

/// A contour together with its classification and cached approximation.
#[derive(Clone, Debug)]
pub struct ClassifiedContour {
    pub contour: Contour,
    pub class: ContourClass,
    /// Polygonal approximation used during classification, reused by the
    /// normalizer.
    pub approx: Vec<Point>,
}

impl ClassifiedContour {
    /// True when the contour was accepted as a card of either shape.
    pub fn is_card(&self) -> bool {
        matches!(self.class, ContourClass::Card(_))
    }
}

/// Configuration for contour classification.
#[derive(Clone, Debug)]
pub struct ClassifierConfig {
    /// Minimum contour area accepted as a card.
    pub min_area: f64,
    /// Maximum contour area accepted as a card.
    pub max_area: f64,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_factor: f64,
    /// Extra corners beyond four still accepted as card-like.
    pub corner_tolerance: usize,
    /// Hull-to-contour area ratio above which a contour counts as stacked.
    /// Calibration value, not derived.
    pub hull_excess: f64,
    /// Approximation corner count above which a contour counts as stacked.
    /// Calibration value, not derived.
    pub stacked_corner_bound: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_area: 25_000.0,
            max_area: 120_000.0,
            approx_epsilon_factor: 0.01,
            corner_tolerance: 4,
            hull_excess: 1.15,
            stacked_corner_bound: 5,
        }
    }
}

/// Classifies contours, largest first.
///
/// The input is re-sorted descending by area so that the nested-contour check
/// always sees enclosing cards before their children. The output keeps every
/// contour, rejected ones included, in that order.
pub fn classify_contours(
    mut contours: Vec<Contour>,
    cfg: &ClassifierConfig,
) -> Vec<ClassifiedContour> {
    let _span = trace_span!("classify", count = contours.len()).entered();
    contours.sort_by(|a, b| b.area().total_cmp(&a.area()));

    let mut accepted: Vec<Vec<Point>> = Vec::new();
    let mut out = Vec::with_capacity(contours.len());

    for contour in contours {
        let approx = approx_contour(&contour, cfg.approx_epsilon_factor);
        let class = classify_one(&contour, &approx, &accepted, cfg);
        if let ContourClass::Card(_) = class {
            accepted.push(contour.points().to_vec());
        }
        out.push(ClassifiedContour {
            contour,
            class,
            approx,
        });
    }

    trace_event!(
        "contours_classified",
        cards = out.iter().filter(|c| c.is_card()).count(),
    );
    out
}

fn classify_one(
    contour: &Contour,
    approx: &[Point],
    accepted: &[Vec<Point>],
    cfg: &ClassifierConfig,
) -> ContourClass {
    let area = contour.area();
    if area < cfg.min_area || area > cfg.max_area {
        return ContourClass::Rejected;
    }

    let corners = approx.len();
    if corners < 4 || corners > 4 + cfg.corner_tolerance {
        return ContourClass::Rejected;
    }

    let centroid = contour.centroid();
    if accepted
        .iter()
        .any(|outer| math::point_in_polygon(centroid, outer))
    {
        return ContourClass::Rejected;
    }

    let hull = math::convex_hull(contour.points());
    let hull_area = math::polygon_area(&hull);
    let concave = hull_area > area * cfg.hull_excess;
    let too_many_corners = corners > cfg.stacked_corner_bound;

    if concave || too_many_corners {
        ContourClass::Card(CardShape::Stacked)
    } else {
        ContourClass::Card(CardShape::Single)
    }
}
