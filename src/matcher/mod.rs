//! Nearest-template identification of rank and suit glyphs.
//!
//! Scoring is the scaled sum of absolute pixel differences; lower is closer.
//! Templates are scanned in bank order with strict improvement, so the first
//! template encountered wins exact ties and repeated calls are bit-for-bit
//! identical. The optional `rayon` feature parallelizes the per-template
//! scan; its reduction minimizes over `(score, index)` pairs and therefore
//! preserves the first-wins order exactly.

use crate::image::{GrayImage, ImageView};
use crate::template::{Template, TemplateBank};
use crate::trace::trace_event;
use crate::util::{CardMatchError, CardMatchResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Label reported when no template is close enough to trust.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Acceptance thresholds for template matching.
#[derive(Clone, Debug)]
pub struct MatcherConfig {
    /// Maximum rank score still accepted; above it the rank is "Unknown".
    pub max_rank_diff: u32,
    /// Maximum suit score still accepted; above it the suit is "Unknown".
    pub max_suit_diff: u32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_rank_diff: 2000,
            max_suit_diff: 700,
        }
    }
}

/// Result of matching one card's glyphs against the bank.
///
/// Scores are always non-negative and always populated, even when the label
/// is "Unknown"; they refer to the nominal best template either way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identification {
    pub best_rank: String,
    pub best_suit: String,
    pub rank_diff: u32,
    pub suit_diff: u32,
}

impl Identification {
    /// The identification of a card that has not been matched yet.
    pub fn unknown() -> Self {
        Self {
            best_rank: UNKNOWN_LABEL.to_string(),
            best_suit: UNKNOWN_LABEL.to_string(),
            rank_diff: 0,
            suit_diff: 0,
        }
    }
}

/// Scaled sum of absolute differences between two equally-sized images.
pub fn absdiff_score(a: ImageView<'_, u8>, b: ImageView<'_, u8>) -> CardMatchResult<u32> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(CardMatchError::SizeMismatch {
            context: "absdiff",
            expected_width: a.width(),
            expected_height: a.height(),
            width: b.width(),
            height: b.height(),
        });
    }
    let mut sum = 0u64;
    for y in 0..a.height() {
        let row_a = a.row(y).expect("row within view bounds");
        let row_b = b.row(y).expect("row within view bounds");
        for (&pa, &pb) in row_a.iter().zip(row_b) {
            sum += u64::from(pa.abs_diff(pb));
        }
    }
    Ok((sum / 255) as u32)
}

#[cfg(not(feature = "rayon"))]
fn best_template<'a>(
    glyph: &GrayImage,
    templates: &'a [Template],
) -> CardMatchResult<(&'a Template, u32)> {
    let mut best: Option<(&Template, u32)> = None;
    for tpl in templates {
        let score = absdiff_score(glyph.view(), tpl.image().view())?;
        // Strict improvement keeps the first template on exact ties.
        if best.map_or(true, |(_, s)| score < s) {
            best = Some((tpl, score));
        }
    }
    Ok(best.expect("template bank sets are non-empty"))
}

#[cfg(feature = "rayon")]
fn best_template<'a>(
    glyph: &GrayImage,
    templates: &'a [Template],
) -> CardMatchResult<(&'a Template, u32)> {
    let scored: CardMatchResult<Vec<u32>> = templates
        .par_iter()
        .map(|tpl| absdiff_score(glyph.view(), tpl.image().view()))
        .collect();
    let scored = scored?;
    let (idx, score) = scored
        .into_iter()
        .enumerate()
        .min_by_key(|&(idx, score)| (score, idx))
        .expect("template bank sets are non-empty");
    Ok((&templates[idx], score))
}

/// Identifies rank and suit glyphs against the bank.
///
/// Rank and suit are matched independently; either can come back "Unknown"
/// when its best score exceeds the acceptance threshold.
pub fn identify(
    rank_image: &GrayImage,
    suit_image: &GrayImage,
    bank: &TemplateBank,
    cfg: &MatcherConfig,
) -> CardMatchResult<Identification> {
    let (rank_tpl, rank_diff) = best_template(rank_image, bank.ranks())?;
    let (suit_tpl, suit_diff) = best_template(suit_image, bank.suits())?;

    let best_rank = if rank_diff <= cfg.max_rank_diff {
        rank_tpl.name().to_string()
    } else {
        UNKNOWN_LABEL.to_string()
    };
    let best_suit = if suit_diff <= cfg.max_suit_diff {
        suit_tpl.name().to_string()
    } else {
        UNKNOWN_LABEL.to_string()
    };

    trace_event!("card_matched", rank_diff = rank_diff, suit_diff = suit_diff);
    Ok(Identification {
        best_rank,
        best_suit,
        rank_diff,
        suit_diff,
    })
}

#[cfg(test)]
mod tests {
    use super::{absdiff_score, identify, Identification, MatcherConfig, UNKNOWN_LABEL};
    use crate::image::GrayImage;
    use crate::template::{GlyphGeometry, Template, TemplateBank};

    fn small_geometry() -> GlyphGeometry {
        GlyphGeometry {
            rank_width: 4,
            rank_height: 4,
            suit_width: 4,
            suit_height: 4,
        }
    }

    fn flat(value: u8) -> GrayImage {
        GrayImage::from_vec(vec![value; 16], 4, 4).unwrap()
    }

    fn bank() -> TemplateBank {
        TemplateBank::new(
            vec![
                Template::new("Ace", flat(0)),
                Template::new("Two", flat(100)),
            ],
            vec![
                Template::new("Spades", flat(50)),
                Template::new("Hearts", flat(200)),
            ],
            small_geometry(),
        )
        .unwrap()
    }

    #[test]
    fn absdiff_rejects_size_mismatch() {
        let a = GrayImage::zeroed(4, 4).unwrap();
        let b = GrayImage::zeroed(4, 5).unwrap();
        assert!(absdiff_score(a.view(), b.view()).is_err());
    }

    #[test]
    fn nearest_template_wins() {
        let cfg = MatcherConfig {
            max_rank_diff: 100,
            max_suit_diff: 100,
        };
        let ident = identify(&flat(90), &flat(60), &bank(), &cfg).unwrap();
        assert_eq!(ident.best_rank, "Two");
        assert_eq!(ident.best_suit, "Spades");
    }

    #[test]
    fn exact_tie_prefers_first_template() {
        // Equidistant from both rank templates: |50-0| == |50-100|.
        let cfg = MatcherConfig {
            max_rank_diff: 10_000,
            max_suit_diff: 10_000,
        };
        let ident = identify(&flat(50), &flat(50), &bank(), &cfg).unwrap();
        assert_eq!(ident.best_rank, "Ace");
    }

    #[test]
    fn repeated_calls_are_identical() {
        let cfg = MatcherConfig::default();
        let rank = flat(30);
        let suit = flat(70);
        let bank = bank();
        let first = identify(&rank, &suit, &bank, &cfg).unwrap();
        for _ in 0..5 {
            assert_eq!(identify(&rank, &suit, &bank, &cfg).unwrap(), first);
        }
    }

    #[test]
    fn score_at_threshold_is_accepted_and_above_is_not() {
        // Glyph at value 17 scores exactly (17 * 16) / 255 = 1 vs "Ace".
        let glyph = flat(17);
        let score = absdiff_score(glyph.view(), flat(0).view()).unwrap();
        assert_eq!(score, 1);

        let at = MatcherConfig {
            max_rank_diff: score,
            max_suit_diff: 10_000,
        };
        let ident = identify(&glyph, &flat(50), &bank(), &at).unwrap();
        assert_eq!(ident.best_rank, "Ace");

        let below = MatcherConfig {
            max_rank_diff: score - 1,
            max_suit_diff: 10_000,
        };
        let ident = identify(&glyph, &flat(50), &bank(), &below).unwrap();
        assert_eq!(ident.best_rank, UNKNOWN_LABEL);
        assert_eq!(ident.rank_diff, score);
    }

    #[test]
    fn unknown_identification_defaults() {
        let ident = Identification::unknown();
        assert_eq!(ident.best_rank, UNKNOWN_LABEL);
        assert_eq!(ident.suit_diff, 0);
    }
}
