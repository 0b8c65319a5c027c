//! Shared builders for synthetic frames and template banks.
//!
//! The synthetic card is a white 200x300 rectangle with ink glyphs painted
//! in the top-left index corner and, like a real playing card, the same
//! glyphs rotated 180 degrees in the bottom-right corner. The rank glyph is
//! a "[" frame (a connected shape whose bounding box keeps a distinctive
//! interior) standing in for "10"; the suit glyph is a solid block standing
//! in for "Hearts".

// Each integration test binary uses its own subset of these helpers.
#![allow(dead_code)]

use cardmatch::{
    DetectorConfig, GlyphGeometry, GrayImage, MatcherConfig, RgbFrame, Template, TemplateBank,
};

pub const CARD_W: usize = 200;
pub const CARD_H: usize = 300;

/// Bank with two ranks ("10", "King") and two suits ("Hearts", "Spades").
pub fn glyph_bank() -> TemplateBank {
    let geometry = GlyphGeometry::default();

    let mut ten = vec![0u8; geometry.rank_width * geometry.rank_height];
    for y in 0..geometry.rank_height {
        for x in 0..geometry.rank_width {
            // "[" frame: left bar plus top and bottom bars, open right.
            if x < 14 || y < 14 || y >= geometry.rank_height - 14 {
                ten[y * geometry.rank_width + x] = 255;
            }
        }
    }
    let king = vec![255u8; geometry.rank_width * geometry.rank_height];

    let hearts = vec![255u8; geometry.suit_width * geometry.suit_height];
    let mut spades = vec![0u8; geometry.suit_width * geometry.suit_height];
    for y in 0..geometry.suit_height {
        for x in 0..geometry.suit_width / 2 {
            spades[y * geometry.suit_width + x] = 255;
        }
    }

    TemplateBank::new(
        vec![
            Template::new(
                "10",
                GrayImage::from_vec(ten, geometry.rank_width, geometry.rank_height).unwrap(),
            ),
            Template::new(
                "King",
                GrayImage::from_vec(king, geometry.rank_width, geometry.rank_height).unwrap(),
            ),
        ],
        vec![
            Template::new(
                "Hearts",
                GrayImage::from_vec(hearts, geometry.suit_width, geometry.suit_height).unwrap(),
            ),
            Template::new(
                "Spades",
                GrayImage::from_vec(spades, geometry.suit_width, geometry.suit_height).unwrap(),
            ),
        ],
        geometry,
    )
    .unwrap()
}

/// Detector configuration with slightly relaxed match thresholds to absorb
/// interpolation fuzz in the synthetic glyphs.
pub fn detector_config() -> DetectorConfig {
    DetectorConfig {
        matcher: MatcherConfig {
            max_rank_diff: 2500,
            max_suit_diff: 1200,
        },
        ..DetectorConfig::default()
    }
}

fn ink_rect(frame: &mut RgbFrame, x0: usize, y0: usize, rect: (usize, usize, usize, usize)) {
    let (rx0, ry0, rx1, ry1) = rect;
    for y in ry0..ry1 {
        for x in rx0..rx1 {
            // Index corner glyph plus its 180-degree twin.
            frame.put_pixel(x0 + x, y0 + y, [0, 0, 0]);
            frame.put_pixel(x0 + CARD_W - 1 - x, y0 + CARD_H - 1 - y, [0, 0, 0]);
        }
    }
}

/// Paints the synthetic "10 of Hearts" card with its top-left corner at
/// `(x0, y0)`.
pub fn paint_card(frame: &mut RgbFrame, x0: usize, y0: usize) {
    for y in 0..CARD_H {
        for x in 0..CARD_W {
            frame.put_pixel(x0 + x, y0 + y, [255, 255, 255]);
        }
    }
    // Rank "[" frame in corner-crop coordinates.
    ink_rect(frame, x0, y0, (6, 8, 10, 44));
    ink_rect(frame, x0, y0, (6, 8, 26, 12));
    ink_rect(frame, x0, y0, (6, 40, 26, 44));
    // Suit block below the rank glyph.
    ink_rect(frame, x0, y0, (6, 50, 24, 70));
}

/// A dark frame holding one upright synthetic card.
pub fn card_frame(width: usize, height: usize, x0: usize, y0: usize) -> RgbFrame {
    let mut frame = RgbFrame::zeroed(width, height).unwrap();
    paint_card(&mut frame, x0, y0);
    frame
}

/// Rotates a frame clockwise by 90 degrees.
pub fn rotate_frame_cw(frame: &RgbFrame) -> RgbFrame {
    let w = frame.width();
    let h = frame.height();
    let mut out = RgbFrame::zeroed(h, w).unwrap();
    for y in 0..h {
        for x in 0..w {
            let px = frame.pixel(x, y).unwrap();
            out.put_pixel(h - 1 - y, x, px);
        }
    }
    out
}

/// Shoelace area of a corner quad.
pub fn quad_area(corners: &[cardmatch::Point; 4]) -> f64 {
    let mut acc = 0i64;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        acc += i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y);
    }
    acc.unsigned_abs() as f64 / 2.0
}
