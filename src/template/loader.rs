//! Template loading from a directory of glyph images.
//!
//! Available when the `image-io` feature is enabled. File names follow the
//! training-image convention `<Name>.jpg` (`Ace.jpg` .. `King.jpg`,
//! `Spades.jpg` .. `Clubs.jpg`); iteration order over the fixed name lists
//! defines the bank's deterministic tie-break order.

use crate::image::io::load_gray_image;
use crate::template::{GlyphGeometry, Template, TemplateBank};
use crate::util::CardMatchResult;
use std::path::Path;

/// Rank template names in load order.
pub const RANK_NAMES: [&str; 13] = [
    "Ace", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Jack",
    "Queen", "King",
];

/// Suit template names in load order.
pub const SUIT_NAMES: [&str; 4] = ["Spades", "Diamonds", "Clubs", "Hearts"];

fn load_set(
    dir: &Path,
    names: &[&str],
    width: usize,
    height: usize,
) -> CardMatchResult<Vec<Template>> {
    let mut templates = Vec::with_capacity(names.len());
    for name in names {
        let image = load_gray_image(dir.join(format!("{name}.jpg")))?;
        // Stored glyphs may predate a geometry change; normalize on load.
        let image = if image.width() == width && image.height() == height {
            image
        } else {
            image.resize_bilinear(width, height)?
        };
        templates.push(Template::new(*name, image));
    }
    Ok(templates)
}

/// Loads the rank templates from `dir` in fixed order.
pub fn load_ranks<P: AsRef<Path>>(dir: P, geometry: GlyphGeometry) -> CardMatchResult<Vec<Template>> {
    load_set(
        dir.as_ref(),
        &RANK_NAMES,
        geometry.rank_width,
        geometry.rank_height,
    )
}

/// Loads the suit templates from `dir` in fixed order.
pub fn load_suits<P: AsRef<Path>>(dir: P, geometry: GlyphGeometry) -> CardMatchResult<Vec<Template>> {
    load_set(
        dir.as_ref(),
        &SUIT_NAMES,
        geometry.suit_width,
        geometry.suit_height,
    )
}

/// Loads rank and suit templates from `dir` into a bank.
pub fn load_bank<P: AsRef<Path>>(dir: P, geometry: GlyphGeometry) -> CardMatchResult<TemplateBank> {
    let dir = dir.as_ref();
    let ranks = load_ranks(dir, geometry)?;
    let suits = load_suits(dir, geometry)?;
    TemplateBank::new(ranks, suits, geometry)
}
