//! Reference glyph templates for rank and suit identification.
//!
//! Templates are immutable after load and shared read-only by every matching
//! call. Their order in the bank is the tie-break order: on an exact score
//! tie, the first-loaded template wins, so matching stays deterministic.

use crate::image::GrayImage;
use crate::util::{CardMatchError, CardMatchResult};

#[cfg(feature = "image-io")]
pub mod loader;

/// Canonical glyph crop dimensions shared by the bank and the normalizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphGeometry {
    /// Width of a rank glyph in pixels.
    pub rank_width: usize,
    /// Height of a rank glyph in pixels.
    pub rank_height: usize,
    /// Width of a suit glyph in pixels.
    pub suit_width: usize,
    /// Height of a suit glyph in pixels.
    pub suit_height: usize,
}

impl Default for GlyphGeometry {
    fn default() -> Self {
        Self {
            rank_width: 70,
            rank_height: 125,
            suit_width: 70,
            suit_height: 100,
        }
    }
}

/// A named reference glyph image.
#[derive(Clone)]
pub struct Template {
    name: String,
    image: GrayImage,
}

impl Template {
    /// Creates a template from a name and glyph image.
    pub fn new(name: impl Into<String>, image: GrayImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    /// Returns the template label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the glyph image.
    pub fn image(&self) -> &GrayImage {
        &self.image
    }
}

/// In-memory store of rank and suit templates in fixed load order.
pub struct TemplateBank {
    ranks: Vec<Template>,
    suits: Vec<Template>,
    geometry: GlyphGeometry,
}

impl TemplateBank {
    /// Builds a bank, validating that both sets are non-empty and every
    /// template matches the declared glyph geometry.
    pub fn new(
        ranks: Vec<Template>,
        suits: Vec<Template>,
        geometry: GlyphGeometry,
    ) -> CardMatchResult<Self> {
        if ranks.is_empty() {
            return Err(CardMatchError::EmptyBank { kind: "rank" });
        }
        if suits.is_empty() {
            return Err(CardMatchError::EmptyBank { kind: "suit" });
        }
        for tpl in &ranks {
            check_size(tpl, geometry.rank_width, geometry.rank_height, "rank template")?;
        }
        for tpl in &suits {
            check_size(tpl, geometry.suit_width, geometry.suit_height, "suit template")?;
        }
        Ok(Self {
            ranks,
            suits,
            geometry,
        })
    }

    /// Returns the rank templates in tie-break order.
    pub fn ranks(&self) -> &[Template] {
        &self.ranks
    }

    /// Returns the suit templates in tie-break order.
    pub fn suits(&self) -> &[Template] {
        &self.suits
    }

    /// Returns the canonical glyph geometry.
    pub fn geometry(&self) -> GlyphGeometry {
        self.geometry
    }
}

fn check_size(
    tpl: &Template,
    width: usize,
    height: usize,
    context: &'static str,
) -> CardMatchResult<()> {
    let img = tpl.image();
    if img.width() != width || img.height() != height {
        return Err(CardMatchError::SizeMismatch {
            context,
            expected_width: width,
            expected_height: height,
            width: img.width(),
            height: img.height(),
        });
    }
    Ok(())
}
