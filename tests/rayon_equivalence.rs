#![cfg(feature = "rayon")]

use cardmatch::matcher::absdiff_score;
use cardmatch::{identify, GlyphGeometry, GrayImage, MatcherConfig, Template, TemplateBank};

fn glyph(width: usize, height: usize, seed: usize) -> GrayImage {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push((((x * 13) ^ (y * 7) ^ seed) & 0xFF) as u8);
        }
    }
    GrayImage::from_vec(data, width, height).unwrap()
}

/// The parallel template scan must agree with a sequential first-wins scan.
#[test]
fn parallel_scan_matches_sequential_scan() {
    let geometry = GlyphGeometry::default();
    let ranks: Vec<Template> = (0..13)
        .map(|i| {
            Template::new(
                format!("rank{i}"),
                glyph(geometry.rank_width, geometry.rank_height, i * 31),
            )
        })
        .collect();
    let suits: Vec<Template> = (0..4)
        .map(|i| {
            Template::new(
                format!("suit{i}"),
                glyph(geometry.suit_width, geometry.suit_height, i * 97),
            )
        })
        .collect();

    let probe_rank = glyph(geometry.rank_width, geometry.rank_height, 3 * 31);
    let probe_suit = glyph(geometry.suit_width, geometry.suit_height, 2 * 97);

    // Sequential reference: first strict minimum in bank order.
    let mut expected_rank = (String::new(), u32::MAX);
    for tpl in &ranks {
        let score = absdiff_score(probe_rank.view(), tpl.image().view()).unwrap();
        if score < expected_rank.1 {
            expected_rank = (tpl.name().to_string(), score);
        }
    }
    let mut expected_suit = (String::new(), u32::MAX);
    for tpl in &suits {
        let score = absdiff_score(probe_suit.view(), tpl.image().view()).unwrap();
        if score < expected_suit.1 {
            expected_suit = (tpl.name().to_string(), score);
        }
    }

    let bank = TemplateBank::new(ranks, suits, geometry).unwrap();
    let cfg = MatcherConfig {
        max_rank_diff: u32::MAX,
        max_suit_diff: u32::MAX,
    };
    let ident = identify(&probe_rank, &probe_suit, &bank, &cfg).unwrap();

    assert_eq!(ident.best_rank, expected_rank.0);
    assert_eq!(ident.rank_diff, expected_rank.1);
    assert_eq!(ident.best_suit, expected_suit.0);
    assert_eq!(ident.suit_diff, expected_suit.1);
}
