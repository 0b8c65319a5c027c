mod common;

use cardmatch::{annotate, Annotator, Card, CardDetector, RgbFrame};
use common::{card_frame, detector_config, glyph_bank};

/// Rendering sink that counts calls instead of drawing.
#[derive(Default)]
struct RecordingAnnotator {
    outlines: usize,
    labels: Vec<(String, String)>,
    fps_overlays: usize,
    presented: usize,
}

impl Annotator for RecordingAnnotator {
    fn outline_card(&mut self, _frame: &mut RgbFrame, _card: &Card) {
        self.outlines += 1;
    }

    fn label_card(&mut self, _frame: &mut RgbFrame, card: &Card) {
        self.labels
            .push((card.ident.best_rank.clone(), card.ident.best_suit.clone()));
    }

    fn overlay_fps(&mut self, _frame: &mut RgbFrame, _fps: f64) {
        self.fps_overlays += 1;
    }

    fn present(&mut self, _frame: &RgbFrame) {
        self.presented += 1;
    }
}

#[test]
fn ten_of_hearts_is_detected_and_identified() {
    let detector = CardDetector::new(glyph_bank()).with_config(detector_config());
    let frame = card_frame(400, 450, 60, 40);

    let report = detector.process_frame(&frame).unwrap();
    assert_eq!(report.cards.len(), 1, "expected exactly one card");

    let card = &report.cards[0];
    assert_eq!(card.ident.best_rank, "10");
    assert_eq!(card.ident.best_suit, "Hearts");
    assert!(card.ident.rank_diff <= detector.config().matcher.max_rank_diff);
    assert!(card.ident.suit_diff <= detector.config().matcher.max_suit_diff);
}

#[test]
fn detected_card_has_consistent_geometry() {
    let detector = CardDetector::new(glyph_bank()).with_config(detector_config());
    let frame = card_frame(400, 450, 60, 40);

    let report = detector.process_frame(&frame).unwrap();
    let card = &report.cards[0];

    // Portrait card: corner quad roughly matches the painted rectangle.
    assert!(card.width >= 190 && card.width <= 210, "width {}", card.width);
    assert!(
        card.height >= 290 && card.height <= 310,
        "height {}",
        card.height
    );
    let cx = card.center.x;
    let cy = card.center.y;
    assert!((cx - 159).abs() <= 4, "center x {cx}");
    assert!((cy - 189).abs() <= 4, "center y {cy}");
}

#[test]
fn annotation_draws_one_outline_per_card() {
    let detector = CardDetector::new(glyph_bank()).with_config(detector_config());
    let mut frame = card_frame(400, 450, 60, 40);

    let report = detector.process_frame(&frame).unwrap();
    let mut sink = RecordingAnnotator::default();
    annotate(&mut frame, &report, &mut sink);

    assert_eq!(sink.outlines, 1);
    assert_eq!(sink.labels, vec![("10".to_string(), "Hearts".to_string())]);
    assert_eq!(sink.fps_overlays, 1);
    assert_eq!(sink.presented, 1);
}

#[test]
fn empty_frame_yields_rate_overlay_only() {
    let detector = CardDetector::new(glyph_bank()).with_config(detector_config());
    let mut frame = RgbFrame::zeroed(400, 450).unwrap();

    let report = detector.process_frame(&frame).unwrap();
    assert!(report.cards.is_empty());
    assert_eq!(report.stats.cards, 0);

    let mut sink = RecordingAnnotator::default();
    annotate(&mut frame, &report, &mut sink);
    assert_eq!(sink.outlines, 0);
    assert_eq!(sink.fps_overlays, 1);
    assert_eq!(sink.presented, 1);
}

#[test]
fn all_bright_frame_degenerates_to_no_detections() {
    let detector = CardDetector::new(glyph_bank()).with_config(detector_config());
    let frame = RgbFrame::from_vec(vec![255u8; 320 * 240 * 3], 320, 240).unwrap();

    // The background sample saturates the threshold, so nothing is
    // foreground; degenerate frames are not errors.
    let report = detector.process_frame(&frame).unwrap();
    assert!(report.cards.is_empty());
}

#[test]
fn repeated_frames_produce_identical_detections() {
    let detector = CardDetector::new(glyph_bank()).with_config(detector_config());
    let frame = card_frame(400, 450, 60, 40);

    let first = detector.process_frame(&frame).unwrap();
    let second = detector.process_frame(&frame).unwrap();
    assert_eq!(first.cards.len(), second.cards.len());
    assert_eq!(first.cards[0].ident, second.cards[0].ident);
    assert_eq!(first.cards[0].corners, second.cards[0].corners);
}
