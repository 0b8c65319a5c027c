//! Per-frame orchestration: preprocess, classify, normalize, match.
//!
//! Every frame is processed independently; there is no cross-frame state, so
//! a bad frame only costs its own annotation. Timing lives in a per-frame
//! context struct and is reported alongside the detections.

use crate::card::{flatten_card, split_cluster, Card, FlattenConfig};
use crate::card::split::SplitConfig;
use crate::contour::classify::{
    classify_contours, CardShape, ClassifierConfig, ContourClass,
};
use crate::contour::find_contours;
use crate::image::RgbFrame;
use crate::matcher::{identify, MatcherConfig};
use crate::preprocess::{binarize, box_blur, grayscale, PreprocessConfig};
use crate::template::TemplateBank;
use crate::trace::{trace_event, trace_span};
use crate::util::CardMatchResult;
use std::time::{Duration, Instant};

pub mod stream;

/// Aggregate configuration for the whole detection pipeline.
#[derive(Clone, Debug, Default)]
pub struct DetectorConfig {
    pub preprocess: PreprocessConfig,
    pub classifier: ClassifierConfig,
    pub flatten: FlattenConfig,
    pub split: SplitConfig,
    pub matcher: MatcherConfig,
}

/// Timing and counting stats for one processed frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameStats {
    /// Contours extracted from the binary frame.
    pub contours: usize,
    /// Cards detected after classification and normalization.
    pub cards: usize,
    /// Wall-clock processing time for the frame.
    pub elapsed: Duration,
    /// Instantaneous frame rate implied by `elapsed`.
    pub fps: f64,
}

/// Detections and stats for one frame.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub cards: Vec<Card>,
    pub stats: FrameStats,
}

/// Rendering collaborator seam.
///
/// Implementations draw on the frame or forward it to a display; the
/// pipeline never consumes their results. All methods default to no-ops so a
/// sink can implement only what it renders.
pub trait Annotator {
    /// Draws the card's contour outline.
    fn outline_card(&mut self, _frame: &mut RgbFrame, _card: &Card) {}
    /// Draws the card's rank/suit labels and scores.
    fn label_card(&mut self, _frame: &mut RgbFrame, _card: &Card) {}
    /// Draws the frame-rate overlay.
    fn overlay_fps(&mut self, _frame: &mut RgbFrame, _fps: f64) {}
    /// Presents the finished frame, e.g. to a window or file.
    fn present(&mut self, _frame: &RgbFrame) {}
}

/// Annotator that renders nothing.
pub struct NullAnnotator;

impl Annotator for NullAnnotator {}

/// Applies the full annotation sequence for one frame.
pub fn annotate(frame: &mut RgbFrame, report: &FrameReport, annotator: &mut dyn Annotator) {
    for card in &report.cards {
        annotator.outline_card(frame, card);
        annotator.label_card(frame, card);
    }
    annotator.overlay_fps(frame, report.stats.fps);
    annotator.present(frame);
}

/// Card detector driving the per-frame pipeline against a template bank.
pub struct CardDetector {
    bank: TemplateBank,
    cfg: DetectorConfig,
}

impl CardDetector {
    /// Creates a detector with default configuration.
    pub fn new(bank: TemplateBank) -> Self {
        Self {
            bank,
            cfg: DetectorConfig::default(),
        }
    }

    /// Replaces the detector configuration.
    pub fn with_config(mut self, cfg: DetectorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }

    /// Returns the template bank.
    pub fn bank(&self) -> &TemplateBank {
        &self.bank
    }

    /// Runs preprocess, classification, normalization and matching on one
    /// frame.
    ///
    /// A frame with no accepted contours yields an empty report, never an
    /// error.
    pub fn process_frame(&self, frame: &RgbFrame) -> CardMatchResult<FrameReport> {
        let _span = trace_span!(
            "process_frame",
            width = frame.width(),
            height = frame.height()
        )
        .entered();
        let started = Instant::now();

        let gray = grayscale(frame);
        let blurred = box_blur(gray.view(), self.cfg.preprocess.blur_radius);
        let binary = binarize(blurred.view(), &self.cfg.preprocess);

        let contours = find_contours(binary.view());
        let contour_count = contours.len();
        let classified = classify_contours(contours, &self.cfg.classifier);

        let glyphs = self.bank.geometry();
        let mut cards = Vec::new();
        for entry in &classified {
            match entry.class {
                ContourClass::Rejected => {}
                ContourClass::Card(CardShape::Single) => {
                    let Some(mut card) = flatten_card(
                        gray.view(),
                        &entry.contour,
                        &entry.approx,
                        &self.cfg.flatten,
                        &glyphs,
                    ) else {
                        continue;
                    };
                    card.ident =
                        identify(&card.rank_image, &card.suit_image, &self.bank, &self.cfg.matcher)?;
                    cards.push(card);
                }
                ContourClass::Card(CardShape::Stacked) => {
                    let split = split_cluster(
                        gray.view(),
                        &entry.contour,
                        &entry.approx,
                        &self.cfg.split,
                        &self.cfg.flatten,
                        &glyphs,
                    );
                    for mut card in split {
                        card.ident = identify(
                            &card.rank_image,
                            &card.suit_image,
                            &self.bank,
                            &self.cfg.matcher,
                        )?;
                        cards.push(card);
                    }
                }
            }
        }

        let elapsed = started.elapsed();
        let fps = if elapsed.as_secs_f64() > 0.0 {
            1.0 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        trace_event!("frame_processed", cards = cards.len());

        Ok(FrameReport {
            stats: FrameStats {
                contours: contour_count,
                cards: cards.len(),
                elapsed,
                fps,
            },
            cards,
        })
    }
}
