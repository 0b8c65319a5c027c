use cardmatch::imageio::{load_rgb_frame, rgb_image_from_frame};
use cardmatch::template::loader::load_bank;
use cardmatch::{
    run_loop, Annotator, Card, CardDetector, CardMatchResult, ClassifierConfig, DetectorConfig,
    FrameSource, GlyphGeometry, MatcherConfig, PreprocessConfig, RgbFrame, StopFlag,
};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "CardMatch demo CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for pipeline profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PreprocessConfigJson {
    blur_radius: usize,
    background_offset: u8,
}

impl Default for PreprocessConfigJson {
    fn default() -> Self {
        let cfg = PreprocessConfig::default();
        Self {
            blur_radius: cfg.blur_radius,
            background_offset: cfg.background_offset,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ClassifierConfigJson {
    min_area: f64,
    max_area: f64,
    hull_excess: f64,
    stacked_corner_bound: usize,
}

impl Default for ClassifierConfigJson {
    fn default() -> Self {
        let cfg = ClassifierConfig::default();
        Self {
            min_area: cfg.min_area,
            max_area: cfg.max_area,
            hull_excess: cfg.hull_excess,
            stacked_corner_bound: cfg.stacked_corner_bound,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatcherConfigJson {
    max_rank_diff: u32,
    max_suit_diff: u32,
}

impl Default for MatcherConfigJson {
    fn default() -> Self {
        let cfg = MatcherConfig::default();
        Self {
            max_rank_diff: cfg.max_rank_diff,
            max_suit_diff: cfg.max_suit_diff,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    template_dir: String,
    frames_dir: String,
    output_dir: Option<String>,
    /// Stop after this many frames; 0 means run until the source drains.
    max_frames: u64,
    preprocess: PreprocessConfigJson,
    classifier: ClassifierConfigJson,
    matcher: MatcherConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dir: String::new(),
            frames_dir: String::new(),
            output_dir: None,
            max_frames: 0,
            preprocess: PreprocessConfigJson::default(),
            classifier: ClassifierConfigJson::default(),
            matcher: MatcherConfigJson::default(),
        }
    }
}

impl Config {
    fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            preprocess: PreprocessConfig {
                blur_radius: self.preprocess.blur_radius,
                background_offset: self.preprocess.background_offset,
                ..PreprocessConfig::default()
            },
            classifier: ClassifierConfig {
                min_area: self.classifier.min_area,
                max_area: self.classifier.max_area,
                hull_excess: self.classifier.hull_excess,
                stacked_corner_bound: self.classifier.stacked_corner_bound,
                ..ClassifierConfig::default()
            },
            matcher: MatcherConfig {
                max_rank_diff: self.matcher.max_rank_diff,
                max_suit_diff: self.matcher.max_suit_diff,
            },
            ..DetectorConfig::default()
        }
    }
}

/// Frame source reading still images from a directory in name order.
struct DirSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    cursor: usize,
    limit: u64,
    served: u64,
}

impl DirSource {
    fn new(dir: PathBuf, limit: u64) -> Self {
        Self {
            dir,
            files: Vec::new(),
            cursor: 0,
            limit,
            served: 0,
        }
    }
}

impl FrameSource for DirSource {
    fn start(&mut self) -> CardMatchResult<()> {
        let entries = fs::read_dir(&self.dir).map_err(|err| {
            cardmatch::CardMatchError::ImageIo {
                reason: format!("{}: {err}", self.dir.display()),
            }
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("png" | "jpg" | "jpeg")
                )
            })
            .collect();
        files.sort();
        self.files = files;
        self.cursor = 0;
        self.served = 0;
        Ok(())
    }

    fn read(&mut self) -> Option<Arc<RgbFrame>> {
        if self.limit > 0 && self.served >= self.limit {
            return None;
        }
        while self.cursor < self.files.len() {
            let path = self.files[self.cursor].clone();
            self.cursor += 1;
            match load_rgb_frame(&path) {
                Ok(frame) => {
                    self.served += 1;
                    return Some(Arc::new(frame));
                }
                Err(err) => {
                    tracing::warn!("skipping {}: {err}", path.display());
                }
            }
        }
        None
    }

    fn stop(&mut self) {
        self.files.clear();
    }
}

/// Annotator drawing contour outlines and logging identifications; saves
/// annotated frames when an output directory is configured.
struct OutlineAnnotator {
    output_dir: Option<PathBuf>,
    frame_index: u64,
}

const OUTLINE_COLOR: [u8; 3] = [255, 0, 255];

impl Annotator for OutlineAnnotator {
    fn outline_card(&mut self, frame: &mut RgbFrame, card: &Card) {
        for p in card.contour.points() {
            if p.x >= 0 && p.y >= 0 {
                frame.put_pixel(p.x as usize, p.y as usize, OUTLINE_COLOR);
            }
        }
    }

    fn label_card(&mut self, _frame: &mut RgbFrame, card: &Card) {
        println!(
            "frame {}: {} of {} at ({}, {}) [rank diff {}, suit diff {}]",
            self.frame_index,
            card.ident.best_rank,
            card.ident.best_suit,
            card.center.x,
            card.center.y,
            card.ident.rank_diff,
            card.ident.suit_diff,
        );
    }

    fn overlay_fps(&mut self, _frame: &mut RgbFrame, fps: f64) {
        tracing::info!(frame = self.frame_index, fps);
    }

    fn present(&mut self, frame: &RgbFrame) {
        if let Some(dir) = &self.output_dir {
            let path = dir.join(format!("frame_{:05}.png", self.frame_index));
            if let Err(err) = rgb_image_from_frame(frame).save(&path) {
                tracing::warn!("failed to save {}: {err}", path.display());
            }
        }
        self.frame_index += 1;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("cardmatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.template_dir.is_empty() || config.frames_dir.is_empty() {
        return Err("template_dir and frames_dir must be set in the config".into());
    }

    // Fatal startup errors (missing templates, missing frames) abort here,
    // before the loop; nothing inside the loop is fatal.
    let bank = load_bank(&config.template_dir, GlyphGeometry::default())?;
    let detector = CardDetector::new(bank).with_config(config.detector_config());

    if let Some(dir) = &config.output_dir {
        fs::create_dir_all(dir)?;
    }

    let mut source = DirSource::new(PathBuf::from(&config.frames_dir), config.max_frames);
    let mut annotator = OutlineAnnotator {
        output_dir: config.output_dir.as_ref().map(PathBuf::from),
        frame_index: 0,
    };

    let stop = StopFlag::new();
    let listener_stop = stop.clone();
    spawn_quit_listener(move || listener_stop.stop());

    let frames = run_loop(&mut source, &detector, &mut annotator, &stop)?;
    println!("processed {frames} frames");
    Ok(())
}

/// Listens on stdin for a `q` line and requests a cooperative stop.
///
/// The loop also ends when the frame directory drains, so the listener only
/// matters for early interruption.
fn spawn_quit_listener(on_quit: impl Fn() + Send + 'static) {
    std::thread::spawn(move || {
        let mut line = String::new();
        loop {
            line.clear();
            if std::io::stdin().read_line(&mut line).is_err() {
                return;
            }
            if line.trim() == "q" {
                on_quit();
                return;
            }
        }
    });
}
