//! CardMatch is a CPU-first playing card detection and identification
//! library.
//!
//! Each video frame is thresholded against an adaptive background level,
//! card-shaped contours are classified (single vs. stacked clusters), every
//! card region is rectified into a canonical crop, and its rank and suit
//! glyphs are identified by nearest-template absolute-difference matching.
//! Optional parallelism is available via the `rayon` feature; disk IO for
//! frames and templates lives behind `image-io`.

pub mod card;
pub mod contour;
pub mod image;
pub mod matcher;
pub mod pipeline;
pub mod preprocess;
pub mod template;
mod trace;
pub mod util;

pub use card::{flatten_card, split_cluster, Card, FlattenConfig};
pub use card::split::SplitConfig;
pub use contour::classify::{
    classify_contours, CardShape, ClassifiedContour, ClassifierConfig, ContourClass,
};
pub use contour::{find_contours, Contour, Point};
pub use image::{GrayImage, ImageView, RgbFrame};
pub use matcher::{identify, Identification, MatcherConfig, UNKNOWN_LABEL};
pub use pipeline::stream::{run_loop, FrameSlot, FrameSource, StopFlag};
pub use pipeline::{
    annotate, Annotator, CardDetector, DetectorConfig, FrameReport, FrameStats, NullAnnotator,
};
pub use preprocess::{preprocess_frame, PreprocessConfig};
pub use template::{GlyphGeometry, Template, TemplateBank};
pub use util::{CardMatchError, CardMatchResult};

#[cfg(feature = "image-io")]
pub use image::io as imageio;
