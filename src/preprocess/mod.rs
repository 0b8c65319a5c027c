//! Frame preprocessing: grayscale conversion, blur, adaptive binarization.
//!
//! The threshold level adapts to ambient lighting by sampling a small patch
//! at a background-representative anchor point (top-center of the frame by
//! default) and adding a fixed offset. Cards are assumed brighter than the
//! background, so foreground pixels map to 255 and everything else to 0.
//! There is no error path: degenerate all-foreground or all-background
//! output is legal and handled downstream by contour-size filtering.

use crate::image::{GrayImage, ImageView, RgbFrame};
use crate::trace::trace_span;

/// Configuration for frame preprocessing.
#[derive(Clone, Debug)]
pub struct PreprocessConfig {
    /// Box blur radius in pixels (window is `2 * radius + 1`).
    pub blur_radius: usize,
    /// Offset added to the sampled background level to form the threshold.
    pub background_offset: u8,
    /// Horizontal anchor of the background sample, as a fraction of width.
    pub background_anchor_x: f32,
    /// Vertical anchor of the background sample, as a fraction of height.
    pub background_anchor_y: f32,
    /// Radius of the square patch averaged around the anchor.
    pub background_patch_radius: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_radius: 2,
            background_offset: 60,
            background_anchor_x: 0.5,
            background_anchor_y: 0.02,
            background_patch_radius: 2,
        }
    }
}

/// Converts a color frame to single-channel grayscale using integer luma.
pub fn grayscale(frame: &RgbFrame) -> GrayImage {
    let width = frame.width();
    let height = frame.height();
    let src = frame.data();
    let mut data = Vec::with_capacity(width * height);
    for chunk in src.chunks_exact(3) {
        let luma = (77 * u32::from(chunk[0]) + 150 * u32::from(chunk[1]) + 29 * u32::from(chunk[2]))
            >> 8;
        data.push(luma as u8);
    }
    GrayImage::from_vec(data, width, height).expect("frame dimensions are non-zero")
}

/// Separable box blur with edge clamping and rounded integer division.
pub fn box_blur(src: ImageView<'_, u8>, radius: usize) -> GrayImage {
    let width = src.width();
    let height = src.height();
    if radius == 0 {
        return GrayImage::from_view(src);
    }

    // Horizontal pass via per-row prefix sums.
    let mut tmp = vec![0u8; width * height];
    let mut prefix = vec![0u32; width + 1];
    for y in 0..height {
        let row = src.row(y).expect("row within view bounds");
        for (x, &v) in row.iter().enumerate() {
            prefix[x + 1] = prefix[x] + u32::from(v);
        }
        for x in 0..width {
            let lo = x.saturating_sub(radius);
            let hi = (x + radius + 1).min(width);
            let n = (hi - lo) as u32;
            let sum = prefix[hi] - prefix[lo];
            tmp[y * width + x] = ((sum + n / 2) / n) as u8;
        }
    }

    // Vertical pass via per-column prefix sums.
    let mut out = vec![0u8; width * height];
    let mut col_prefix = vec![0u32; height + 1];
    for x in 0..width {
        for y in 0..height {
            col_prefix[y + 1] = col_prefix[y] + u32::from(tmp[y * width + x]);
        }
        for y in 0..height {
            let lo = y.saturating_sub(radius);
            let hi = (y + radius + 1).min(height);
            let n = (hi - lo) as u32;
            let sum = col_prefix[hi] - col_prefix[lo];
            out[y * width + x] = ((sum + n / 2) / n) as u8;
        }
    }

    GrayImage::from_vec(out, width, height).expect("view dimensions are non-zero")
}

/// Samples the background level from the configured anchor patch.
fn background_level(src: ImageView<'_, u8>, cfg: &PreprocessConfig) -> u8 {
    let width = src.width();
    let height = src.height();
    let cx = ((cfg.background_anchor_x * width as f32) as usize).min(width - 1);
    let cy = ((cfg.background_anchor_y * height as f32) as usize).min(height - 1);
    let r = cfg.background_patch_radius;

    let x0 = cx.saturating_sub(r);
    let y0 = cy.saturating_sub(r);
    let x1 = (cx + r + 1).min(width);
    let y1 = (cy + r + 1).min(height);

    let mut sum = 0u32;
    let mut count = 0u32;
    for y in y0..y1 {
        let row = src.row(y).expect("row within view bounds");
        for &v in &row[x0..x1] {
            sum += u32::from(v);
            count += 1;
        }
    }
    (sum / count.max(1)) as u8
}

/// Thresholds a grayscale image against the adaptive background level.
pub fn binarize(src: ImageView<'_, u8>, cfg: &PreprocessConfig) -> GrayImage {
    let level = background_level(src, cfg);
    let threshold = level.saturating_add(cfg.background_offset);

    let width = src.width();
    let height = src.height();
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = src.row(y).expect("row within view bounds");
        data.extend(row.iter().map(|&v| if v > threshold { 255u8 } else { 0u8 }));
    }
    GrayImage::from_vec(data, width, height).expect("view dimensions are non-zero")
}

/// Runs the full preprocessing chain: grayscale, blur, binarize.
pub fn preprocess_frame(frame: &RgbFrame, cfg: &PreprocessConfig) -> GrayImage {
    let _span = trace_span!(
        "preprocess",
        width = frame.width(),
        height = frame.height()
    )
    .entered();
    let gray = grayscale(frame);
    let blurred = box_blur(gray.view(), cfg.blur_radius);
    binarize(blurred.view(), cfg)
}
