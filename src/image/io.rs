//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{GrayImage, RgbFrame};
use crate::util::{CardMatchError, CardMatchResult};
use std::path::Path;

/// Converts a grayscale image buffer into an owned `GrayImage`.
pub fn gray_from_luma_image(img: &image::GrayImage) -> CardMatchResult<GrayImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    GrayImage::from_vec(img.as_raw().clone(), width, height)
}

/// Converts an RGB image buffer into an owned `RgbFrame`.
pub fn frame_from_rgb_image(img: &image::RgbImage) -> CardMatchResult<RgbFrame> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    RgbFrame::from_vec(img.as_raw().clone(), width, height)
}

/// Loads an image from disk and converts it to grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> CardMatchResult<GrayImage> {
    let img = image::open(path).map_err(|err| CardMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    gray_from_luma_image(&img.to_luma8())
}

/// Loads an image from disk and converts it to an RGB frame.
pub fn load_rgb_frame<P: AsRef<Path>>(path: P) -> CardMatchResult<RgbFrame> {
    let img = image::open(path).map_err(|err| CardMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    frame_from_rgb_image(&img.to_rgb8())
}

/// Converts a frame back into an `image` buffer, e.g. for writing annotated
/// output to disk.
pub fn rgb_image_from_frame(frame: &RgbFrame) -> image::RgbImage {
    image::RgbImage::from_raw(
        frame.width() as u32,
        frame.height() as u32,
        frame.data().to_vec(),
    )
    .expect("frame buffer length matches its dimensions")
}
