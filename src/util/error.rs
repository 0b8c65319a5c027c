//! Error types for cardmatch.

use thiserror::Error;

/// Result alias for cardmatch operations.
pub type CardMatchResult<T> = std::result::Result<T, CardMatchError>;

/// Errors that can occur when running cardmatch algorithms.
///
/// Degenerate contours and low-confidence matches are not errors; those paths
/// return empty collections or the "Unknown" label instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardMatchError {
    /// An image or frame was constructed with a zero dimension.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The row stride is smaller than the image width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer is too small for the requested dimensions.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A requested region does not fit inside the source image.
    #[error("roi {width}x{height} at ({x}, {y}) out of bounds for {img_width}x{img_height} image")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Glyph and template dimensions disagree.
    #[error("{context}: expected {expected_width}x{expected_height}, got {width}x{height}")]
    SizeMismatch {
        context: &'static str,
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    /// A template bank was constructed without any templates of one kind.
    #[error("template bank has no {kind} templates")]
    EmptyBank { kind: &'static str },
    /// Loading an image from disk failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
