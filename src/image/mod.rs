//! Image buffers and views.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride;
//! ROI slices are zero-copy views into the same backing slice and retain the
//! original stride. `GrayImage` owns a contiguous single-channel buffer and is
//! the working type of the whole pipeline. `RgbFrame` owns an interleaved
//! 3-channel color frame as delivered by a frame source.

use crate::util::{CardMatchError, CardMatchResult};

#[cfg(feature = "image-io")]
pub mod io;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> CardMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> CardMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(CardMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> CardMatchResult<ImageView<'a, T>> {
        let oob = CardMatchError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        if width == 0 || height == 0 {
            return Err(CardMatchError::InvalidDimensions { width, height });
        }
        let fits_x = x.checked_add(width).is_some_and(|end| end <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|end| end <= self.height);
        if !fits_x || !fits_y {
            return Err(oob);
        }
        ImageView::new(&self.data[y * self.stride + x..], width, height, self.stride)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> CardMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(CardMatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(CardMatchError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(CardMatchError::InvalidDimensions { width, height })
}

/// Owned contiguous grayscale image buffer.
#[derive(Clone)]
pub struct GrayImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl std::fmt::Debug for GrayImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GrayImage({}x{})", self.width, self.height)
    }
}

impl GrayImage {
    /// Creates a zero-filled image.
    pub fn zeroed(width: usize, height: usize) -> CardMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(CardMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data: vec![0u8; width * height],
            width,
            height,
        })
    }

    /// Creates an image from an exactly-sized contiguous buffer.
    pub fn from_vec(data: Vec<u8>, width: usize, height: usize) -> CardMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(CardMatchError::InvalidDimensions { width, height });
        }
        let needed = width * height;
        if data.len() != needed {
            return Err(CardMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Copies a view (possibly strided) into an owned contiguous image.
    pub fn from_view(view: ImageView<'_, u8>) -> Self {
        let width = view.width();
        let height = view.height();
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            data.extend_from_slice(view.row(y).expect("row within view bounds"));
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the backing pixel buffer in row-major order.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the backing pixel buffer mutably.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns a borrowed view of the whole image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.view().get(x, y).copied()
    }

    /// Sets the pixel at `(x, y)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Copies a rectangular region into an owned image.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> CardMatchResult<Self> {
        let roi = self.view().roi(x, y, width, height)?;
        Ok(Self::from_view(roi))
    }

    /// Resamples the image to `width` x `height` with bilinear interpolation.
    pub fn resize_bilinear(&self, width: usize, height: usize) -> CardMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(CardMatchError::InvalidDimensions { width, height });
        }
        let mut out = vec![0u8; width * height];
        let sx = self.width as f32 / width as f32;
        let sy = self.height as f32 / height as f32;
        for y in 0..height {
            // Sample at pixel centers so scale factors map edges to edges.
            let fy = ((y as f32 + 0.5) * sy - 0.5).max(0.0);
            let y0 = (fy as usize).min(self.height - 1);
            let y1 = (y0 + 1).min(self.height - 1);
            let wy = fy - y0 as f32;
            for x in 0..width {
                let fx = ((x as f32 + 0.5) * sx - 0.5).max(0.0);
                let x0 = (fx as usize).min(self.width - 1);
                let x1 = (x0 + 1).min(self.width - 1);
                let wx = fx - x0 as f32;

                let p00 = f32::from(self.data[y0 * self.width + x0]);
                let p01 = f32::from(self.data[y0 * self.width + x1]);
                let p10 = f32::from(self.data[y1 * self.width + x0]);
                let p11 = f32::from(self.data[y1 * self.width + x1]);
                let top = p00 + (p01 - p00) * wx;
                let bottom = p10 + (p11 - p10) * wx;
                out[y * width + x] = (top + (bottom - top) * wy).round().clamp(0.0, 255.0) as u8;
            }
        }
        Self::from_vec(out, width, height)
    }
}

/// Owned interleaved RGB color frame.
#[derive(Clone)]
pub struct RgbFrame {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl RgbFrame {
    /// Creates a black frame.
    pub fn zeroed(width: usize, height: usize) -> CardMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(CardMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data: vec![0u8; width * height * 3],
            width,
            height,
        })
    }

    /// Creates a frame from an exactly-sized interleaved RGB buffer.
    pub fn from_vec(data: Vec<u8>, width: usize, height: usize) -> CardMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(CardMatchError::InvalidDimensions { width, height });
        }
        let needed = width * height * 3;
        if data.len() != needed {
            return Err(CardMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the frame width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the frame height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the interleaved RGB buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 3;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Sets the pixel at `(x, y)`; out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 3;
            self.data[idx..idx + 3].copy_from_slice(&rgb);
        }
    }
}
