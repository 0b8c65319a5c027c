//! Perspective rectification of quadrilateral regions.
//!
//! The warp maps the canonical destination rectangle back into the source
//! frame through a homography fitted to the four ordered corners, sampling
//! with bilinear interpolation. Out-of-frame samples read as black.

use crate::contour::Point;
use crate::image::{GrayImage, ImageView};

/// 3x3 projective transform, row major, `h[8]` fixed to 1.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Homography {
    h: [f64; 9],
}

impl Homography {
    /// Maps a destination point into source coordinates.
    fn apply(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let h = &self.h;
        let w = h[6] * x + h[7] * y + h[8];
        if w.abs() < 1e-12 {
            return None;
        }
        Some((
            (h[0] * x + h[1] * y + h[2]) / w,
            (h[3] * x + h[4] * y + h[5]) / w,
        ))
    }
}

/// Solves a dense 8x8 linear system with partial pivoting.
///
/// Returns `None` for singular systems, which correspond to degenerate
/// (collinear or repeated) corner sets.
fn solve_8x8(mut a: [[f64; 9]; 8]) -> Option<[f64; 8]> {
    for col in 0..8 {
        let mut pivot = col;
        for row in col + 1..8 {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-9 {
            return None;
        }
        a.swap(col, pivot);

        let scale = a[col][col];
        for k in col..9 {
            a[col][k] /= scale;
        }
        for row in 0..8 {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..9 {
                a[row][k] -= factor * a[col][k];
            }
        }
    }
    let mut x = [0.0f64; 8];
    for (i, value) in x.iter_mut().enumerate() {
        *value = a[i][8];
    }
    Some(x)
}

/// Fits the homography taking canonical `(width, height)` rectangle corners
/// to the four ordered source corners (top-left, top-right, bottom-right,
/// bottom-left).
pub(crate) fn fit_quad(corners: [Point; 4], width: usize, height: usize) -> Option<Homography> {
    let dst = [
        (0.0, 0.0),
        (width as f64 - 1.0, 0.0),
        (width as f64 - 1.0, height as f64 - 1.0),
        (0.0, height as f64 - 1.0),
    ];

    let mut a = [[0.0f64; 9]; 8];
    for i in 0..4 {
        let (dx, dy) = dst[i];
        let sx = f64::from(corners[i].x);
        let sy = f64::from(corners[i].y);
        a[2 * i] = [dx, dy, 1.0, 0.0, 0.0, 0.0, -dx * sx, -dy * sx, sx];
        a[2 * i + 1] = [0.0, 0.0, 0.0, dx, dy, 1.0, -dx * sy, -dy * sy, sy];
    }

    let x = solve_8x8(a)?;
    Some(Homography {
        h: [x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7], 1.0],
    })
}

fn sample_bilinear(src: ImageView<'_, u8>, x: f64, y: f64) -> u8 {
    if x < -1.0 || y < -1.0 || x >= src.width() as f64 || y >= src.height() as f64 {
        return 0;
    }
    let x0 = x.floor();
    let y0 = y.floor();
    let wx = x - x0;
    let wy = y - y0;

    let read = |px: f64, py: f64| -> f64 {
        if px < 0.0 || py < 0.0 {
            return 0.0;
        }
        src.get(px as usize, py as usize)
            .copied()
            .map_or(0.0, f64::from)
    };

    let p00 = read(x0, y0);
    let p01 = read(x0 + 1.0, y0);
    let p10 = read(x0, y0 + 1.0);
    let p11 = read(x0 + 1.0, y0 + 1.0);
    let top = p00 + (p01 - p00) * wx;
    let bottom = p10 + (p11 - p10) * wx;
    (top + (bottom - top) * wy).round().clamp(0.0, 255.0) as u8
}

/// Warps the quadrilateral bounded by `corners` into a `width` x `height`
/// canonical rectangle.
///
/// Returns `None` when the corner set is degenerate.
pub(crate) fn warp_quad(
    src: ImageView<'_, u8>,
    corners: [Point; 4],
    width: usize,
    height: usize,
) -> Option<GrayImage> {
    let homography = fit_quad(corners, width, height)?;
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (sx, sy) = homography.apply(x as f64, y as f64)?;
            out.push(sample_bilinear(src, sx, sy));
        }
    }
    GrayImage::from_vec(out, width, height).ok()
}

#[cfg(test)]
mod tests {
    use super::{fit_quad, warp_quad};
    use crate::contour::Point;
    use crate::image::GrayImage;

    #[test]
    fn axis_aligned_warp_is_identity_crop() {
        let mut img = GrayImage::zeroed(40, 40).unwrap();
        for y in 10..30 {
            for x in 10..30 {
                img.set(x, y, ((x + y) % 251) as u8);
            }
        }
        let corners = [
            Point::new(10, 10),
            Point::new(29, 10),
            Point::new(29, 29),
            Point::new(10, 29),
        ];
        let warped = warp_quad(img.view(), corners, 20, 20).unwrap();
        for y in 0..20 {
            for x in 0..20 {
                assert_eq!(
                    warped.get(x, y).unwrap(),
                    img.get(x + 10, y + 10).unwrap(),
                    "mismatch at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn rotated_square_is_rectified() {
        // Bright diamond (45-degree square) on black background.
        let mut img = GrayImage::zeroed(64, 64).unwrap();
        for y in 0..64i32 {
            for x in 0..64i32 {
                if (x - 32).abs() + (y - 32).abs() <= 20 {
                    img.set(x as usize, y as usize, 200);
                }
            }
        }
        let corners = [
            Point::new(32, 12),
            Point::new(52, 32),
            Point::new(32, 52),
            Point::new(12, 32),
        ];
        let warped = warp_quad(img.view(), corners, 21, 21).unwrap();
        // Interior of the rectified square is uniformly bright.
        for y in 2..19 {
            for x in 2..19 {
                assert_eq!(warped.get(x, y).unwrap(), 200);
            }
        }
    }

    #[test]
    fn collinear_corners_are_degenerate() {
        let corners = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(20, 0),
            Point::new(30, 0),
        ];
        assert!(fit_quad(corners, 10, 10).is_none());
    }
}
