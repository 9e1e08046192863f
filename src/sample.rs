//! Nearest-anchored bilinear sampling.
//!
//! The anchor pixel is the nearest integer to the projected coordinate,
//! computed as add-0.5-then-truncate, and the signed offset
//! `dx = xf - xi` lies in `[-0.5, 0.5)`. Interpolation runs between the
//! anchor and its `+1` neighbour on each axis with weights `(1 - dx, dx)`,
//! so a negative offset extrapolates linearly from the anchor cell. This is
//! not floor-based bilinear: the results differ at sub-pixel level, and the
//! scalar and packed evaluators both rely on this exact scheme and
//! evaluation order.

use crate::image::ImageView;

/// Anchor pixel and signed sub-pixel offsets of a valid sample location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub xi: usize,
    pub yi: usize,
    pub dx: f32,
    pub dy: f32,
}

/// Anchors `(xf, yf)` to its nearest pixel if the 2x2 neighbourhood fits.
///
/// Returns `None` unless `xi` is in `[0, width - 2]` and `yi` is in
/// `[0, height - 2]`. The test runs on `xf + 0.5` before truncating, which
/// makes truncation equal to `floor` on the accepted range and rejects
/// non-finite coordinates.
#[inline]
pub fn anchor(xf: f32, yf: f32, width: usize, height: usize) -> Option<Anchor> {
    let sx = xf + 0.5;
    let sy = yf + 0.5;
    let max_x = width.saturating_sub(1) as f32;
    let max_y = height.saturating_sub(1) as f32;
    if !(sx >= 0.0 && sx < max_x && sy >= 0.0 && sy < max_y) {
        return None;
    }
    let xi = sx as usize;
    let yi = sy as usize;
    Some(Anchor {
        xi,
        yi,
        dx: xf - xi as f32,
        dy: yf - yi as f32,
    })
}

/// Interpolates the image at an anchor returned by [`anchor`].
///
/// Computes
/// `(1-dy)·((1-dx)·I(yi,xi) + dx·I(yi,xi+1)) + dy·((1-dx)·I(yi+1,xi) + dx·I(yi+1,xi+1))`.
/// Bounds were established by [`anchor`] and are not re-checked beyond slice
/// indexing.
#[inline]
pub fn bilinear(image: ImageView<'_, u8>, at: Anchor) -> f32 {
    let stride = image.stride();
    let data = image.as_slice();
    let idx = at.yi * stride + at.xi;
    let i00 = data[idx] as f32;
    let i01 = data[idx + 1] as f32;
    let i10 = data[idx + stride] as f32;
    let i11 = data[idx + stride + 1] as f32;
    let wx = 1.0 - at.dx;
    let wy = 1.0 - at.dy;
    wy * (wx * i00 + at.dx * i01) + at.dy * (wx * i10 + at.dx * i11)
}

/// Anchors and samples in one step.
#[inline]
pub fn sample(image: ImageView<'_, u8>, xf: f32, yf: f32) -> Option<f32> {
    anchor(xf, yf, image.width(), image.height()).map(|at| bilinear(image, at))
}

#[cfg(test)]
mod tests {
    use super::{anchor, bilinear, sample, Anchor};
    use crate::ImageView;

    const GRID: [u8; 16] = [
        0, 10, 20, 30, //
        40, 50, 60, 70, //
        80, 90, 100, 110, //
        120, 130, 140, 150,
    ];

    #[test]
    fn anchor_rounds_to_nearest_with_signed_offset() {
        let at = anchor(1.7, 0.2, 4, 4).unwrap();
        assert_eq!((at.xi, at.yi), (2, 0));
        assert!((at.dx + 0.3).abs() < 1e-6);
        assert!((at.dy - 0.2).abs() < 1e-6);
    }

    #[test]
    fn anchor_half_rounds_up() {
        let at = anchor(0.5, 1.5, 4, 4).unwrap();
        assert_eq!(
            at,
            Anchor {
                xi: 1,
                yi: 2,
                dx: -0.5,
                dy: -0.5,
            }
        );
    }

    #[test]
    fn anchor_enforces_border() {
        assert!(anchor(2.0, 2.0, 4, 4).is_some());
        assert!(anchor(2.49, 2.49, 4, 4).is_some());
        assert!(anchor(2.5, 0.0, 4, 4).is_none());
        assert!(anchor(3.0, 0.0, 4, 4).is_none());
        assert!(anchor(0.0, 3.0, 4, 4).is_none());
        assert!(anchor(-0.4, 0.0, 4, 4).is_some());
        assert!(anchor(-0.5, 0.0, 4, 4).is_some());
        assert!(anchor(-0.51, 0.0, 4, 4).is_none());
        assert!(anchor(-1.0, 0.0, 4, 4).is_none());
        assert!(anchor(0.0, 0.0, 1, 4).is_none());
    }

    #[test]
    fn anchor_rejects_non_finite() {
        assert!(anchor(f32::NAN, 1.0, 4, 4).is_none());
        assert!(anchor(1.0, f32::INFINITY, 4, 4).is_none());
        assert!(anchor(f32::NEG_INFINITY, 1.0, 4, 4).is_none());
    }

    #[test]
    fn bilinear_is_exact_at_pixel_centers() {
        let view = ImageView::from_slice(&GRID, 4, 4).unwrap();
        for y in 0..3 {
            for x in 0..3 {
                let value = sample(view, x as f32, y as f32).unwrap();
                assert_eq!(value, GRID[y * 4 + x] as f32);
            }
        }
    }

    #[test]
    fn bilinear_uses_nearest_anchor_not_floor() {
        // The containing cell (0, 0) is all zeros; the anchor cell (1, 0)
        // reaches the bright pixel at (2, 1) and extrapolates with dx < 0.
        let data = [0u8, 0, 0, 0, 0, 100, 0, 0, 0];
        let view = ImageView::from_slice(&data, 3, 3).unwrap();
        let at = anchor(0.75, 0.25, 3, 3).unwrap();
        assert_eq!((at.xi, at.yi), (1, 0));
        assert_eq!(at.dx, -0.25);
        assert_eq!(at.dy, 0.25);
        let value = bilinear(view, at);
        assert!((value + 6.25).abs() < 1e-5);
    }

    #[test]
    fn bilinear_respects_stride() {
        let data = [1u8, 2, 99, 3, 4, 99];
        let view = ImageView::new(&data, 2, 2, 3).unwrap();
        let value = sample(view, 0.25, 0.25).unwrap();
        let expected = 0.75 * (0.75 * 1.0 + 0.25 * 2.0) + 0.25 * (0.75 * 3.0 + 0.25 * 4.0);
        assert!((value - expected).abs() < 1e-6);
    }
}
