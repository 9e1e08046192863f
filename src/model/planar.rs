//! Planar motion models over homogeneous 2-D points.
//!
//! `Translation` and `Affine` read only `x` and `y` and treat the point as
//! `(x, y, 1)`; they skip the perspective divide. `Homography` applies the
//! full 3x3 matrix to `(x, y, w)` and divides by the third coordinate.

use super::{Point2h, Projector};
use crate::util::{WarpError, WarpResult};

#[cfg(feature = "simd")]
use super::gather_component;
#[cfg(feature = "simd")]
use wide::f32x4;

/// Pure image-plane translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Translation {
    tx: f32,
    ty: f32,
}

impl Translation {
    pub fn new(tx: f32, ty: f32) -> Self {
        Self { tx, ty }
    }

    pub fn offset(&self) -> (f32, f32) {
        (self.tx, self.ty)
    }
}

impl Projector for Translation {
    type Point = Point2h;
    #[cfg(feature = "simd")]
    type Lanes = [f32x4; 2];

    #[inline]
    fn project(&self, point: &Point2h) -> (f32, f32) {
        (point[0] + self.tx, point[1] + self.ty)
    }

    #[cfg(feature = "simd")]
    fn lanes(&self) -> Self::Lanes {
        [f32x4::splat(self.tx), f32x4::splat(self.ty)]
    }

    #[cfg(feature = "simd")]
    #[inline]
    fn project_x4(lanes: &Self::Lanes, points: &[Point2h]) -> (f32x4, f32x4) {
        let x = gather_component(points, 0);
        let y = gather_component(points, 1);
        (x + lanes[0], y + lanes[1])
    }
}

/// Affine motion stored as the top two rows of a 3x3 matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    m: [[f32; 3]; 2],
}

impl Affine {
    /// Creates an affine model from its two rows `[a, b, tx]`, `[c, d, ty]`.
    pub fn new(rows: [[f32; 3]; 2]) -> Self {
        Self { m: rows }
    }

    /// Keeps the top two rows of `h`, dropping its projective row.
    pub fn from_homography(h: &Homography) -> Self {
        let m = h.matrix();
        Self { m: [m[0], m[1]] }
    }

    pub fn rows(&self) -> [[f32; 3]; 2] {
        self.m
    }
}

impl From<Translation> for Affine {
    fn from(t: Translation) -> Self {
        Self::new([[1.0, 0.0, t.tx], [0.0, 1.0, t.ty]])
    }
}

impl Projector for Affine {
    type Point = Point2h;
    #[cfg(feature = "simd")]
    type Lanes = [[f32x4; 3]; 2];

    #[inline]
    fn project(&self, point: &Point2h) -> (f32, f32) {
        let [x, y, _] = *point;
        let m = &self.m;
        let u = m[0][0] * x + m[0][1] * y + m[0][2];
        let v = m[1][0] * x + m[1][1] * y + m[1][2];
        (u, v)
    }

    #[cfg(feature = "simd")]
    fn lanes(&self) -> Self::Lanes {
        self.m.map(|row| row.map(f32x4::splat))
    }

    #[cfg(feature = "simd")]
    #[inline]
    fn project_x4(lanes: &Self::Lanes, points: &[Point2h]) -> (f32x4, f32x4) {
        let x = gather_component(points, 0);
        let y = gather_component(points, 1);
        let m = lanes;
        let u = m[0][0] * x + m[0][1] * y + m[0][2];
        let v = m[1][0] * x + m[1][1] * y + m[1][2];
        (u, v)
    }
}

/// Full 3x3 planar homography, row-major.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    m: [[f32; 3]; 3],
}

impl Homography {
    pub fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self { m: rows }
    }

    pub fn identity() -> Self {
        Self::from_rows([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Builds a homography from nine row-major coefficients.
    pub fn from_row_major(values: &[f32]) -> WarpResult<Self> {
        if values.len() != 9 {
            return Err(WarpError::InvalidMatrix {
                kind: "homography",
                expected: "9",
                got: values.len(),
            });
        }
        let mut m = [[0.0f32; 3]; 3];
        for (r, row) in m.iter_mut().enumerate() {
            row.copy_from_slice(&values[r * 3..r * 3 + 3]);
        }
        Ok(Self { m })
    }

    pub fn matrix(&self) -> [[f32; 3]; 3] {
        self.m
    }
}

impl From<Affine> for Homography {
    fn from(a: Affine) -> Self {
        Self::from_rows([a.m[0], a.m[1], [0.0, 0.0, 1.0]])
    }
}

impl From<Translation> for Homography {
    fn from(t: Translation) -> Self {
        Self::from(Affine::from(t))
    }
}

impl Projector for Homography {
    type Point = Point2h;
    #[cfg(feature = "simd")]
    type Lanes = [[f32x4; 3]; 3];

    #[inline]
    fn project(&self, point: &Point2h) -> (f32, f32) {
        let [x, y, w] = *point;
        let m = &self.m;
        let u = m[0][0] * x + m[0][1] * y + m[0][2] * w;
        let v = m[1][0] * x + m[1][1] * y + m[1][2] * w;
        let s = m[2][0] * x + m[2][1] * y + m[2][2] * w;
        (u / s, v / s)
    }

    #[cfg(feature = "simd")]
    fn lanes(&self) -> Self::Lanes {
        self.m.map(|row| row.map(f32x4::splat))
    }

    #[cfg(feature = "simd")]
    #[inline]
    fn project_x4(lanes: &Self::Lanes, points: &[Point2h]) -> (f32x4, f32x4) {
        let x = gather_component(points, 0);
        let y = gather_component(points, 1);
        let w = gather_component(points, 2);
        let m = lanes;
        let u = m[0][0] * x + m[0][1] * y + m[0][2] * w;
        let v = m[1][0] * x + m[1][1] * y + m[1][2] * w;
        let s = m[2][0] * x + m[2][1] * y + m[2][2] * w;
        (u / s, v / s)
    }
}
