//! 3-D to 2-D projective model.

use super::{Point3h, Projector};
use crate::util::{WarpError, WarpResult};

#[cfg(feature = "simd")]
use super::gather_component;
#[cfg(feature = "simd")]
use wide::f32x4;

/// 3x4 projection matrix applied to homogeneous 3-D points, row-major.
///
/// Usually the product of camera intrinsics and the current pose estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    m: [[f32; 4]; 3],
}

impl Projection {
    pub fn from_rows(rows: [[f32; 4]; 3]) -> Self {
        Self { m: rows }
    }

    /// `[I | 0]`: maps `(x, y, z, 1)` to `(x / z, y / z)`.
    pub fn identity() -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    /// Builds a projection from row-major coefficients.
    ///
    /// Accepts either the 12 coefficients of the 3x4 block or a full 4x4
    /// homogeneous matrix, of which the top three rows are kept.
    pub fn from_row_major(values: &[f32]) -> WarpResult<Self> {
        if values.len() != 12 && values.len() != 16 {
            return Err(WarpError::InvalidMatrix {
                kind: "projection",
                expected: "12 or 16",
                got: values.len(),
            });
        }
        let mut m = [[0.0f32; 4]; 3];
        for (r, row) in m.iter_mut().enumerate() {
            row.copy_from_slice(&values[r * 4..r * 4 + 4]);
        }
        Ok(Self { m })
    }

    pub fn matrix(&self) -> [[f32; 4]; 3] {
        self.m
    }
}

impl Projector for Projection {
    type Point = Point3h;
    #[cfg(feature = "simd")]
    type Lanes = [[f32x4; 4]; 3];

    #[inline]
    fn project(&self, point: &Point3h) -> (f32, f32) {
        let [x, y, z, w] = *point;
        let m = &self.m;
        let u = m[0][0] * x + m[0][1] * y + m[0][2] * z + m[0][3] * w;
        let v = m[1][0] * x + m[1][1] * y + m[1][2] * z + m[1][3] * w;
        let s = m[2][0] * x + m[2][1] * y + m[2][2] * z + m[2][3] * w;
        (u / s, v / s)
    }

    #[cfg(feature = "simd")]
    fn lanes(&self) -> Self::Lanes {
        self.m.map(|row| row.map(f32x4::splat))
    }

    #[cfg(feature = "simd")]
    #[inline]
    fn project_x4(lanes: &Self::Lanes, points: &[Point3h]) -> (f32x4, f32x4) {
        let x = gather_component(points, 0);
        let y = gather_component(points, 1);
        let z = gather_component(points, 2);
        let w = gather_component(points, 3);
        let m = lanes;
        let u = m[0][0] * x + m[0][1] * y + m[0][2] * z + m[0][3] * w;
        let v = m[1][0] * x + m[1][1] * y + m[1][2] * z + m[1][3] * w;
        let s = m[2][0] * x + m[2][1] * y + m[2][2] * z + m[2][3] * w;
        (u / s, v / s)
    }
}
