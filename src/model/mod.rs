//! Point projectors for the supported motion models.
//!
//! A projector maps a homogeneous template point into the current image and
//! performs the perspective divide where the model needs one. Projectors are
//! purely algebraic: they never check bounds, and a point mapped to the plane
//! at infinity yields a non-finite coordinate that the sampler rejects.
//!
//! Every projector exposes a scalar `project` and, with the `simd` feature, a
//! packed `project_x4` that evaluates four points with the same operation
//! order, so both evaluators see bit-identical coordinates.

mod planar;
mod projective;

pub use planar::{Affine, Homography, Translation};
pub use projective::Projection;

#[cfg(feature = "simd")]
use wide::f32x4;

/// Homogeneous planar point `[x, y, w]`.
pub type Point2h = [f32; 3];

/// Homogeneous spatial point `[x, y, z, w]`.
pub type Point3h = [f32; 4];

/// Motion model applied to every point of a warp batch.
pub trait Projector: Sync {
    /// Homogeneous point type consumed by the model.
    type Point: Copy + Send + Sync;

    /// Coefficients broadcast across SIMD lanes, prepared once per batch.
    #[cfg(feature = "simd")]
    type Lanes: Copy;

    /// Projects one point to image-plane coordinates `(x, y)`.
    fn project(&self, point: &Self::Point) -> (f32, f32);

    /// Broadcasts the model coefficients for [`Projector::project_x4`].
    #[cfg(feature = "simd")]
    fn lanes(&self) -> Self::Lanes;

    /// Projects the first four points of `points`, one per lane.
    #[cfg(feature = "simd")]
    fn project_x4(lanes: &Self::Lanes, points: &[Self::Point]) -> (f32x4, f32x4);
}

/// Gathers component `c` of four points into one packed register.
#[cfg(feature = "simd")]
#[inline]
fn gather_component<const N: usize>(points: &[[f32; N]], c: usize) -> f32x4 {
    f32x4::from([points[0][c], points[1][c], points[2][c], points[3][c]])
}
