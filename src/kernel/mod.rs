//! Warp-and-residual kernel implementations.
//!
//! A kernel evaluates a whole [`WarpBatch`]: it projects every point, tests
//! the 2x2 sampling neighbourhood, samples with nearest-anchored bilinear
//! interpolation and writes `reference - sample`. Invalid points get zero
//! residual and zero warped intensity in every kernel. Kernels return the
//! number of valid points.

use crate::batch::WarpBatch;
use crate::model::Projector;
use crate::util::WarpResult;
use crate::ImageView;

/// Kernel trait shared by the scalar and vectorized evaluators.
pub trait WarpKernel {
    /// Short name reported in traces.
    const NAME: &'static str;

    /// Evaluates every point of `batch` against `image` under `model`.
    fn evaluate<P: Projector>(
        image: ImageView<'_, u8>,
        model: &P,
        batch: &mut WarpBatch<'_, P::Point>,
    ) -> WarpResult<usize>;
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;
