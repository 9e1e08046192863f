//! Scalar reference kernel.

use crate::batch::WarpBatch;
use crate::kernel::WarpKernel;
use crate::model::Projector;
use crate::sample::sample;
use crate::util::WarpResult;
use crate::ImageView;
use std::ops::Range;

/// One point at a time; also finishes the remainder of the SIMD kernel.
pub struct ScalarWarp;

/// Evaluates the points in `range` and returns how many were valid.
pub(crate) fn warp_range<P: Projector>(
    image: ImageView<'_, u8>,
    model: &P,
    batch: &mut WarpBatch<'_, P::Point>,
    range: Range<usize>,
) -> usize {
    let mut num_valid = 0;
    for i in range {
        let (xf, yf) = model.project(&batch.points[i]);
        let value = sample(image, xf, yf);
        num_valid += usize::from(value.is_some());
        batch.store(i, value);
    }
    num_valid
}

impl WarpKernel for ScalarWarp {
    const NAME: &'static str = "scalar";

    fn evaluate<P: Projector>(
        image: ImageView<'_, u8>,
        model: &P,
        batch: &mut WarpBatch<'_, P::Point>,
    ) -> WarpResult<usize> {
        let n = batch.len();
        Ok(warp_range(image, model, batch, 0..n))
    }
}
