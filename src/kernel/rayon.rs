//! Rayon-parallel batch evaluation (feature-gated).
//!
//! The batch is split into contiguous chunks that are evaluated independently
//! on the rayon pool. Each chunk runs the chosen kernel unchanged, so the
//! vectorized kernel acquires its floating-point guard on the worker thread
//! that executes it. Chunk sizes are rounded up to a multiple of four to keep
//! the packed grouping, and therefore the outputs, identical to a sequential
//! call.

use crate::batch::WarpBatch;
use crate::kernel::WarpKernel;
use crate::model::Projector;
use crate::util::WarpResult;
use crate::ImageView;
use rayon::prelude::*;

const CHUNK_MULTIPLE: usize = 4;

/// Evaluates `batch` in parallel chunks of roughly `chunk_size` points.
pub fn evaluate_par<K: WarpKernel, P: Projector>(
    image: ImageView<'_, u8>,
    model: &P,
    batch: &mut WarpBatch<'_, P::Point>,
    chunk_size: usize,
) -> WarpResult<usize> {
    let chunk = chunk_size.max(1).next_multiple_of(CHUNK_MULTIPLE);
    let parts = batch.split(chunk);

    let counts = parts
        .into_par_iter()
        .map(|mut part| K::evaluate(image, model, &mut part))
        .collect::<WarpResult<Vec<usize>>>()?;

    Ok(counts.into_iter().sum())
}
